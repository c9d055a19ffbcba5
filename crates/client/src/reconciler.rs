//! Optimistic voting with server reconciliation.
//!
//! The reconciler keeps this device's last-known choice per report and the
//! counters currently on screen. A vote moves both immediately, then either
//! adopts the server's tally or restores the pre-vote snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use satya_common::{TrendingReport, VoteChoice, VoteTally};

use crate::error::ClientResult;
use crate::gateway::ReportGateway;
use crate::store::LocalStore;
use crate::voter::voter_id;

/// Store key holding the per-report choice map.
pub const USER_VOTES_KEY: &str = "satya_user_votes";

/// Result of a [`VoteReconciler::vote`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The choice was already recorded; nothing was sent.
    Unchanged,
    /// The server accepted the vote and returned this tally.
    Confirmed(VoteTally),
}

/// Client-side vote state for one device.
pub struct VoteReconciler {
    gateway: Arc<dyn ReportGateway>,
    store: Arc<dyn LocalStore>,
    voter_id: String,
    choices: HashMap<String, VoteChoice>,
    tallies: HashMap<String, VoteTally>,
}

impl VoteReconciler {
    /// Load the device's voter id and saved choices from `store`.
    ///
    /// A corrupt choice map is discarded rather than treated as fatal.
    pub fn new(gateway: Arc<dyn ReportGateway>, store: Arc<dyn LocalStore>) -> ClientResult<Self> {
        let voter_id = voter_id(store.as_ref())?;
        let choices = load_choices(store.as_ref())?;

        Ok(Self {
            gateway,
            store,
            voter_id,
            choices,
            tallies: HashMap::new(),
        })
    }

    /// Voter id used for submissions.
    #[must_use]
    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }

    /// Adopt the counters of freshly fetched feed items.
    pub fn track(&mut self, items: &[TrendingReport]) {
        for item in items {
            self.tallies.insert(item.report.id.clone(), item.tally());
        }
    }

    /// Stop tracking a report, e.g. after it was deleted.
    pub fn forget(&mut self, report_id: &str) {
        self.tallies.remove(report_id);
    }

    /// Counters currently displayed for a report.
    #[must_use]
    pub fn displayed(&self, report_id: &str) -> VoteTally {
        self.tallies.get(report_id).copied().unwrap_or_default()
    }

    /// This device's current choice on a report.
    #[must_use]
    pub fn choice(&self, report_id: &str) -> Option<VoteChoice> {
        self.choices.get(report_id).copied()
    }

    /// Vote on a report.
    ///
    /// On failure the previous choice and counters are restored and the
    /// error is returned.
    pub async fn vote(&mut self, report_id: &str, choice: VoteChoice) -> ClientResult<VoteOutcome> {
        let prev_choice = self.choice(report_id);
        if prev_choice == Some(choice) {
            return Ok(VoteOutcome::Unchanged);
        }

        let prev_tally = self.displayed(report_id);

        // Persist first so a store failure leaves nothing half-applied.
        self.choices.insert(report_id.to_string(), choice);
        if let Err(e) = self.persist() {
            self.restore_choice(report_id, prev_choice);
            return Err(e);
        }
        self.tallies.insert(
            report_id.to_string(),
            prev_tally.apply_transition(prev_choice, choice),
        );

        match self
            .gateway
            .submit_vote(report_id, &self.voter_id, choice)
            .await
        {
            Ok(tally) => {
                self.tallies.insert(report_id.to_string(), tally);
                Ok(VoteOutcome::Confirmed(tally))
            }
            Err(e) => {
                tracing::warn!(report_id = %report_id, error = %e, "Vote failed, rolling back");
                self.tallies.insert(report_id.to_string(), prev_tally);
                self.restore_choice(report_id, prev_choice);
                if let Err(store_err) = self.persist() {
                    tracing::warn!(
                        report_id = %report_id,
                        error = %store_err,
                        "Failed to persist rolled back vote"
                    );
                }
                Err(e)
            }
        }
    }

    fn restore_choice(&mut self, report_id: &str, prev: Option<VoteChoice>) {
        match prev {
            Some(prev) => self.choices.insert(report_id.to_string(), prev),
            None => self.choices.remove(report_id),
        };
    }

    fn persist(&self) -> ClientResult<()> {
        let map: HashMap<&str, i8> = self
            .choices
            .iter()
            .map(|(id, choice)| (id.as_str(), choice.as_i8()))
            .collect();
        self.store
            .set(USER_VOTES_KEY, &serde_json::to_string(&map)?)
    }
}

fn load_choices(store: &dyn LocalStore) -> ClientResult<HashMap<String, VoteChoice>> {
    let Some(raw) = store.get(USER_VOTES_KEY)? else {
        return Ok(HashMap::new());
    };

    let parsed: HashMap<String, i64> = match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable vote map");
            return Ok(HashMap::new());
        }
    };

    // 0 marks "no vote" and is dropped along with anything unrecognized.
    Ok(parsed
        .into_iter()
        .filter_map(|(id, value)| VoteChoice::from_i64(value).map(|c| (id, c)))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use satya_common::{NewReport, ReportView, UploadResponse};

    use super::*;
    use crate::error::ClientError;
    use crate::store::MemoryStore;

    /// Gateway that answers votes from a scripted queue.
    #[derive(Default)]
    struct ScriptedGateway {
        replies: Mutex<Vec<ClientResult<VoteTally>>>,
        calls: Mutex<Vec<(String, VoteChoice)>>,
    }

    impl ScriptedGateway {
        fn reply(&self, reply: ClientResult<VoteTally>) {
            self.replies.lock().unwrap().insert(0, reply);
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReportGateway for ScriptedGateway {
        async fn create_report(&self, _report: &NewReport) -> ClientResult<ReportView> {
            unimplemented!()
        }

        async fn upload_image(
            &self,
            _file_name: &str,
            _content_type: &str,
            _data: Vec<u8>,
        ) -> ClientResult<UploadResponse> {
            unimplemented!()
        }

        async fn trending(&self, _limit: Option<u64>) -> ClientResult<Vec<TrendingReport>> {
            Ok(Vec::new())
        }

        async fn vote_counts(&self, _report_id: &str) -> ClientResult<VoteTally> {
            Ok(VoteTally::default())
        }

        async fn submit_vote(
            &self,
            report_id: &str,
            _voter_id: &str,
            choice: VoteChoice,
        ) -> ClientResult<VoteTally> {
            self.calls
                .lock()
                .unwrap()
                .push((report_id.to_string(), choice));
            self.replies.lock().unwrap().pop().unwrap()
        }

        async fn delete_report(&self, _report_id: &str, _bearer_token: &str) -> ClientResult<()> {
            Ok(())
        }
    }

    /// Store that accepts a limited number of writes.
    struct BudgetStore {
        inner: MemoryStore,
        writes_left: AtomicUsize,
    }

    impl BudgetStore {
        fn new(writes: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                writes_left: AtomicUsize::new(writes),
            }
        }

        fn allow(&self, writes: usize) {
            self.writes_left.store(writes, Ordering::SeqCst);
        }
    }

    impl LocalStore for BudgetStore {
        fn get(&self, key: &str) -> ClientResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> ClientResult<()> {
            let granted = self
                .writes_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !granted {
                return Err(ClientError::Store("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn server_down() -> ClientError {
        ClientError::Api {
            status: 500,
            code: "INTERNAL_ERROR".to_string(),
            message: "Internal server error".to_string(),
        }
    }

    fn setup() -> (Arc<ScriptedGateway>, Arc<MemoryStore>, VoteReconciler) {
        let gateway = Arc::new(ScriptedGateway::default());
        let store = Arc::new(MemoryStore::new());
        let reconciler = VoteReconciler::new(gateway.clone(), store.clone()).unwrap();
        (gateway, store, reconciler)
    }

    fn seed(reconciler: &mut VoteReconciler, id: &str, tally: VoteTally) {
        reconciler.tallies.insert(id.to_string(), tally);
    }

    #[tokio::test]
    async fn test_server_tally_replaces_optimistic_counters() {
        let (gateway, store, mut reconciler) = setup();
        seed(&mut reconciler, "r1", VoteTally::new(4, 2));
        // Another device voted in the meantime.
        gateway.reply(Ok(VoteTally::new(6, 2)));

        let outcome = reconciler.vote("r1", VoteChoice::Like).await.unwrap();

        assert_eq!(outcome, VoteOutcome::Confirmed(VoteTally::new(6, 2)));
        assert_eq!(reconciler.displayed("r1"), VoteTally::new(6, 2));
        assert_eq!(reconciler.choice("r1"), Some(VoteChoice::Like));
        assert_eq!(
            store.get(USER_VOTES_KEY).unwrap().as_deref(),
            Some(r#"{"r1":1}"#)
        );
    }

    #[tokio::test]
    async fn test_same_choice_is_a_noop() {
        let (gateway, _store, mut reconciler) = setup();
        gateway.reply(Ok(VoteTally::new(1, 0)));

        reconciler.vote("r1", VoteChoice::Like).await.unwrap();
        let outcome = reconciler.vote("r1", VoteChoice::Like).await.unwrap();

        assert_eq!(outcome, VoteOutcome::Unchanged);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(reconciler.displayed("r1"), VoteTally::new(1, 0));
    }

    #[tokio::test]
    async fn test_failure_restores_choice_and_counters() {
        let (gateway, store, mut reconciler) = setup();
        seed(&mut reconciler, "r1", VoteTally::new(3, 1));
        gateway.reply(Ok(VoteTally::new(3, 2)));
        reconciler.vote("r1", VoteChoice::Dislike).await.unwrap();

        gateway.reply(Err(server_down()));
        let err = reconciler.vote("r1", VoteChoice::Like).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(reconciler.choice("r1"), Some(VoteChoice::Dislike));
        assert_eq!(reconciler.displayed("r1"), VoteTally::new(3, 2));
        assert_eq!(
            store.get(USER_VOTES_KEY).unwrap().as_deref(),
            Some(r#"{"r1":-1}"#)
        );
    }

    #[tokio::test]
    async fn test_failed_first_vote_clears_choice() {
        let (gateway, _store, mut reconciler) = setup();
        seed(&mut reconciler, "r1", VoteTally::new(0, 0));
        gateway.reply(Err(ClientError::Http("connection refused".to_string())));

        assert!(reconciler.vote("r1", VoteChoice::Dislike).await.is_err());
        assert_eq!(reconciler.choice("r1"), None);
        assert_eq!(reconciler.displayed("r1"), VoteTally::default());
    }

    #[tokio::test]
    async fn test_optimistic_counters_saturate() {
        let (gateway, _store, mut reconciler) = setup();
        // Stale choice from an earlier session while the feed shows zero likes.
        reconciler.choices.insert("r1".to_string(), VoteChoice::Like);
        seed(&mut reconciler, "r1", VoteTally::new(0, 0));
        gateway.reply(Err(server_down()));

        let tally = VoteTally::new(0, 0).apply_transition(Some(VoteChoice::Like), VoteChoice::Dislike);
        assert_eq!(tally, VoteTally::new(0, 1));

        reconciler.vote("r1", VoteChoice::Dislike).await.unwrap_err();
        assert_eq!(reconciler.displayed("r1"), VoteTally::new(0, 0));
    }

    #[tokio::test]
    async fn test_store_failure_leaves_state_untouched() {
        let gateway = Arc::new(ScriptedGateway::default());
        // One write for the voter id, none for the vote map.
        let store = Arc::new(BudgetStore::new(1));
        let mut reconciler = VoteReconciler::new(gateway.clone(), store.clone()).unwrap();
        seed(&mut reconciler, "r1", VoteTally::new(2, 0));

        let err = reconciler.vote("r1", VoteChoice::Like).await.unwrap_err();

        assert!(matches!(err, ClientError::Store(_)));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(reconciler.choice("r1"), None);
        assert_eq!(reconciler.displayed("r1"), VoteTally::new(2, 0));

        // Once the store recovers the same vote goes through.
        store.allow(10);
        gateway.reply(Ok(VoteTally::new(3, 0)));
        assert_eq!(
            reconciler.vote("r1", VoteChoice::Like).await.unwrap(),
            VoteOutcome::Confirmed(VoteTally::new(3, 0))
        );
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_rollback_keeps_submission_error_when_store_fails() {
        let gateway = Arc::new(ScriptedGateway::default());
        // Voter id and the optimistic write succeed; the rollback write fails.
        let store = Arc::new(BudgetStore::new(2));
        let mut reconciler = VoteReconciler::new(gateway.clone(), store.clone()).unwrap();
        seed(&mut reconciler, "r1", VoteTally::new(1, 1));
        gateway.reply(Err(server_down()));

        let err = reconciler.vote("r1", VoteChoice::Dislike).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(reconciler.choice("r1"), None);
        assert_eq!(reconciler.displayed("r1"), VoteTally::new(1, 1));
    }

    #[tokio::test]
    async fn test_choices_survive_new_instances() {
        let (gateway, store, mut reconciler) = setup();
        gateway.reply(Ok(VoteTally::new(0, 1)));
        reconciler.vote("r9", VoteChoice::Dislike).await.unwrap();
        let voter = reconciler.voter_id().to_string();

        let reloaded = VoteReconciler::new(gateway.clone(), store.clone()).unwrap();
        assert_eq!(reloaded.choice("r9"), Some(VoteChoice::Dislike));
        assert_eq!(reloaded.voter_id(), voter);
    }

    #[test]
    fn test_unreadable_or_zero_entries_are_ignored() {
        let store = MemoryStore::new();
        store
            .set(USER_VOTES_KEY, r#"{"a":1,"b":0,"c":-1,"d":7}"#)
            .unwrap();
        let choices = load_choices(&store).unwrap();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices["c"], VoteChoice::Dislike);

        store.set(USER_VOTES_KEY, "{oops").unwrap();
        assert!(load_choices(&store).unwrap().is_empty());
    }
}
