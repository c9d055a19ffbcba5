//! End-to-end tests: the HTTP client against the real router on a socket.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use jsonwebtoken::{EncodingKey, Header, encode};
use satya_api::{AppState, app};
use satya_client::{
    Analysis, ClientError, Feed, HttpReportClient, MemoryStore, PublishDraft, ReportGateway,
    VoteOutcome, VoteReconciler,
};
use satya_common::{LocalStorage, StorageBackend, VoteChoice, VoteTally};
use satya_core::{AdminPolicy, JwtIdentityProvider};
use satya_db::test_utils::TestDatabase;
use serde_json::json;
use tokio::net::TcpListener;

const SECRET: &str = "roundtrip-secret";
const ADMIN_EMAIL: &str = "editor@satya.test";

struct Server {
    client: Arc<HttpReportClient>,
    media_dir: PathBuf,
    _db: TestDatabase,
}

impl Drop for Server {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.media_dir).ok();
    }
}

async fn serve() -> Server {
    let db = TestDatabase::with_url("sqlite::memory:").await.unwrap();
    let media_dir = std::env::temp_dir().join(format!(
        "satya-roundtrip-{}-{}",
        std::process::id(),
        rand::random::<u32>()
    ));
    let storage = LocalStorage::new(media_dir.clone(), "http://media.satya.test/files".into());
    storage.ensure_ready().await.unwrap();

    let authorizer = Arc::new(AdminPolicy::new(
        Arc::new(JwtIdentityProvider::new(SECRET, None)),
        [ADMIN_EMAIL],
    ));
    let router = app(AppState::new(db.connection(), Arc::new(storage), authorizer));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Server {
        client: Arc::new(HttpReportClient::new(format!("http://{addr}/api"))),
        media_dir,
        _db: db,
    }
}

fn token(email: &str) -> String {
    let claims = json!({
        "sub": "user-7",
        "email": email,
        "exp": chrono::Utc::now().timestamp() + 600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn publish(client: &HttpReportClient, content: &str) -> String {
    let draft = PublishDraft {
        content: content.to_string(),
        image_url: None,
        tags_input: "#roundtrip, test".to_string(),
        analysis: Analysis::with_reliability(21.5),
    };
    client
        .create_report(&draft.into_new_report())
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_publish_then_find_in_feed() {
    let server = serve().await;
    let id = publish(&server.client, "Celebrity spotted on Mars").await;

    let feed = Feed::load(server.client.as_ref(), Some(10)).await.unwrap();
    assert_eq!(feed.items().len(), 1);
    assert_eq!(feed.items()[0].report.id, id);
    assert_eq!(feed.items()[0].report.source_type.as_deref(), Some("headline"));
    assert_eq!(feed.search("roundtrip").len(), 1);
    assert_eq!(feed.items()[0].tally(), VoteTally::default());
}

#[tokio::test]
async fn test_reconciled_votes_from_two_devices() {
    let server = serve().await;
    let id = publish(&server.client, "Chocolate cures colds").await;
    let feed = Feed::load(server.client.as_ref(), None).await.unwrap();

    let mut phone = VoteReconciler::new(server.client.clone(), Arc::new(MemoryStore::new())).unwrap();
    let mut laptop = VoteReconciler::new(server.client.clone(), Arc::new(MemoryStore::new())).unwrap();
    phone.track(feed.items());
    laptop.track(feed.items());

    assert_eq!(
        phone.vote(&id, VoteChoice::Like).await.unwrap(),
        VoteOutcome::Confirmed(VoteTally::new(1, 0))
    );
    // The laptop still shows (0,0); the server tally corrects it.
    assert_eq!(
        laptop.vote(&id, VoteChoice::Dislike).await.unwrap(),
        VoteOutcome::Confirmed(VoteTally::new(1, 1))
    );
    assert_eq!(
        phone.vote(&id, VoteChoice::Like).await.unwrap(),
        VoteOutcome::Unchanged
    );
    assert_eq!(
        phone.vote(&id, VoteChoice::Dislike).await.unwrap(),
        VoteOutcome::Confirmed(VoteTally::new(0, 2))
    );

    assert_eq!(
        server.client.vote_counts(&id).await.unwrap(),
        VoteTally::new(0, 2)
    );
}

#[tokio::test]
async fn test_vote_on_missing_report_rolls_back() {
    let server = serve().await;
    let mut device =
        VoteReconciler::new(server.client.clone(), Arc::new(MemoryStore::new())).unwrap();

    let err = device.vote("no-such-report", VoteChoice::Like).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(device.choice("no-such-report"), None);
    assert_eq!(device.displayed("no-such-report"), VoteTally::default());
}

#[tokio::test]
async fn test_upload_then_publish_image_report() {
    let server = serve().await;

    let uploaded = server
        .client
        .upload_image("Fake Flyer.PNG", "image/png", vec![0x89, b'P', b'N', b'G'])
        .await
        .unwrap();
    assert!(uploaded.path.starts_with("uploads/Fake_Flyer_"));
    assert!(uploaded.path.ends_with(".png"));
    assert_eq!(
        uploaded.url,
        format!("http://media.satya.test/files/{}", uploaded.path)
    );
    assert!(server.media_dir.join(&uploaded.path).exists());

    let draft = PublishDraft {
        content: "Flyer circulating downtown".to_string(),
        image_url: Some(uploaded.url.clone()),
        tags_input: String::new(),
        analysis: Analysis::with_reliability(8.0),
    };
    let report = server
        .client
        .create_report(&draft.into_new_report())
        .await
        .unwrap();
    assert_eq!(report.source_type.as_deref(), Some("image"));

    server
        .client
        .delete_report(&report.id, &token(ADMIN_EMAIL))
        .await
        .unwrap();
    assert!(!server.media_dir.join(&uploaded.path).exists());
}

#[tokio::test]
async fn test_delete_requires_admin() {
    let server = serve().await;
    let id = publish(&server.client, "Moon landing staged").await;

    let err = server
        .client
        .delete_report(&id, &token("reader@satya.test"))
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status, 403);
            assert_eq!(code, "FORBIDDEN");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = server.client.delete_report(&id, "garbage").await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let mut feed = Feed::load(server.client.as_ref(), None).await.unwrap();
    assert_eq!(feed.items().len(), 1);

    server
        .client
        .delete_report(&id, &token(ADMIN_EMAIL))
        .await
        .unwrap();
    assert!(feed.remove(&id));
    assert!(
        server
            .client
            .trending(None)
            .await
            .unwrap()
            .is_empty()
    );
}
