//! Vote wire types shared by the server and the client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A voter's choice on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum VoteChoice {
    /// `+1`
    Like,
    /// `-1`
    Dislike,
}

impl VoteChoice {
    /// Wire value of the choice.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Like => 1,
            Self::Dislike => -1,
        }
    }

    /// Parse a wire value. Anything other than `1` or `-1` is rejected.
    #[must_use]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Like),
            -1 => Some(Self::Dislike),
            _ => None,
        }
    }
}

impl TryFrom<i8> for VoteChoice {
    type Error = InvalidVoteChoice;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::from_i64(i64::from(value)).ok_or(InvalidVoteChoice(i64::from(value)))
    }
}

impl From<VoteChoice> for i8 {
    fn from(choice: VoteChoice) -> Self {
        choice.as_i8()
    }
}

impl From<VoteChoice> for i16 {
    fn from(choice: VoteChoice) -> Self {
        Self::from(choice.as_i8())
    }
}

/// A vote value outside `{1, -1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("vote must be 1 or -1, got {0}")]
pub struct InvalidVoteChoice(pub i64);

/// Like/dislike counts for one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Rows with `+1`.
    pub likes: u64,
    /// Rows with `-1`.
    pub dislikes: u64,
}

impl VoteTally {
    /// Build a tally from explicit counts.
    #[must_use]
    pub const fn new(likes: u64, dislikes: u64) -> Self {
        Self { likes, dislikes }
    }

    /// Total number of voters counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.likes + self.dislikes
    }

    /// Count one more vote for `choice`.
    pub const fn record(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Like => self.likes += 1,
            VoteChoice::Dislike => self.dislikes += 1,
        }
    }

    /// Apply the slot transition `prev -> next` to the displayed counters.
    ///
    /// Counters never go below zero. A transition to the current choice
    /// leaves the tally untouched.
    #[must_use]
    pub const fn apply_transition(self, prev: Option<VoteChoice>, next: VoteChoice) -> Self {
        let mut tally = self;
        match (prev, next) {
            (Some(VoteChoice::Like), VoteChoice::Like)
            | (Some(VoteChoice::Dislike), VoteChoice::Dislike) => {}
            (None, VoteChoice::Like) => tally.likes += 1,
            (None, VoteChoice::Dislike) => tally.dislikes += 1,
            (Some(VoteChoice::Dislike), VoteChoice::Like) => {
                tally.likes += 1;
                tally.dislikes = tally.dislikes.saturating_sub(1);
            }
            (Some(VoteChoice::Like), VoteChoice::Dislike) => {
                tally.dislikes += 1;
                tally.likes = tally.likes.saturating_sub(1);
            }
        }
        tally
    }
}

/// Body of `POST /reports/{id}/vote`.
///
/// Fields are loosely typed so the server can report which one is wrong.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteRequest {
    /// Anonymous voter identity.
    #[serde(default)]
    pub voter_id: Option<String>,
    /// `1` or `-1`.
    #[serde(default)]
    pub vote: Option<serde_json::Value>,
}

impl VoteRequest {
    /// Request body for a well-formed vote.
    #[must_use]
    pub fn new(voter_id: impl Into<String>, choice: VoteChoice) -> Self {
        Self {
            voter_id: Some(voter_id.into()),
            vote: Some(serde_json::Value::from(choice.as_i8())),
        }
    }
}
