//! API response types.

use serde::{Deserialize, Serialize};

/// Plain acknowledgement: `{"ok": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    /// A successful acknowledgement.
    pub const OK: Self = Self { ok: true };
}

/// Liveness report of the service and its database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub db: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
