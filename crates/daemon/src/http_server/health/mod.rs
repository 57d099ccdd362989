//! `/_status` probes: liveness, readiness and build info.

use serde::{Deserialize, Serialize};

pub mod liveness;
pub mod readiness;
pub mod version;

/// Body of the livez and readyz probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    pub fn unavailable(error: impl ToString) -> Self {
        Self {
            status: "unavailable".to_string(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
