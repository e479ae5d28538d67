use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

/// Explicit session context handed to the gateway at construction. The token
/// is the sole authentication signal; `admin` marks elevated privilege.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub admin: bool,
    /// When the backend issued the token with a known lifetime. A missing
    /// value means the token is assumed valid until the server rejects it.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Reject requests up front when there is no token or it is past expiry.
    pub fn require_valid(&self, now: DateTime<Utc>) -> Result<()> {
        if self.token.is_empty() {
            return Err(DeskError::NotLoggedIn);
        }
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return Err(DeskError::SessionExpired(expires_at.to_rfc3339()));
            }
        }
        Ok(())
    }
}
