//! Authenticated session handed to every gateway call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An active sign-in.
///
/// Issued by the auth collaborator and passed explicitly into the
/// persistence gateway; there is no ambient "current session".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    /// Signed access token (JWT).
    pub access_token: String,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Checks whether the session is no longer valid at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
