//! Session context for the signed-in user.
//!
//! A [`Session`] is passed explicitly to each screen rather than read from
//! global state.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Who is using the app right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub is_admin: bool,
}

impl Session {
    /// A session for a signed-in user.
    #[must_use]
    pub fn logged_in(user_id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            user_name: Some(user_name.into()),
            is_admin: false,
        }
    }

    /// Signed-in user id, if the id is a real (positive) one.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id.filter(|id| id.as_i64() > 0)
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user_id().is_some()
    }
}

/// Result of a login (or logout) attempt, as reported by the login screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInfo {
    /// Whether the login popup should be dismissed.
    pub dismiss_popup: bool,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub is_admin: bool,
}

impl LoginInfo {
    /// The info for a signed-out state.
    #[must_use]
    pub const fn logged_out() -> Self {
        Self {
            dismiss_popup: true,
            user_id: None,
            user_name: None,
            is_admin: false,
        }
    }
}

impl From<&LoginInfo> for Session {
    fn from(info: &LoginInfo) -> Self {
        Self {
            user_id: info.user_id,
            user_name: info.user_name.clone(),
            is_admin: info.is_admin,
        }
    }
}
