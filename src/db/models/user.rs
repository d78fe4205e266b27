use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

/// Naming details for a leaderboard row; any part may be absent when the user only exists in one
/// of the score tables.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct Identity {
    pub user_id: UserId,
    pub profile_name: Option<String>,
    pub avatar_url: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub const ANONYMOUS: &'static str = "Anonymous";

    pub fn unknown(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    /// Profile name, then account name, then email, then [`Identity::ANONYMOUS`]. Blank names are
    /// skipped.
    pub fn display_name(&self) -> String {
        [&self.profile_name, &self.user_name, &self.email]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| String::from(Self::ANONYMOUS))
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId(value)
    }
}

impl Default for UserId {
    fn default() -> Self {
        UserId(0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
