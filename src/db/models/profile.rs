use chrono::NaiveDateTime;
use serde::Serialize;

use super::user::UserId;

/// Base profiles table model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub points: i64,
    pub total_disposals: i64,
    pub bins_used: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Point total as recorded on a profile; one of the two score sources merged into the all-time
/// leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfilePoints {
    pub user_id: UserId,
    pub points: i64,
}
