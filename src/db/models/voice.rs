use chrono::NaiveDateTime;
use serde::Serialize;

use super::user::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VoiceInteraction {
    pub id: i64,
    pub user_id: UserId,
    pub message: String,
    pub response: String,
    pub created_at: NaiveDateTime,
}
