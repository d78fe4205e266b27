use chrono::NaiveDateTime;
use serde::Serialize;

use super::user::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: i64,
    pub user_id: UserId,
    pub message: String,
    pub rating: Option<i32>,
    pub created_at: NaiveDateTime,
}
