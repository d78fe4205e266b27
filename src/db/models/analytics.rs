use chrono::NaiveDateTime;
use serde::Serialize;

use super::user::UserId;

/// Base user_analytics table model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserAnalytics {
    pub id: i64,
    pub user_id: UserId,
    pub total_scans: i64,
    pub total_items_detected: i64,
    pub recycling_score: f64,
    pub points_earned: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Point and scan totals as recorded in the analytics table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AnalyticsPoints {
    pub user_id: UserId,
    pub points_earned: i64,
    pub total_scans: i64,
}
