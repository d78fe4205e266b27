use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Base disposals table model; one row per disposal action.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Disposal {
    pub id: i64,
    pub user_id: UserId,
    pub bin_id: Option<i64>,
    pub waste_type: String,
    pub points_earned: Option<i64>,
    pub weight: Option<f64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDisposal {
    #[serde(default)]
    pub waste_type: Option<String>,
    #[serde(default)]
    pub points_earned: i64,
    #[serde(default)]
    pub bin_id: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Per-user disposal totals inside a leaderboard window.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PeriodTotal {
    pub user_id: UserId,
    pub points: i64,
    pub scans: i64,
}
