use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::api::middleware::verify_token::AuthUser;
use crate::api::server::{AppState, JsonResult, QueryParams, RouteError};
use crate::db::prelude::{
    AnalyticsRepository, DetectionRepository, FeedbackRepository, LeaderboardRepository,
    Repository,
};
use crate::reporting::impact::ImpactReport;
use crate::reporting::{Dashboard, total_impact};
use crate::scoring::{LeaderboardResponse, Period};

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> JsonResult<Dashboard> {
    let analytics = AnalyticsRepository::new(state.db_pool)
        .get_or_create(user.id)
        .await?;
    let detections = DetectionRepository::new(state.db_pool)
        .list_for_user(user.id)
        .await?;
    let feedback_count = FeedbackRepository::new(state.db_pool)
        .count_for_user(user.id)
        .await?;

    Ok(Json(Dashboard::compile(
        &analytics,
        &detections,
        feedback_count,
        Utc::now().naive_utc(),
    )))
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn environmental_impact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> JsonResult<ImpactReport> {
    let detections = DetectionRepository::new(state.db_pool)
        .list_for_user(user.id)
        .await?;

    Ok(Json(total_impact(&detections).into_report()))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub period: Option<String>,
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn leaderboard(
    QueryParams(params): QueryParams<LeaderboardParams>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> JsonResult<LeaderboardResponse> {
    let period = match params.period.as_deref() {
        Some(period) => period.parse::<Period>().map_err(RouteError::BadRequest)?,
        None => Period::default(),
    };

    let board = LeaderboardRepository::new(state.db_pool)
        .leaderboard(period, user.id)
        .await?;

    Ok(Json(board))
}
