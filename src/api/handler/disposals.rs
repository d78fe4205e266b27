use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::api::middleware::verify_token::AuthUser;
use crate::api::server::{AppState, JsonBody, JsonResult, QueryParams, RouteError};
use crate::constants::{DEFAULT_RECENT_DISPOSALS, MAX_RECENT_DISPOSALS};
use crate::db::prelude::{Disposal, DisposalRepository, NewDisposal, Repository};

#[instrument(skip(state, body), fields(user_id = %user.id))]
pub async fn create_disposal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<NewDisposal>,
) -> JsonResult<Disposal> {
    let waste_type = body
        .waste_type
        .as_deref()
        .map(str::trim)
        .filter(|wt| !wt.is_empty())
        .ok_or_else(|| RouteError::BadRequest(String::from("waste_type is required")))?;

    if body.points_earned < 0 {
        return Err(RouteError::BadRequest(String::from(
            "points_earned must not be negative",
        )));
    }

    let disposal = DisposalRepository::new(state.db_pool)
        .insert(
            user.id,
            waste_type,
            body.points_earned,
            body.bin_id,
            body.weight,
            Utc::now().naive_utc(),
        )
        .await?;

    tracing::debug!(disposal_id = disposal.id, waste_type, "recorded disposal");
    Ok(Json(disposal))
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<i64>,
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn recent_disposals(
    QueryParams(params): QueryParams<RecentParams>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> JsonResult<Vec<Disposal>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECENT_DISPOSALS)
        .clamp(1, MAX_RECENT_DISPOSALS);

    let disposals = DisposalRepository::new(state.db_pool)
        .recent_for_user(user.id, limit)
        .await?;

    Ok(Json(disposals))
}
