use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::middleware::verify_token::AuthUser;
use crate::api::server::{AppState, JsonBody, JsonResult, RouteError};
use crate::db::prelude::{Profile, ProfileRepository, Repository};

const USER_NOT_FOUND: &str = "User not found";

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn get_or_create_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> JsonResult<Profile> {
    ProfileRepository::new(state.db_pool)
        .get_or_create(user.id)
        .await?
        .map(Json)
        .ok_or(RouteError::NotFound(USER_NOT_FOUND))
}

#[derive(Debug, Deserialize)]
pub struct AddPoints {
    #[serde(default)]
    pub points: i64,
    #[serde(default = "increment_by_default")]
    pub increment_disposals: bool,
}

fn increment_by_default() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PointsOutcome {
    Unchanged { updated: bool },
    Updated(Profile),
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn add_points(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<AddPoints>,
) -> JsonResult<PointsOutcome> {
    if body.points < 0 {
        return Err(RouteError::BadRequest(String::from(
            "points must not be negative",
        )));
    }

    if body.points == 0 && !body.increment_disposals {
        return Ok(Json(PointsOutcome::Unchanged { updated: false }));
    }

    ProfileRepository::new(state.db_pool)
        .add_points(user.id, body.points, body.increment_disposals)
        .await?
        .map(|profile| Json(PointsOutcome::Updated(profile)))
        .ok_or(RouteError::NotFound(USER_NOT_FOUND))
}
