use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::api::middleware::verify_token::AuthUser;
use crate::api::server::{AppState, JsonBody, JsonResult, RouteError};
use crate::constants::DETECTION_HISTORY_LIMIT;
use crate::db::models::detection::DetectedItem;
use crate::db::prelude::{DetectionRepository, NewDetection, Repository, UserId, WasteDetection};
use crate::reporting::advice::{recommendations, suggested_points};
use crate::reporting::impact::ScanImpact;

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    /// Base64 image bytes, optionally wrapped in a `data:` URL
    pub image_data: String,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub id: i64,
    pub detected_items: Vec<DetectedItem>,
    pub recommendations: Vec<String>,
    pub environmental_impact: ScanImpact,
    pub suggested_points: i64,
    pub created_at: NaiveDateTime,
}

#[instrument(skip(state, body), fields(user_id = %user.id))]
pub async fn detect_waste(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<DetectRequest>,
) -> JsonResult<DetectionResponse> {
    let image = decode_image(&body.image_data)?;
    let image_path = store_upload(&state.env.upload_dir, user.id, &image).await?;

    let detected_items = state.vision.classify(&image).await;
    let inserted = DetectionRepository::new(state.db_pool)
        .insert(&NewDetection {
            user_id: user.id,
            image_path: image_path.clone(),
            detected_items,
            location_lat: body.location_lat,
            location_lng: body.location_lng,
        })
        .await;

    let detection = match inserted {
        Ok(detection) => detection,
        Err(e) => {
            discard_upload(&image_path).await;
            return Err(e.into());
        }
    };

    let items = detection.detected_items.0;
    tracing::info!(
        detection_id = detection.id,
        items = items.len(),
        "stored waste detection"
    );

    Ok(Json(DetectionResponse {
        id: detection.id,
        recommendations: recommendations(&items),
        environmental_impact: ScanImpact::of(&items),
        suggested_points: suggested_points(&items),
        detected_items: items,
        created_at: detection.created_at,
    }))
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn detection_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> JsonResult<Vec<WasteDetection>> {
    let detections = DetectionRepository::new(state.db_pool)
        .recent_for_user(user.id, DETECTION_HISTORY_LIMIT)
        .await?;

    Ok(Json(detections))
}

fn decode_image(image_data: &str) -> Result<Vec<u8>, RouteError> {
    let payload = match image_data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => image_data,
    };

    let image = STANDARD
        .decode(payload.trim())
        .map_err(|e| RouteError::BadRequest(format!("invalid image data: {e}")))?;

    if image.is_empty() {
        return Err(RouteError::BadRequest(String::from(
            "invalid image data: empty image",
        )));
    }

    Ok(image)
}

/// Writes the raw upload as `detection_<user>_<uuid>.jpg` and returns its path.
async fn store_upload(upload_dir: &str, user_id: UserId, image: &[u8]) -> std::io::Result<String> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let path = Path::new(upload_dir).join(format!("detection_{}_{}.jpg", user_id, Uuid::new_v4()));
    tokio::fs::write(&path, image).await?;

    tracing::debug!(path = %path.display(), bytes = image.len(), "stored upload");
    Ok(path.to_string_lossy().into_owned())
}

/// Removes an upload whose detection row was never written.
async fn discard_upload(path: &str) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(error = %e, path, "failed to remove orphaned upload");
    }
}
