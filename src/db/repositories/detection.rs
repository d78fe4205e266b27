use sqlx::types::Json;
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use super::sql_fragment;
use crate::db::prelude::{NewDetection, UserId, WasteDetection};
use crate::db::repositories::Repository;

#[derive(Debug)]
pub struct DetectionRepository {
    pool: &'static Pool<Postgres>,
}

#[async_trait::async_trait]
impl Repository for DetectionRepository {
    type Output = WasteDetection;

    const BASE_FIELDS: &'static str = sql_fragment::DETECTION_FIELDS;
    const TABLE_NAME: &'static str = "waste_detections";

    #[instrument(skip(pool))]
    fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &'static Pool<Postgres> {
        self.pool
    }
}

impl DetectionRepository {
    #[instrument(skip(self, detection), fields(user_id = %detection.user_id, items = detection.detected_items.len()))]
    pub async fn insert(&self, detection: &NewDetection) -> SqlxResult<WasteDetection> {
        sqlx::query_as::<_, WasteDetection>(&format!(
            r#"
            INSERT INTO waste_detections (
                user_id,
                image_path,
                detected_items,
                confidence_scores,
                disposal_recommendations,
                location_lat,
                location_lng,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING {}
            "#,
            sql_fragment::DETECTION_FIELDS
        ))
        .bind(detection.user_id)
        .bind(&detection.image_path)
        .bind(Json(&detection.detected_items))
        .bind(Json(detection.confidence_scores()))
        .bind(Json(detection.disposal_methods()))
        .bind(detection.location_lat)
        .bind(detection.location_lng)
        .fetch_one(self.pool)
        .await
    }

    /// Full detection history for `user_id`, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId) -> SqlxResult<Vec<WasteDetection>> {
        sqlx::query_as::<_, WasteDetection>(&format!(
            r#"
            SELECT {}
            FROM waste_detections
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
            sql_fragment::DETECTION_FIELDS
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await
    }
}
