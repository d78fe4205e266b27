use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use super::sql_fragment;
use crate::db::prelude::{UserAnalytics, UserId};
use crate::db::repositories::Repository;

#[derive(Debug)]
pub struct AnalyticsRepository {
    pool: &'static Pool<Postgres>,
}

#[async_trait::async_trait]
impl Repository for AnalyticsRepository {
    type Output = UserAnalytics;

    const BASE_FIELDS: &'static str = sql_fragment::ANALYTICS_FIELDS;
    const TABLE_NAME: &'static str = "user_analytics";

    #[instrument(skip(pool))]
    fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &'static Pool<Postgres> {
        self.pool
    }
}

impl AnalyticsRepository {
    /// Returns the analytics row for `user_id`, inserting a zeroed one on first access.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, user_id: UserId) -> SqlxResult<UserAnalytics> {
        let inserted = sqlx::query_as::<_, UserAnalytics>(&format!(
            r#"
            INSERT INTO user_analytics (
                user_id,
                total_scans,
                total_items_detected,
                recycling_score,
                points_earned,
                created_at,
                updated_at
            )
            VALUES ($1, 0, 0, 0, 0, NOW(), NOW())
            ON CONFLICT (user_id)
            DO NOTHING
            RETURNING {}
            "#,
            sql_fragment::ANALYTICS_FIELDS
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await;

        match inserted {
            Ok(Some(row)) => {
                tracing::info!(%user_id, "created analytics record");
                Ok(row)
            }
            Ok(None) => self
                .get_for_user(user_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
            Err(e) => {
                tracing::error!(error = ?e, "failure during analytics creation");
                Err(e)
            }
        }
    }
}
