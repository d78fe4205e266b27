use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use super::sql_fragment;
use crate::db::prelude::{Disposal, UserId};
use crate::db::repositories::Repository;

#[derive(Debug)]
pub struct DisposalRepository {
    pool: &'static Pool<Postgres>,
}

#[async_trait::async_trait]
impl Repository for DisposalRepository {
    type Output = Disposal;

    const BASE_FIELDS: &'static str = sql_fragment::DISPOSAL_FIELDS;
    const TABLE_NAME: &'static str = "disposals";

    #[instrument(skip(pool))]
    fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &'static Pool<Postgres> {
        self.pool
    }
}

impl DisposalRepository {
    #[instrument(skip(self, waste_type))]
    pub async fn insert(
        &self,
        user_id: UserId,
        waste_type: &str,
        points_earned: i64,
        bin_id: Option<i64>,
        weight: Option<f64>,
        created_at: NaiveDateTime,
    ) -> SqlxResult<Disposal> {
        match sqlx::query_as::<_, Disposal>(&format!(
            r#"
            INSERT INTO disposals (
                user_id,
                bin_id,
                waste_type,
                points_earned,
                weight,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            sql_fragment::DISPOSAL_FIELDS
        ))
        .bind(user_id)
        .bind(bin_id)
        .bind(waste_type)
        .bind(points_earned)
        .bind(weight)
        .bind(created_at)
        .fetch_one(self.pool)
        .await
        {
            Ok(disposal) => Ok(disposal),
            Err(e) => {
                tracing::error!(error = ?e, "failure during disposal insertion");
                Err(e)
            }
        }
    }
}
