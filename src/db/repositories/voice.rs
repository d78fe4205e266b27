use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use super::sql_fragment;
use crate::db::prelude::{UserId, VoiceInteraction};
use crate::db::repositories::Repository;

#[derive(Debug)]
pub struct VoiceRepository {
    pool: &'static Pool<Postgres>,
}

#[async_trait::async_trait]
impl Repository for VoiceRepository {
    type Output = VoiceInteraction;

    const BASE_FIELDS: &'static str = sql_fragment::VOICE_FIELDS;
    const TABLE_NAME: &'static str = "voice_interactions";

    fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &'static Pool<Postgres> {
        self.pool
    }
}

impl VoiceRepository {
    #[instrument(skip(self, message, response))]
    pub async fn insert(
        &self,
        user_id: UserId,
        message: &str,
        response: &str,
    ) -> SqlxResult<VoiceInteraction> {
        sqlx::query_as::<_, VoiceInteraction>(&format!(
            r#"
            INSERT INTO voice_interactions (user_id, message, response, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING {}
            "#,
            sql_fragment::VOICE_FIELDS
        ))
        .bind(user_id)
        .bind(message)
        .bind(response)
        .fetch_one(self.pool)
        .await
    }
}
