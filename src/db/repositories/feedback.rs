use sqlx::{Pool, Postgres};

use super::sql_fragment;
use crate::db::prelude::Feedback;
use crate::db::repositories::Repository;

#[derive(Debug)]
pub struct FeedbackRepository {
    pool: &'static Pool<Postgres>,
}

#[async_trait::async_trait]
impl Repository for FeedbackRepository {
    type Output = Feedback;

    const BASE_FIELDS: &'static str = sql_fragment::FEEDBACK_FIELDS;
    const TABLE_NAME: &'static str = "feedback";

    fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &'static Pool<Postgres> {
        self.pool
    }
}
