use core::fmt;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Result as SqlxResult, Transaction};
use tracing::instrument;

use crate::db::prelude::{Profile, UserId};

pub mod analytics;
pub mod detection;
pub mod disposal;
pub mod feedback;
pub mod leaderboard;
pub mod profile;
pub mod voice;

/// Multi-statement write wrapper; dropping it without [`Tx::commit`] rolls back.
pub struct Tx<'a> {
    inner: Option<Transaction<'a, Postgres>>,
}

impl<'a> Tx<'a> {
    #[instrument(skip(pool))]
    pub async fn begin(pool: &'static Pool<Postgres>) -> SqlxResult<Self> {
        let inner = pool.begin().await?;
        Ok(Self { inner: Some(inner) })
    }

    #[instrument(skip(self))]
    pub async fn commit(&mut self) -> SqlxResult<()> {
        if let Some(tx) = self.inner.take() {
            tx.commit().await
        } else {
            Err(sqlx::Error::Protocol(
                "Transaction already completed".into(),
            ))
        }
    }

    #[instrument(skip(self))]
    pub async fn rollback(&mut self) -> SqlxResult<()> {
        if let Some(tx) = self.inner.take() {
            tx.rollback().await
        } else {
            Err(sqlx::Error::Protocol(
                "Transaction already completed".into(),
            ))
        }
    }

    fn inner_mut(&mut self) -> SqlxResult<&mut Transaction<'a, Postgres>> {
        self.inner
            .as_mut()
            .ok_or_else(|| sqlx::Error::Protocol("Transaction already completed".into()))
    }

    /// Creates the profile for `user_id` from its users row if none exists yet. `Ok(false)`
    /// means there is no such user.
    ///
    /// A profile that already exists, or that a concurrent transaction commits first, is
    /// returned through the conflict arm.
    #[instrument(skip(self))]
    pub async fn ensure_profile(&mut self, user_id: UserId) -> SqlxResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO profiles (
                user_id,
                full_name,
                email,
                points,
                total_disposals,
                bins_used,
                created_at,
                updated_at
            )
            SELECT id, full_name, email, 0, 0, 0, NOW(), NOW()
            FROM users
            WHERE id = $1
            ON CONFLICT (user_id)
            DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut **self.inner_mut()?)
        .await?;

        Ok(found.is_some())
    }

    /// Adds to the profile's counters in a single statement so concurrent increments can't
    /// overwrite each other.
    #[instrument(skip(self))]
    pub async fn increment_profile(
        &mut self,
        user_id: UserId,
        points: i64,
        disposals: i64,
    ) -> SqlxResult<Profile> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET points = points + $2,
                total_disposals = total_disposals + $3,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            sql_fragment::PROFILE_FIELDS
        ))
        .bind(user_id)
        .bind(points)
        .bind(disposals)
        .fetch_one(&mut **self.inner_mut()?)
        .await
    }

    #[instrument(skip(self))]
    pub async fn increment_analytics(
        &mut self,
        user_id: UserId,
        points: i64,
        scans: i64,
    ) -> SqlxResult<()> {
        let res: (i64, i64) = sqlx::query_as(
            r#"
            INSERT INTO user_analytics (
                user_id,
                total_scans,
                points_earned,
                created_at,
                updated_at
            )
            VALUES ($1, $3, $2, NOW(), NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                total_scans = user_analytics.total_scans + EXCLUDED.total_scans,
                points_earned = user_analytics.points_earned + EXCLUDED.points_earned,
                updated_at = NOW()
            RETURNING points_earned, total_scans
            "#,
        )
        .bind(user_id)
        .bind(points)
        .bind(scans)
        .fetch_one(&mut **self.inner_mut()?)
        .await?;

        tracing::debug!(points_earned = res.0, total_scans = res.1, "updated analytics counters");
        Ok(())
    }
}

pub mod sql_fragment {
    pub const PROFILE_FIELDS: &str = r#"
        id,
        user_id,
        full_name,
        email,
        avatar_url,
        points,
        total_disposals,
        bins_used,
        created_at,
        updated_at
    "#;

    pub const ANALYTICS_FIELDS: &str = r#"
        id,
        user_id,
        total_scans,
        total_items_detected,
        recycling_score,
        points_earned,
        created_at,
        updated_at
    "#;

    pub const DISPOSAL_FIELDS: &str = r#"
        id,
        user_id,
        bin_id,
        waste_type,
        points_earned,
        weight,
        created_at
    "#;

    pub const DETECTION_FIELDS: &str = r#"
        id,
        user_id,
        image_path,
        detected_items,
        confidence_scores,
        disposal_recommendations,
        location_lat,
        location_lng,
        created_at
    "#;

    pub const FEEDBACK_FIELDS: &str = r#"
        id,
        user_id,
        message,
        rating,
        created_at
    "#;

    pub const VOICE_FIELDS: &str = r#"
        id,
        user_id,
        message,
        response,
        created_at
    "#;
}

/// Shared per-user lookups over a table whose rows belong to a single user.
#[async_trait]
pub trait Repository {
    type Output: for<'r> sqlx::FromRow<'r, <Postgres as sqlx::Database>::Row>
        + Sized
        + Unpin
        + Send
        + fmt::Debug;

    const BASE_FIELDS: &'static str;
    const TABLE_NAME: &'static str;

    fn new(pool: &'static Pool<Postgres>) -> Self
    where
        Self: Sized;

    fn pool(&self) -> &'static Pool<Postgres>;

    #[instrument(skip(self), fields(table = Self::TABLE_NAME))]
    async fn get_for_user(&self, user_id: UserId) -> SqlxResult<Option<Self::Output>> {
        sqlx::query_as::<_, Self::Output>(&format!(
            "SELECT {} FROM {} WHERE user_id = $1 LIMIT 1",
            Self::BASE_FIELDS,
            Self::TABLE_NAME
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
    }

    #[instrument(skip(self), fields(table = Self::TABLE_NAME))]
    async fn count_for_user(&self, user_id: UserId) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = $1",
            Self::TABLE_NAME
        ))
        .bind(user_id)
        .fetch_one(self.pool())
        .await
    }

    /// Newest-first rows owned by `user_id`.
    #[instrument(skip(self), fields(table = Self::TABLE_NAME))]
    async fn recent_for_user(&self, user_id: UserId, limit: i64) -> SqlxResult<Vec<Self::Output>> {
        sqlx::query_as::<_, Self::Output>(&format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
            Self::BASE_FIELDS,
            Self::TABLE_NAME
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
    }
}

/// Row builders for `#[sqlx::test]` databases.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDateTime;
    use sqlx::PgPool;

    use crate::db::prelude::UserId;

    /// Repositories borrow the pool for `'static`; every `#[sqlx::test]` gets a fresh database.
    pub fn leak(pool: PgPool) -> &'static PgPool {
        Box::leak(Box::new(pool))
    }

    pub async fn user(pool: &PgPool, email: &str, full_name: Option<&str>) -> UserId {
        sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (email, full_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(email)
        .bind(full_name)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    pub async fn profile(pool: &PgPool, user_id: UserId, full_name: &str, points: i64) {
        sqlx::query("INSERT INTO profiles (user_id, full_name, points) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(full_name)
            .bind(points)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn analytics(pool: &PgPool, user_id: UserId, points: i64, scans: i64) {
        sqlx::query(
            "INSERT INTO user_analytics (user_id, points_earned, total_scans) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(points)
        .bind(scans)
        .execute(pool)
        .await
        .unwrap();
    }

    pub async fn disposal(pool: &PgPool, user_id: UserId, points: i64, at: NaiveDateTime) {
        sqlx::query(
            "INSERT INTO disposals (user_id, waste_type, points_earned, created_at) VALUES ($1, 'plastic', $2, $3)",
        )
        .bind(user_id)
        .bind(points)
        .bind(at)
        .execute(pool)
        .await
        .unwrap();
    }
}
