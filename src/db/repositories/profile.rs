use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use super::sql_fragment;
use crate::db::prelude::{Profile, Tx, UserId};
use crate::db::repositories::Repository;

#[derive(Debug)]
pub struct ProfileRepository {
    pool: &'static Pool<Postgres>,
}

#[async_trait::async_trait]
impl Repository for ProfileRepository {
    type Output = Profile;

    const BASE_FIELDS: &'static str = sql_fragment::PROFILE_FIELDS;
    const TABLE_NAME: &'static str = "profiles";

    #[instrument(skip(pool))]
    fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &'static Pool<Postgres> {
        self.pool
    }
}

impl ProfileRepository {
    /// Returns the caller's profile, creating it from the users row when missing. `Ok(None)` means
    /// there is no user to build a profile from.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, user_id: UserId) -> SqlxResult<Option<Profile>> {
        if let Some(profile) = self.get_for_user(user_id).await? {
            return Ok(Some(profile));
        }

        let mut tx = Tx::begin(self.pool).await?;
        if !tx.ensure_profile(user_id).await? {
            tracing::warn!(%user_id, "no user row to create a profile from");
            tx.rollback().await?;
            return Ok(None);
        }
        tx.commit().await?;

        tracing::info!(%user_id, "created profile");
        self.get_for_user(user_id).await
    }

    /// Adds `points` (and optionally one disposal/scan) to both the profile and the analytics
    /// counters in one transaction. `Ok(None)` means there is no such user.
    #[instrument(skip(self))]
    pub async fn add_points(
        &self,
        user_id: UserId,
        points: i64,
        increment_disposals: bool,
    ) -> SqlxResult<Option<Profile>> {
        let step = i64::from(increment_disposals);

        let mut tx = Tx::begin(self.pool).await?;
        if !tx.ensure_profile(user_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let profile = tx.increment_profile(user_id, points, step).await?;
        tx.increment_analytics(user_id, points, step).await?;
        tx.commit().await?;

        tracing::debug!(
            %user_id,
            points,
            total_points = profile.points,
            total_disposals = profile.total_disposals,
            "added points"
        );

        Ok(Some(profile))
    }
}
