use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use sqlx::{Pool, Postgres, Result as SqlxResult};
use tracing::instrument;

use crate::constants::LEADERBOARD_SIZE;
use crate::db::prelude::{AnalyticsPoints, Identity, PeriodTotal, ProfilePoints, UserId};
use crate::scoring::reconcile::ScoreLedger;
use crate::scoring::window::period_board;
use crate::scoring::{Board, LeaderboardResponse, Period};

pub struct LeaderboardRepository {
    pool: &'static Pool<Postgres>,
}

impl LeaderboardRepository {
    pub fn new(pool: &'static Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Top of the board for `period` plus the requester's rank. Any failed query fails the whole
    /// board.
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        period: Period,
        requester: UserId,
    ) -> SqlxResult<LeaderboardResponse> {
        let board = match period.since(Utc::now().naive_utc()) {
            Some(since) => {
                let totals = self.period_totals(since).await?;
                period_board(totals, requester, LEADERBOARD_SIZE)
            }
            None => {
                let analytics = self.analytics_points().await?;
                let profiles = self.profile_points().await?;
                ScoreLedger::merge(analytics, profiles).board(requester, LEADERBOARD_SIZE)
            }
        };

        let identities = self.identities(&board.user_ids()).await?;
        tracing::debug!(
            ?period,
            entries = board.top.len(),
            current_user_rank = board.current_user_rank,
            "built leaderboard"
        );

        Ok(Board::into_response(board, requester, &identities))
    }

    #[instrument(skip(self))]
    pub async fn analytics_points(&self) -> SqlxResult<Vec<AnalyticsPoints>> {
        sqlx::query_as::<_, AnalyticsPoints>(
            r#"
            SELECT
                user_id,
                COALESCE(points_earned, 0) AS points_earned,
                COALESCE(total_scans, 0) AS total_scans
            FROM user_analytics
            "#,
        )
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn profile_points(&self) -> SqlxResult<Vec<ProfilePoints>> {
        sqlx::query_as::<_, ProfilePoints>(
            r#"
            SELECT
                user_id,
                COALESCE(points, 0) AS points
            FROM profiles
            "#,
        )
        .fetch_all(self.pool)
        .await
    }

    /// Summed disposal points and disposal counts per user since `since`.
    #[instrument(skip(self))]
    pub async fn period_totals(&self, since: NaiveDateTime) -> SqlxResult<Vec<PeriodTotal>> {
        sqlx::query_as::<_, PeriodTotal>(
            r#"
            SELECT
                user_id,
                COALESCE(SUM(points_earned), 0)::BIGINT AS points,
                COUNT(id) AS scans
            FROM disposals
            WHERE created_at >= $1
            GROUP BY user_id
            "#,
        )
        .bind(since)
        .fetch_all(self.pool)
        .await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn identities(&self, ids: &[UserId]) -> SqlxResult<HashMap<UserId, Identity>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, Identity>(
            r#"
            SELECT
                ids.id AS user_id,
                p.full_name AS profile_name,
                p.avatar_url AS avatar_url,
                u.full_name AS user_name,
                u.email AS email
            FROM UNNEST($1::BIGINT[]) AS ids(id)
            LEFT JOIN users u ON u.id = ids.id
            LEFT JOIN profiles p ON p.user_id = ids.id
            "#,
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.user_id, row)).collect())
    }
}
