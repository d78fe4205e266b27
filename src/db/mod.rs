use std::sync::LazyLock;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::util::env::{self, EnvErr};

pub mod models;
pub mod repositories;

pub mod prelude {
    pub use crate::db::PgError;

    pub use crate::db::models::analytics::{AnalyticsPoints, UserAnalytics};
    pub use crate::db::models::detection::{NewDetection, WasteDetection};
    pub use crate::db::models::disposal::{Disposal, NewDisposal, PeriodTotal};
    pub use crate::db::models::feedback::Feedback;
    pub use crate::db::models::profile::{Profile, ProfilePoints};
    pub use crate::db::models::user::{Identity, UserId};
    pub use crate::db::models::voice::VoiceInteraction;

    pub use crate::db::repositories::Repository;
    pub use crate::db::repositories::Tx;
    pub use crate::db::repositories::analytics::AnalyticsRepository;
    pub use crate::db::repositories::detection::DetectionRepository;
    pub use crate::db::repositories::disposal::DisposalRepository;
    pub use crate::db::repositories::feedback::FeedbackRepository;
    pub use crate::db::repositories::leaderboard::LeaderboardRepository;
    pub use crate::db::repositories::profile::ProfileRepository;
    pub use crate::db::repositories::voice::VoiceRepository;
}

static DB_POOL: LazyLock<OnceCell<Db>> = LazyLock::new(OnceCell::new);
pub async fn db_pool() -> PgResult<&'static PgPool> {
    Ok(&DB_POOL
        .get_or_try_init(|| async { Db::new_pool().await })
        .await?
        .pool)
}

struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn new_pool() -> PgResult<Self> {
        let vars = env::env().await?;
        let pool = PgPoolOptions::new()
            .max_connections(vars.database_max_connections)
            .connect(&vars.database_url)
            .await?;

        tracing::debug!(
            max_connections = vars.database_max_connections,
            "connected database pool"
        );

        Ok(Self { pool })
    }
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> PgResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

pub type PgResult<T> = core::result::Result<T, PgError>;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error)]
pub enum PgError {
    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),

    #[error(transparent)]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    EnvError(#[from] EnvErr),
}
