use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::{info, instrument};

use crate::error::{ExportError, Result};

/// The run's single read-only database connection.
#[derive(Clone)]
pub struct Db {
    pub pool: AnyPool,
}

impl Db {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(ExportError::Connection)?;
        info!("connected to db");
        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
        info!("db connection closed");
    }
}
