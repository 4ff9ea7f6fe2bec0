use std::sync::Arc;
use std::time::Duration;

use sqlx::{mysql::MySqlPoolOptions, postgres::PgPoolOptions, Connection, MySqlPool, PgPool};

use crate::config::{Config, DbDriver};
use crate::error::{Error, Result};
use crate::repositories::{MySqlUserRepository, PgUserRepository, UserRepository};

const PING_TIMEOUT: Duration = Duration::from_secs(1);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection pool for whichever driver `DB_DRIVER` selected.
#[derive(Clone, Debug)]
pub enum Database {
    Postgres(PgPool),
    MySql(MySqlPool),
}

pub async fn create_pool(config: &Config) -> Result<Database> {
    let url = config.database_url();
    let max = config.db_max_open.max(1);
    // sqlx has no idle cap; the idle setting becomes the warm floor instead.
    let min = config.db_max_idle.min(max);

    let database = match config.db_driver {
        DbDriver::Postgres => Database::Postgres(
            PgPoolOptions::new()
                .max_connections(max)
                .min_connections(min)
                .max_lifetime(config.db_max_lifetime)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect(&url)
                .await
                .map_err(|e| Error::database("connect to database", e))?,
        ),
        DbDriver::MySql => Database::MySql(
            MySqlPoolOptions::new()
                .max_connections(max)
                .min_connections(min)
                .max_lifetime(config.db_max_lifetime)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect(&url)
                .await
                .map_err(|e| Error::database("connect to database", e))?,
        ),
    };

    database.ping().await?;
    tracing::info!(
        driver = %config.db_driver,
        host = %config.db_host,
        port = %config.db_port,
        database = %config.db_name,
        "database connected"
    );
    Ok(database)
}

impl Database {
    /// Pool that only dials on first use.
    pub fn connect_lazy(config: &Config) -> Result<Self> {
        let url = config.database_url();
        let database = match config.db_driver {
            DbDriver::Postgres => Database::Postgres(
                PgPoolOptions::new()
                    .max_connections(config.db_max_open.max(1))
                    .acquire_timeout(PING_TIMEOUT)
                    .connect_lazy(&url)
                    .map_err(|e| Error::database("configure database pool", e))?,
            ),
            DbDriver::MySql => Database::MySql(
                MySqlPoolOptions::new()
                    .max_connections(config.db_max_open.max(1))
                    .acquire_timeout(PING_TIMEOUT)
                    .connect_lazy(&url)
                    .map_err(|e| Error::database("configure database pool", e))?,
            ),
        };
        Ok(database)
    }

    pub fn driver(&self) -> DbDriver {
        match self {
            Database::Postgres(_) => DbDriver::Postgres,
            Database::MySql(_) => DbDriver::MySql,
        }
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        match self {
            Database::Postgres(pool) => Arc::new(PgUserRepository::new(pool.clone())),
            Database::MySql(pool) => Arc::new(MySqlUserRepository::new(pool.clone())),
        }
    }

    /// Round-trips to the server, giving up after one second.
    pub async fn ping(&self) -> Result<()> {
        match tokio::time::timeout(PING_TIMEOUT, self.ping_once()).await {
            Ok(result) => result.map_err(|e| Error::database("ping database", e)),
            Err(_) => Err(Error::Internal("database ping timed out".to_string())),
        }
    }

    async fn ping_once(&self) -> std::result::Result<(), sqlx::Error> {
        match self {
            Database::Postgres(pool) => pool.acquire().await?.ping().await,
            Database::MySql(pool) => pool.acquire().await?.ping().await,
        }
    }

    pub async fn migrate(&self) -> Result<()> {
        let outcome = match self {
            Database::Postgres(pool) => sqlx::migrate!("./migrations/postgres").run(pool).await,
            Database::MySql(pool) => sqlx::migrate!("./migrations/mysql").run(pool).await,
        };
        outcome.map_err(|e| Error::Internal(format!("migration failed: {}", e)))
    }

    pub async fn close(&self) {
        match self {
            Database::Postgres(pool) => pool.close().await,
            Database::MySql(pool) => pool.close().await,
        }
    }
}
