//! Connection pool lifecycle and schema migrations.

use crate::config::{AppConfig, DatabaseSettings};
use crate::errors::ServiceError;
use crate::migrator::Migrator;
use metrics::{counter, gauge, histogram};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Instant;
use tracing::{debug, error, info};

pub type DbPool = DatabaseConnection;

const METRICS_PREFIX: &str = "catalog_db";

fn metric(name: &str) -> String {
    format!("{METRICS_PREFIX}.{name}")
}

fn connect_options(settings: &DatabaseSettings, log_statements: bool) -> ConnectOptions {
    let mut opt = ConnectOptions::new(settings.url.clone());
    opt.max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .connect_timeout(settings.connect_timeout())
        .acquire_timeout(settings.acquire_timeout())
        .idle_timeout(settings.idle_timeout())
        .sqlx_logging(log_statements);
    opt
}

/// Opens the pool described by `cfg.database`. SQL statements are logged in development.
pub async fn connect(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    connect_with(&cfg.database, cfg.is_development()).await
}

pub async fn connect_with(
    settings: &DatabaseSettings,
    log_statements: bool,
) -> Result<DbPool, ServiceError> {
    debug!(
        max = settings.max_connections,
        min = settings.min_connections,
        "opening database pool"
    );
    gauge!(metric("pool.max_connections"), f64::from(settings.max_connections));

    let pool = Database::connect(connect_options(settings, log_statements))
        .await
        .map_err(|e| {
            counter!(metric("connect.failures"), 1);
            error!(error = %e, "could not open database pool");
            ServiceError::DatabaseError(e)
        })?;

    info!(backend = ?pool.get_database_backend(), "database pool ready");
    Ok(pool)
}

/// Applies every pending migration; already applied ones are skipped
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    let started = Instant::now();
    let pending = Migrator::get_pending_migrations(pool)
        .await
        .map(|m| m.len())
        .unwrap_or_default();

    let outcome = Migrator::up(pool, None).await;
    histogram!(metric("migrations.duration"), started.elapsed());

    match outcome {
        Ok(()) => {
            info!(applied = pending, elapsed = ?started.elapsed(), "schema up to date");
            Ok(())
        }
        Err(e) => {
            counter!(metric("migrations.failures"), 1);
            error!(error = %e, "migration failed");
            Err(ServiceError::MigrationError(e.to_string()))
        }
    }
}

/// Round-trips a ping to the database
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    let started = Instant::now();
    match pool.ping().await {
        Ok(()) => {
            gauge!(metric("ping.latency_ms"), started.elapsed().as_secs_f64() * 1000.0);
            Ok(())
        }
        Err(e) => {
            counter!(metric("ping.failures"), 1);
            error!(error = %e, "database ping failed");
            Err(ServiceError::DatabaseError(e))
        }
    }
}

pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("closing database pool");
    pool.close().await.map_err(ServiceError::DatabaseError)
}
