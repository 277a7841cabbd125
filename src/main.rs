use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

use product_catalog as catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = catalog::config::load_config().context("failed to load configuration")?;
    catalog::config::init_tracing(&cfg.logging);

    let db_pool = catalog::db::connect(&cfg)
        .await
        .context("failed to connect to the database")?;
    if cfg.database.auto_migrate {
        catalog::db::run_migrations(&db_pool)
            .await
            .context("failed to migrate the database")?;
    } else {
        info!("auto_migrate disabled; expecting an up-to-date schema");
    }

    let db_arc = Arc::new(db_pool);
    let app_state = catalog::AppState::new(db_arc.clone(), cfg.clone());
    let app = catalog::app_router(app_state);

    let ip = cfg
        .server
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid host address '{}'", cfg.server.host))?;
    let addr = SocketAddr::new(ip, cfg.server.port);
    info!("product-catalog listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(db_arc) {
        Ok(pool) => catalog::db::close_pool(pool).await?,
        Err(_) => warn!("Database pool still shared at shutdown; skipping explicit close"),
    }

    info!("product-catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
