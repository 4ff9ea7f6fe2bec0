use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use users_backend::{
    app::build_router, config::Config, database::pool::create_pool, logging::init_tracing,
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "users-backend", version, about = "User management REST API")]
struct Cli {
    /// Ping the database, print the outcome and exit.
    #[arg(long)]
    health_check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config)?;

    if cli.health_check {
        return health_check(&config).await;
    }

    info!(
        env = %config.env,
        driver = %config.db_driver,
        port = config.port,
        "starting users-backend"
    );

    let db = create_pool(&config).await?;
    db.migrate().await?;
    info!("migrations applied");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(db.clone(), config)?;
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("server stopped");
    Ok(())
}

async fn health_check(config: &Config) -> anyhow::Result<()> {
    let outcome = match create_pool(config).await {
        Ok(db) => {
            let ping = db.ping().await;
            db.close().await;
            ping
        }
        Err(err) => Err(err),
    };
    match outcome {
        Ok(()) => {
            println!("database: ok");
            Ok(())
        }
        Err(err) => {
            println!("database: fail ({})", err);
            std::process::exit(1);
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
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
    info!("shutdown signal received");
}
