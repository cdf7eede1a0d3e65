//! Kredo API server binary.
//!
//! Uses Postgres when a database URL is given, in-memory stores otherwise.

use std::net::SocketAddr;

use clap::Parser;
use kredo_api::config::ApiConfig;
use kredo_api::{AppState, Backends};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

const CRM_METRICS_PERIOD_SECS: u64 = 60;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "kredo_api_server", about = "Kredo loan application API server")]
struct Args {
    /// Address to listen on. Overrides `BIND_ADDR`.
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL. Without it all state lives in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kredo_api=debug,kredo_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.database_url.is_some() {
        config.database_url = args.database_url;
    }

    let backends = match &config.database_url {
        Some(url) => {
            info!(max_connections = args.max_connections, "connecting to postgres");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            kredo_api::migrate(&pool).await?;
            Backends::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory stores");
            Backends::in_memory()
        }
    };

    info!(
        version = kredo_core::version(),
        otp_ttl_seconds = config.core.otp.ttl_seconds,
        rate_limit = config.core.rate_limit.capacity,
        "starting kredo_api_server"
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, backends)?;
    let crm = state.applications.crm_dispatcher().clone();
    let reporter = crm.spawn_reporter(std::time::Duration::from_secs(CRM_METRICS_PERIOD_SECS));
    let app = kredo_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    // Peer addresses feed the rate limiter when no X-Forwarded-For is present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await?;

    reporter.abort();
    crm.report();
    Ok(())
}
