//! emb-daemon entry point.
//!
//! Sets up tracing, loads config, opens the pool, wires middleware, and
//! starts the HTTP server. Route handlers live in `routes/`; shared state
//! lives in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use clap::Parser;
use emb_daemon::{routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

const ENV_DAEMON_ADDR: &str = "EMB_DAEMON_ADDR";

#[derive(Parser, Debug)]
#[command(name = "emb-daemon")]
#[command(about = "Embroidery shop management HTTP service", long_about = None)]
struct Args {
    /// Config YAML layers, merged in order (later overrides earlier).
    #[arg(long = "config")]
    config: Vec<String>,

    /// Listen address; overrides EMB_DAEMON_ADDR and server.addr.
    #[arg(long)]
    addr: Option<String>,

    /// Apply pending migrations before serving.
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let args = Args::parse();

    let paths: Vec<&str> = args.config.iter().map(|s| s.as_str()).collect();
    let loaded = emb_config::load_layered_yaml(&paths)?;
    for key in loaded.unused_keys() {
        warn!(key = %key, "config key is not read by emb-daemon");
    }
    let cfg = loaded.app;
    info!(config_hash = %loaded.config_hash, "config loaded");

    let url = cfg.database.resolve_url()?;
    let pool = emb_db::connect(&url, cfg.database.max_connections).await?;
    if args.migrate {
        emb_db::migrate(&pool).await?;
        info!("migrations applied");
    }

    let shared = Arc::new(state::AppState::new(pool, cfg.jobs.insert_timeout()));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let env_addr = std::env::var(ENV_DAEMON_ADDR).ok();
    let addr: SocketAddr = cfg
        .effective_addr(env_addr.as_deref(), args.addr.as_deref())
        .parse()
        .context("invalid listen address")?;
    info!("emb-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
