use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricewar::config::Config;
use pricewar::db::{AppState, create_pool, init_db};
use pricewar::handlers;
use pricewar::seed::seed_default_categories;
use pricewar::store::MemoryStore;

#[derive(Parser, Debug)]
#[command(name = "pricewar")]
#[command(about = "Storefront backend with hosted checkout")]
struct Cli {
    /// Seed the default categories when the catalogue is empty (dev mode only)
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricewar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db = match &config.database {
        Some(database) => {
            let path = database.path();
            let path = path.to_string_lossy();
            let pool = create_pool(&path).expect("Failed to create database pool");
            {
                let conn = pool.get().expect("Failed to get connection");
                init_db(&conn).expect("Failed to initialize database");
            }
            tracing::info!("Using SQLite database at {}", path);
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store (data is lost on exit)");
            None
        }
    };

    if config.stripe.secret_key.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set, checkout is disabled");
    }
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, admin API is disabled");
    }

    let state = AppState {
        db,
        memory: Arc::new(MemoryStore::new()),
        base_url: config.base_url.clone(),
        stripe: config.stripe.clone(),
        admin_token: config.admin_token.clone(),
        http_client: reqwest::Client::new(),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set PRICEWAR_ENV=dev)");
        } else if let Err(e) = seed_default_categories(&state.backend()) {
            tracing::error!("Failed to seed categories: {}", e);
        }
    }

    let app = handlers::router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Pricewar server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
