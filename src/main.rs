// src/main.rs

use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sherlock::api::api_router;
use sherlock::config::SherlockConfig;
use sherlock::db::run_migrations;
use sherlock::shopify::client::ShopifyClient;
use sherlock::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "sherlock", version, about = "Shopify store diagnostics service")]
struct Args {
    /// Bind host, overriding SHERLOCK_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding SHERLOCK_PORT
    #[arg(long)]
    port: Option<u16>,

    /// SQLite URL, overriding DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = SherlockConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from_str(&config.log_level).unwrap_or(Level::INFO))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Sherlock v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.sqlite_max_connections)
        .connect(&config.database_url)
        .await?;
    run_migrations(&pool).await?;

    let shopify = Arc::new(ShopifyClient::new(&config)?);
    let app_state = Arc::new(AppState::new(config.clone(), pool, shopify));

    let app = api_router(app_state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{bind_address}");

    axum::serve(listener, app).await?;
    Ok(())
}
