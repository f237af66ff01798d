use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use helpdesk_api::config::{self, AppConfig};
use helpdesk_api::database::DatabaseManager;
use helpdesk_api::is_production;
use helpdesk_api::state::AppState;
use helpdesk_api::uploads::UploadStore;

const DEFAULT_LOG_FILTER: &str = "helpdesk_api=info,tower_http=info";

#[derive(Parser)]
#[command(name = "helpdesk-api")]
#[command(about = "Helpdesk ticketing REST API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Listen port; overrides APP_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, UPLOAD_DIR, etc.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = config::config();
    info!(environment = ?config.environment, "starting {}", config.app.name);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(config, port).await,
        Command::Migrate => migrate(config).await,
    }
}

async fn serve(config: &AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    UploadStore::new(config.uploads.dir.clone())
        .ensure_dirs()
        .await
        .context("failed to create upload directories")?;

    let pool = DatabaseManager::connect_lazy(&config.database).context("failed to configure database pool")?;
    let app = helpdesk_api::app(AppState::new(pool, config), config);

    let port = port.unwrap_or(config.app.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    if is_production!() {
        info!(addr = %bind_addr, "listening");
    } else {
        info!(addr = %bind_addr, uploads = %config.uploads.dir.display(), "listening on http://{}", bind_addr);
    }

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect_lazy(&config.database).context("failed to configure database pool")?;
    DatabaseManager::migrate(&pool).await.context("migration failed")?;
    pool.close().await;
    Ok(())
}
