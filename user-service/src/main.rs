use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use user_service::config::{self, AppConfig, FileConfig};
use user_service::downstream::{DownstreamService, HttpDownstreamClient};
use user_service::server::{self, run_server, RequestsLoggingLevel, ServerConfig};
use user_service::user::{DownstreamClients, SqliteUserStore, UserService};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database file to use for user storage.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the song service.
    #[clap(long)]
    pub song_service_url: Option<String>,

    /// Base URL of the playlist service.
    #[clap(long)]
    pub playlist_service_url: Option<String>,

    /// Base URL of the artist service.
    #[clap(long)]
    pub artist_service_url: Option<String>,

    /// Timeout in seconds for requests to the song, playlist and artist services.
    #[clap(long, default_value_t = 30)]
    pub downstream_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            song_service_url: args.song_service_url.clone(),
            playlist_service_url: args.playlist_service_url.clone(),
            artist_service_url: args.artist_service_url.clone(),
            downstream_timeout_sec: args.downstream_timeout_sec,
        }
    }
}

fn make_client(
    service: DownstreamService,
    base_url: &str,
    timeout_sec: u64,
) -> Result<Arc<HttpDownstreamClient>> {
    info!("{} configured at {}", service, base_url);
    Ok(Arc::new(HttpDownstreamClient::new(
        service,
        base_url.to_string(),
        timeout_sec,
    )?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&(&cli_args).into(), file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!("Opening user database at {:?}...", app_config.db_path);
    let user_store = Arc::new(SqliteUserStore::new(&app_config.db_path)?);

    let downstream = &app_config.downstream;
    let downstreams = DownstreamClients {
        songs: make_client(
            DownstreamService::Song,
            &downstream.song_service_url,
            downstream.timeout_sec,
        )?,
        playlists: make_client(
            DownstreamService::Playlist,
            &downstream.playlist_service_url,
            downstream.timeout_sec,
        )?,
        artists: make_client(
            DownstreamService::Artist,
            &downstream.artist_service_url,
            downstream.timeout_sec,
        )?,
    };
    let user_service = Arc::new(UserService::new(user_store, downstreams));

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
    };

    tokio::select! {
        result = run_server(server_config, user_service) => {
            info!("HTTP server stopped: {:?}", result);
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            Ok(())
        }
    }
}
