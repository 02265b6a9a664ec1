mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub song_service_url: Option<String>,
    pub playlist_service_url: Option<String>,
    pub artist_service_url: Option<String>,
    pub downstream_timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub downstream: DownstreamSettings,
}

/// Where the song, playlist and artist services live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamSettings {
    pub song_service_url: String,
    pub playlist_service_url: String,
    pub artist_service_url: String,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow!("db_path must be specified via --db-path or in config file"))?;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ, both are {}", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let downstream = DownstreamSettings {
            song_service_url: resolve_base_url(
                "song_service_url",
                "--song-service-url",
                file.song_service_url,
                &cli.song_service_url,
            )?,
            playlist_service_url: resolve_base_url(
                "playlist_service_url",
                "--playlist-service-url",
                file.playlist_service_url,
                &cli.playlist_service_url,
            )?,
            artist_service_url: resolve_base_url(
                "artist_service_url",
                "--artist-service-url",
                file.artist_service_url,
                &cli.artist_service_url,
            )?,
            timeout_sec: file
                .downstream_timeout_sec
                .unwrap_or(cli.downstream_timeout_sec),
        };
        if downstream.timeout_sec == 0 {
            bail!("downstream_timeout_sec must be greater than 0");
        }

        Ok(Self {
            db_path,
            port,
            metrics_port,
            logging_level,
            downstream,
        })
    }
}

fn resolve_base_url(
    name: &str,
    flag: &str,
    from_file: Option<String>,
    from_cli: &Option<String>,
) -> Result<String> {
    let url = from_file
        .or_else(|| from_cli.clone())
        .ok_or_else(|| anyhow!("{} must be specified via {} or in config file", name, flag))?;
    let url = url.trim().trim_end_matches('/').to_string();
    if url.is_empty() {
        bail!("{} must not be empty", name);
    }
    Ok(url)
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
