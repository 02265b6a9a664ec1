//! Test server lifecycle management
//!
//! Each test gets an isolated user service with its own database and its own
//! fake song, playlist and artist services.

use super::constants::*;
use super::downstream::FakeService;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use user_service::downstream::{DownstreamService, HttpDownstreamClient};
use user_service::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use user_service::user::{DownstreamClients, SqliteUserStore, UserService, UserStore};

/// Test server instance with an isolated database and fake downstream services
///
/// When dropped, the server shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// User store for direct database access in tests
    pub user_store: Arc<dyn UserStore>,

    pub songs: FakeService,
    pub playlists: FakeService,
    pub artists: FakeService,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn client_for(service: DownstreamService, fake: &FakeService) -> Arc<HttpDownstreamClient> {
    Arc::new(
        HttpDownstreamClient::new(service, fake.base_url.clone(), DOWNSTREAM_TIMEOUT_SECS)
            .expect("Failed to build downstream client"),
    )
}

impl TestServer {
    /// Spawns a new test server on a random port
    pub async fn spawn() -> Self {
        let songs = FakeService::spawn().await;
        let playlists = FakeService::spawn().await;
        let artists = FakeService::spawn().await;

        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let user_store: Arc<dyn UserStore> = Arc::new(
            SqliteUserStore::new(temp_db_dir.path().join("users.db"))
                .expect("Failed to open user store"),
        );

        let user_service = UserService::new(
            user_store.clone(),
            DownstreamClients {
                songs: client_for(DownstreamService::Song, &songs),
                playlists: client_for(DownstreamService::Playlist, &playlists),
                artists: client_for(DownstreamService::Artist, &artists),
            },
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, Arc::new(user_service));

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            user_store,
            songs,
            playlists,
            artists,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling `GET /`
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
