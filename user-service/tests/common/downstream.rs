//! Fake song, playlist and artist services
//!
//! Each fake is a real axum server on a random port. It answers every request
//! with a scripted reply and records the method and raw path it received.

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

struct FakeReply {
    status: StatusCode,
    content_type: String,
    body: String,
}

struct FakeServiceState {
    reply: FakeReply,
    calls: Vec<(String, String)>,
}

const JSON: &str = "application/json";

type SharedFakeState = Arc<Mutex<FakeServiceState>>;

async fn answer(State(state): State<SharedFakeState>, method: Method, uri: Uri) -> Response {
    let mut state = state.lock().unwrap();
    state
        .calls
        .push((method.to_string(), uri.path().to_string()));
    let reply = &state.reply;
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type.clone())],
        reply.body.clone(),
    )
        .into_response()
}

pub struct FakeService {
    pub base_url: String,
    state: SharedFakeState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    server_task: Option<tokio::task::JoinHandle<()>>,
}

impl FakeService {
    /// Spawns a fake answering `200 []` until told otherwise.
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(FakeServiceState {
            reply: FakeReply {
                status: StatusCode::OK,
                content_type: JSON.to_string(),
                body: "[]".to_string(),
            },
            calls: vec![],
        }));
        let app = Router::new().fallback(answer).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let port = listener.local_addr().unwrap().port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let server_task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake service failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            shutdown_tx: Some(shutdown_tx),
            server_task: Some(server_task),
        }
    }

    /// Replies with `body` as JSON.
    pub fn reply_with(&self, status: StatusCode, body: &str) {
        self.reply_with_content_type(status, JSON, body);
    }

    pub fn reply_with_content_type(&self, status: StatusCode, content_type: &str, body: &str) {
        self.state.lock().unwrap().reply = FakeReply {
            status,
            content_type: content_type.to_string(),
            body: body.to_string(),
        };
    }

    /// Requests received so far, as `(method, raw path)`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Stops the fake so that requests to it fail to connect.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.server_task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
