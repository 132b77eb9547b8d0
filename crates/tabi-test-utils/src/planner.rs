use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: Arc<String>,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn agent(State(state): State<FakeState>, Json(request): Json<Value>) -> impl IntoResponse {
    state.requests.lock().push(request);
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.as_str().to_owned(),
    )
}

/// A running fake planner. The server stops when this is dropped.
pub struct FakePlanner {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
    handle: JoinHandle<()>,
}

impl FakePlanner {
    /// Base URL to hand to the planner client (no `/agent` suffix).
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request body received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }
}

impl Drop for FakePlanner {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `POST /agent` on a random local port, answering every request with
/// `status` and `body`.
pub async fn spawn_fake_planner(status: u16, body: impl Into<String>) -> FakePlanner {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        status: StatusCode::from_u16(status).expect("invalid status code"),
        body: Arc::new(body.into()),
        requests: Arc::clone(&requests),
    };
    let app = Router::new().route("/agent", post(agent)).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake planner");
    let addr = listener.local_addr().expect("fake planner has no address");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    FakePlanner {
        addr,
        requests,
        handle,
    }
}
