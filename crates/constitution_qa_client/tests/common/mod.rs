//! In-process query API used by the integration tests. Real HTTP over loopback, no mocks.
//!
//! Every request body is recorded. Questions starting with "slow" are answered
//! after a delay so tests can overlap or cancel requests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::Router;

pub const SLOW_DELAY: Duration = Duration::from_millis(400);

#[derive(Clone)]
struct Shared {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

pub struct TestServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl TestServer {
    pub fn recorded(&self) -> Vec<serde_json::Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle_query(
    State(shared): State<Shared>,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let value: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    let slow = value["questions"][0]
        .as_str()
        .is_some_and(|q| q.starts_with("slow"));
    shared.requests.lock().unwrap().push(value);
    if slow {
        tokio::time::sleep(SLOW_DELAY).await;
    }
    (
        shared.status,
        [(header::CONTENT_TYPE, "application/json")],
        shared.body.clone(),
    )
}

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/api/v1/query", post(handle_query))
        .with_state(shared)
}

fn shared(status: u16, body: &str) -> Shared {
    Shared {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        requests: Arc::new(Mutex::new(Vec::new())),
    }
}

/// Serve on the current runtime. Use from `#[tokio::test]`.
pub async fn spawn_server(status: u16, body: &str) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let shared = shared(status, body);
    let requests = shared.requests.clone();
    tokio::spawn(async move {
        axum::serve(listener, router(shared)).await.unwrap();
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// Serve on a background thread with its own runtime. Use from plain `#[test]`.
pub fn spawn_server_thread(status: u16, body: &str) -> TestServer {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let port = std_listener.local_addr().unwrap().port();
    let shared = shared(status, body);
    let requests = shared.requests.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, router(shared)).await.unwrap();
        });
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// Base URL where nothing is listening.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
