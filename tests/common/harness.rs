//! In-process HTTP servers standing in for external services.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// A running fake embeddings service.
pub struct EmbeddingsServer {
    base_url: String,
    requests: Arc<AtomicUsize>,
}

impl EmbeddingsServer {
    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct ServiceState {
    vectors: Arc<HashMap<String, Vec<f32>>>,
    dim: usize,
    requests: Arc<AtomicUsize>,
}

async fn embeddings(State(state): State<ServiceState>, Json(body): Json<Value>) -> Json<Value> {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let input = body["input"].as_str().unwrap_or_default();
    let embedding = state.vectors.get(input).cloned().unwrap_or_else(|| {
        let mut v = vec![0.0f32; state.dim];
        v[state.dim - 1] = 1.0;
        v
    });

    Json(json!({ "object": "list", "data": [{ "embedding": embedding, "index": 0 }] }))
}

/// Serves `POST /v1/embeddings` from a table keyed by the exact input string.
pub async fn spawn_embeddings_server(
    dim: usize,
    vectors: impl IntoIterator<Item = (&'static str, Vec<f32>)>,
) -> EmbeddingsServer {
    let requests = Arc::new(AtomicUsize::new(0));
    let state = ServiceState {
        vectors: Arc::new(
            vectors
                .into_iter()
                .map(|(text, v)| (text.to_string(), v))
                .collect(),
        ),
        dim,
        requests: Arc::clone(&requests),
    };

    let app = Router::new()
        .route("/v1/embeddings", post(embeddings))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    EmbeddingsServer {
        base_url: format!("http://{}", addr),
        requests,
    }
}

/// A server that answers every embeddings request with HTTP 503.
pub async fn spawn_unavailable_server() -> String {
    let app = Router::new().route(
        "/v1/embeddings",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    format!("http://{}", addr)
}
