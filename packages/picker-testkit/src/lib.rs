mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	future::IntoFuture,
	sync::{Arc, Mutex},
};

use axum::{
	Json, Router,
	body::Bytes,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing,
};
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use picker_config::{Config, EmbeddingProviderConfig, Providers, Store};

pub const STORE_PATH: &str = "/api/v1";
pub const EMBED_PATH: &str = "/api/embed";

/// What the stub store answers to one query.
#[derive(Debug, Clone)]
pub enum StubReply {
	Json(Value),
	Status(u16),
}

type Responder = Box<dyn Fn(&Value) -> StubReply + Send + Sync>;

struct StubState {
	responder: Responder,
	queries: Mutex<Vec<Value>>,
	documents: Mutex<HashMap<String, Value>>,
	embedding: Mutex<Option<Vec<f32>>>,
	embed_requests: Mutex<Vec<Value>>,
}

/// In-process document store and embedding service bound to an ephemeral localhost port.
///
/// Every query body is recorded in arrival order; the responder decides the reply.
pub struct StubServer {
	base_url: String,
	state: Arc<StubState>,
	shutdown: Option<Sender<()>>,
}
impl StubServer {
	pub async fn start<F>(responder: F) -> Result<Self>
	where
		F: Fn(&Value) -> StubReply + Send + Sync + 'static,
	{
		let state = Arc::new(StubState {
			responder: Box::new(responder),
			queries: Mutex::new(Vec::new()),
			documents: Mutex::new(HashMap::new()),
			embedding: Mutex::new(None),
			embed_requests: Mutex::new(Vec::new()),
		});
		let app = Router::new()
			.route("/api/v1/tables/{table}/query", routing::post(query_handler))
			.route("/api/v1/tables/{table}/lookup/{key}", routing::get(lookup_handler))
			.route(EMBED_PATH, routing::post(embed_handler))
			.with_state(state.clone());
		let listener = TcpListener::bind("127.0.0.1:0")
			.await
			.map_err(|err| Error::Message(format!("Failed to bind stub server: {err}.")))?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { base_url: format!("http://{addr}"), state, shutdown: Some(tx) })
	}

	/// Stub whose every query gets the same JSON body.
	pub async fn fixed(body: Value) -> Result<Self> {
		Self::start(move |_| StubReply::Json(body.clone())).await
	}

	pub fn store_api_base(&self) -> String {
		format!("{}{STORE_PATH}", self.base_url)
	}

	pub fn embed_api_base(&self) -> String {
		self.base_url.clone()
	}

	pub fn insert_document(&self, key: &str, document: Value) {
		lock(&self.state.documents).insert(key.to_string(), document);
	}

	pub fn set_embedding(&self, vector: Vec<f32>) {
		*lock(&self.state.embedding) = Some(vector);
	}

	pub fn queries(&self) -> Vec<Value> {
		lock(&self.state.queries).clone()
	}

	pub fn embed_requests(&self) -> Vec<Value> {
		lock(&self.state.embed_requests).clone()
	}

	pub fn config(&self) -> Config {
		test_config(&self.store_api_base(), &self.embed_api_base())
	}
}
impl Drop for StubServer {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

/// Store response with a single result set.
pub fn hits_response(hits: Vec<Value>, total: u64) -> Value {
	serde_json::json!({
		"responses": [
			{ "hits": { "hits": hits, "total": total } }
		]
	})
}

/// Hit in the underscore dialect: `_id`, `_score`, `_source`.
pub fn hit(id: &str, score: f64, source: Value) -> Value {
	serde_json::json!({ "_id": id, "_score": score, "_source": source })
}

/// Little-endian embedding envelope holding `vectors`, which must share one dimension.
pub fn envelope(vectors: &[Vec<f32>]) -> Vec<u8> {
	let dimension = vectors.first().map(Vec::len).unwrap_or(0);
	let mut out = Vec::with_capacity(16 + vectors.len() * dimension * 4);

	out.extend_from_slice(&(vectors.len() as u64).to_le_bytes());
	out.extend_from_slice(&(dimension as u64).to_le_bytes());

	for value in vectors.iter().flatten() {
		out.extend_from_slice(&value.to_le_bytes());
	}

	out
}

pub fn test_config(store_api_base: &str, embed_api_base: &str) -> Config {
	Config {
		store: Store {
			api_base: store_api_base.to_string(),
			table: "tgif_gifs".to_string(),
			api_key: None,
			timeout_ms: 5_000,
			default_headers: Map::new(),
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				api_base: embed_api_base.to_string(),
				path: EMBED_PATH.to_string(),
				model: "openai/clip-vit-base-patch32".to_string(),
				dimensions: 0,
				timeout_ms: 5_000,
				api_key: None,
				default_headers: Map::new(),
			},
		},
		search: Default::default(),
		sampler: Default::default(),
		safety: Default::default(),
		aggregation: Default::default(),
	}
}

async fn query_handler(
	State(state): State<Arc<StubState>>,
	Path(_table): Path<String>,
	Json(payload): Json<Value>,
) -> Response {
	let reply = (state.responder)(&payload);

	lock(&state.queries).push(payload);

	match reply {
		StubReply::Json(body) => (StatusCode::OK, Json(body)).into_response(),
		StubReply::Status(code) =>
			StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR).into_response(),
	}
}

async fn lookup_handler(
	State(state): State<Arc<StubState>>,
	Path((_table, key)): Path<(String, String)>,
) -> Response {
	match lock(&state.documents).get(&key) {
		Some(document) => (StatusCode::OK, Json(document.clone())).into_response(),
		None => StatusCode::NOT_FOUND.into_response(),
	}
}

async fn embed_handler(
	State(state): State<Arc<StubState>>,
	Json(payload): Json<Value>,
) -> Response {
	lock(&state.embed_requests).push(payload);

	let Some(vector) = lock(&state.embedding).clone() else {
		return StatusCode::SERVICE_UNAVAILABLE.into_response();
	};

	(StatusCode::OK, Bytes::from(envelope(&[vector]))).into_response()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
