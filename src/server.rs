use crate::language::{Catalog, CatalogError, FilterQuery, WordEntry};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
pub struct WordsParams {
    pub chars: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordsResponse {
    pub words: Vec<WordEntry>,
}

/// Where the router gets its catalog from on each request.
pub type CatalogLoader = fn() -> Result<&'static Catalog, CatalogError>;

/// Answer a `/words` query against `catalog`.
pub fn words_for(catalog: &Catalog, chars: Option<&str>) -> WordsResponse {
    let query = FilterQuery::from_param(chars);
    WordsResponse {
        words: catalog.filter(query.pool()),
    }
}

#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        ServerError::Io(value)
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub async fn serve(addr: SocketAddr) -> Result<(), ServerError> {
    info!(%addr, "Binding HTTP listener");
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_listener<F>(listener: TcpListener, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "word service listening");
    }
    axum::serve(listener, build_router())
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server exited");
    Ok(())
}

pub fn build_router() -> Router {
    build_router_with(Catalog::builtin)
}

pub fn build_router_with(load: CatalogLoader) -> Router {
    Router::new()
        .route("/words", get(api_words))
        .route("/api/words", get(api_words))
        .route("/healthz", get(health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .with_state(load)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "kanatap" }))
}

async fn api_words(
    State(load): State<CatalogLoader>,
    Query(params): Query<WordsParams>,
) -> Result<Json<WordsResponse>, ApiError> {
    let catalog = load().map_err(|err| {
        error!(%err, "Failed to fetch words");
        ApiError::internal("Failed to fetch words")
    })?;
    let response = words_for(catalog, params.chars.as_deref());
    debug!(
        chars = ?params.chars,
        matched = response.words.len(),
        "served word list"
    );
    Ok(Json(response))
}
