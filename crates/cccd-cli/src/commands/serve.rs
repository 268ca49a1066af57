//! HTTP server exposing the document pipeline.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use clap::Args;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn};

use cccd_core::models::config::ServerConfig;
use cccd_core::{create_pipeline_from_config, BoxedPipeline, ImageInput};

use super::load_config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (default: from config)
    #[arg(long)]
    host: Option<String>,

    /// Port (default: from config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    pipeline: Arc<BoxedPipeline>,
}

type Reply = (StatusCode, Json<Value>);

/// Header carrying the per-request id, set on both request and response.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Issues a v4 UUID for requests that arrive without an id.
#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

fn header_request_id(headers: &HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path, args.model_dir.as_deref())?;

    info!("Loading models from {}", config.models.model_dir.display());
    let pipeline = create_pipeline_from_config(&config).with_context(|| {
        format!(
            "Failed to load OCR models from {}",
            config.models.model_dir.display()
        )
    })?;
    if !pipeline.has_detector() {
        warn!("Serving without a region detector; every image is recognized in full");
    }

    let app = router(Arc::new(pipeline), &config.server);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid address: {}:{}", host, port))?;

    info!("Server listening on http://{}", addr);
    info!("  GET  /             - Service info");
    info!("  GET  /health       - Health check");
    info!("  POST /api/process  - Process a card image (multipart field `file`)");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Routes and middleware around a shared pipeline.
///
/// Every request gets an `x-request-id` (kept when the client sends one),
/// recorded on the trace span and echoed on the response.
fn router(pipeline: Arc<BoxedPipeline>, server: &ServerConfig) -> Router {
    let state = Arc::new(AppState { pipeline });
    let header = axum::http::HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/process", post(process_handler))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.cors_origins))
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %header_request_id(request.headers()),
            )
        }))
        .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
        .with_state(state)
}

/// CORS layer for the configured origins; `*` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

fn is_image_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
}

fn rejection(status: StatusCode, message: impl Into<String>) -> Reply {
    (status, Json(json!({ "success": false, "message": message.into() })))
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "cccd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Process an uploaded card image.
async fn process_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    let request_id = header_request_id(&headers).to_string();

    let bytes = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                warn!(request_id = %request_id, "Upload without a file field");
                return rejection(StatusCode::BAD_REQUEST, "missing multipart field `file`");
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Malformed multipart body");
                return rejection(StatusCode::BAD_REQUEST, format!("malformed upload: {}", e));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if !is_image_content_type(content_type.as_deref()) {
            warn!(request_id = %request_id, content_type = ?content_type, "Rejected non-image upload");
            return rejection(StatusCode::BAD_REQUEST, "File must be an image");
        }

        match field.bytes().await {
            Ok(bytes) => break bytes,
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Failed to read upload");
                return rejection(StatusCode::BAD_REQUEST, format!("failed to read upload: {}", e));
            }
        }
    };

    info!(request_id = %request_id, bytes = bytes.len(), "Processing upload");

    let pipeline = Arc::clone(&state.pipeline);
    let input = ImageInput::Bytes(bytes.to_vec());
    let result = match tokio::task::spawn_blocking(move || pipeline.process(input)).await {
        Ok(result) => result,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Processing task failed");
            return rejection(StatusCode::INTERNAL_SERVER_ERROR, "processing task failed");
        }
    };

    info!(
        request_id = %request_id,
        success = result.success,
        fields = result.record.populated_fields().len(),
        processing_ms = result.processing_time_ms,
        "Request completed"
    );

    (StatusCode::OK, Json(result.to_wire()))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
