use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, MatchedPath, Request};
use axum::middleware::{self, Next, from_fn};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::api::handler::{analytics, detection, disposals, profiles, voice};
use crate::api::middleware::cors;
use crate::api::middleware::verify_token::{AuthErr, JwtVerifier, TokenVerifier, require_bearer};
use crate::db::prelude::*;
use crate::util::env::Env;
use crate::util::speech::SpeechClient;
use crate::util::vision::VisionClient;

pub type JsonResult<T> = core::result::Result<Json<T>, RouteError>;

/// Request body extractor that rejects with a `{"detail"}` body like every other handler error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(RouteError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RouteError))]
pub struct QueryParams<T>(pub T);

#[derive(Debug)]
pub struct AppState {
    pub db_pool: &'static PgPool,
    pub env: &'static Env,
    pub verifier: Arc<dyn TokenVerifier>,
    pub vision: VisionClient,
    pub speech: SpeechClient,
}

impl AppState {
    pub fn new(db_pool: &'static PgPool, env: &'static Env) -> Self {
        Self {
            db_pool,
            env,
            verifier: Arc::new(JwtVerifier::new(&env.jwt_secret)),
            vision: VisionClient::from_env(env),
            speech: SpeechClient::from_env(env),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        //
        // profile and points
        .route("/profiles/me", get(profiles::get_or_create_profile))
        .route("/profiles/ensure", post(profiles::get_or_create_profile))
        .route("/profiles/points/add", post(profiles::add_points))
        //
        // disposal events
        .route("/disposals/", post(disposals::create_disposal))
        .route("/disposals/recent", get(disposals::recent_disposals))
        //
        // image classification
        .route("/waste/detect", post(detection::detect_waste))
        .route("/waste/history", get(detection::detection_history))
        //
        // dashboard and ranking
        .route("/analytics/dashboard", get(analytics::dashboard))
        .route(
            "/analytics/environmental-impact",
            get(analytics::environmental_impact),
        )
        .route("/analytics/leaderboard", get(analytics::leaderboard))
        //
        // voice assistant
        .route("/voice/chat", post(voice::chat))
        .route("/voice/history", get(voice::history))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method();
                let uri = req.uri();

                let matched_path = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|matched| matched.as_str());

                tracing::debug_span!("api_request", ?method, ?uri, ?matched_path)
            }),
        )
        .layer(from_fn(log_route_errors))
        .layer(cors(state.env))
        .with_state(state)
}

#[instrument(skip(state, tx))]
async fn serve(state: Arc<AppState>, tx: UnboundedSender<SocketAddr>) -> Result<(), RouteError> {
    let port = state.env.server_api_port;
    let app = router(state);

    let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), port);
    let listener = tokio::net::TcpListener::bind(socket_addr).await?;

    // the ready logger may already be gone; serving doesn't depend on it
    _ = tx.send(socket_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutdown signal received");
}

/// Logs any `RouteError` a handler or middleware attached to its response.
#[instrument(skip(request, next), fields(uri = request.uri().to_string()))]
async fn log_route_errors(request: Request, next: Next) -> Response {
    let res = next.run(request).await;
    if let Some(err) = res.extensions().get::<Arc<RouteError>>() {
        tracing::error!(error = ?err, "error occurred inside route handler");
    }

    res
}

#[instrument(skip(state, tx, rx))]
pub async fn start_server(
    state: Arc<AppState>,
    tx: UnboundedSender<SocketAddr>,
    mut rx: UnboundedReceiver<SocketAddr>,
) -> Result<Vec<JoinHandle<()>>, RouteError> {
    tracing::info!("starting server");
    let server_handle = tokio::task::spawn(async move {
        if let Err(e) = serve(state, tx).await {
            tracing::error!(error = ?e, "server exited with error");
        }
    });

    let logging_handle = tokio::task::spawn(async move {
        if let Some(addr) = rx.recv().await {
            tracing::info!(
                server_url = &format!("http://127.0.0.1:{}", addr.port()),
                "server ready"
            );
        }
    });

    Ok(vec![server_handle, logging_handle])
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Could not validate credentials")]
    Unauthorized(#[from] AuthErr),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    QueryError(#[from] PgError),

    #[error(transparent)]
    SqlxError(#[from] sqlx::error::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<JsonRejection> for RouteError {
    fn from(rejection: JsonRejection) -> Self {
        RouteError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for RouteError {
    fn from(rejection: QueryRejection) -> Self {
        RouteError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            detail: String,
        }

        let (status, detail, err) = match &self {
            RouteError::Unauthorized(reason) => {
                tracing::debug!(%reason, "rejected credentials");
                (StatusCode::UNAUTHORIZED, self.to_string(), None)
            }

            RouteError::NotFound(what) => (StatusCode::NOT_FOUND, what.to_string(), None),

            RouteError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone(), None),

            RouteError::QueryError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                Some(self),
            ),

            RouteError::SqlxError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                Some(self),
            ),

            RouteError::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("error storing upload: {err}"),
                Some(self),
            ),
        };

        let mut response = (status, Json(ErrorResponse { detail })).into_response();
        if let Some(err) = err {
            response.extensions_mut().insert(Arc::new(err));
        }

        response
    }
}
