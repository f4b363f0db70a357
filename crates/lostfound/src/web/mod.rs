//! HTTP surface for lostfound.
//!
//! Routes:
//!
//! | Method   | Path                      | Handler                 |
//! |----------|---------------------------|-------------------------|
//! | GET/POST | `/`                       | public page             |
//! | GET/POST | `/admin/login`            | login form              |
//! | GET      | `/admin/logout`           | clear admin flag        |
//! | GET      | `/admin`                  | dashboard               |
//! | POST     | `/admin/update/:id`       | status update           |
//! | GET      | `/static/lost_found.js`   | report modal script     |
//! | GET      | `/healthz`                | liveness                |
//!
//! Handlers are thin: they decode the session cookie, run a [`Desk`]
//! operation on the blocking pool and turn the result into HTML or a redirect.

mod admin;
mod public;
pub mod render;

use std::future::Future;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::{from_fn, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, error, info, Instrument};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::{self, Session, SessionKey, COOKIE_NAME};
use crate::storage::Storage;
use crate::workflow::Desk;

/// Public home page.
pub const HOME_PATH: &str = "/";
/// Admin dashboard.
pub const ADMIN_PATH: &str = "/admin";
/// Admin login form.
pub const LOGIN_PATH: &str = "/admin/login";
/// Admin logout.
pub const LOGOUT_PATH: &str = "/admin/logout";
/// Report modal script.
pub const SCRIPT_PATH: &str = "/static/lost_found.js";

const LOST_FOUND_JS: &str = include_str!("../../static/lost_found.js");

/// Shared, immutable state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    desk: Desk,
    session_key: SessionKey,
}

impl AppState {
    /// Build state from its parts.
    #[must_use]
    pub fn new(desk: Desk, session_key: SessionKey) -> Self {
        Self { desk, session_key }
    }

    /// Open the configured database and build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        let desk = Desk::new(
            storage,
            &config.auth.admin_password,
            config.display.recent_limit,
        );
        Ok(Self::new(desk, SessionKey::new(&config.auth.secret_key)))
    }

    /// The workflows behind every page.
    #[must_use]
    pub fn desk(&self) -> &Desk {
        &self.desk
    }

    /// Decode the session cookie from request headers.
    fn session(&self, headers: &HeaderMap) -> Session {
        let value = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|cookie| session::find_cookie(cookie, COOKIE_NAME));
        self.session_key.decode_or_default(value)
    }

    /// Attach the session cookie to a response if the session changed.
    fn respond(&self, before: &Session, after: &Session, response: impl IntoResponse) -> Result<Response> {
        let mut response = response.into_response();
        if before != after {
            let cookie = session::set_cookie_header(&self.session_key.encode(after)?);
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| Error::internal(format!("unencodable session cookie: {e}")))?;
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Ok(response)
    }
}

/// Run a store-bound closure on the blocking thread pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::AuthRequired => Redirect::to(LOGIN_PATH).into_response(),
            err if err.is_user_facing() => {
                debug!("Unhandled workflow error: {}", err);
                (
                    StatusCode::BAD_REQUEST,
                    Html(render::error_page("That request could not be completed.")),
                )
                    .into_response()
            }
            other => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render::error_page(
                        "Something went wrong. Please try again later.",
                    )),
                )
                    .into_response()
            }
        }
    }
}

async fn request_tracing(request: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
    );
    async move {
        let response = next.run(request).await;
        debug!(status = response.status().as_u16(), "Request finished");
        response
    }
    .instrument(span)
    .await
}

async fn healthz() -> &'static str {
    "ok"
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        LOST_FOUND_JS,
    )
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HOME_PATH, get(public::home).post(public::home_submit))
        .route(LOGIN_PATH, get(admin::login_form).post(admin::login_submit))
        .route(LOGOUT_PATH, get(admin::logout))
        .route(ADMIN_PATH, get(admin::dashboard))
        .route("/admin/update/:tracking_id", post(admin::update))
        .route(SCRIPT_PATH, get(script))
        .route("/healthz", get(healthz))
        .layer(from_fn(request_tracing))
        .with_state(state)
}

/// Serve the application on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn run(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
