//! Admin handlers: login, logout, dashboard and status updates.
//!
//! Anonymous requests to the dashboard or the update route get
//! [`Error::AuthRequired`](crate::Error::AuthRequired), which renders as a
//! redirect to the login form.

use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::report::StatusUpdate;
use crate::session::Flash;
use crate::workflow::{Desk, MSG_INVALID_PASSWORD};

use super::{blocking, render, AppState, ADMIN_PATH, HOME_PATH};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoginForm {
    password: String,
}

/// Checkbox values; absent boxes are simply missing from the form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct UpdateForm {
    found_status: Option<String>,
    claim_status: Option<String>,
}

pub(super) async fn login_form(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let before = state.session(&headers);
    if before.is_admin() {
        return Ok(Redirect::to(ADMIN_PATH).into_response());
    }

    let mut session = before.clone();
    let flashes = session.take_flashes();
    state.respond(&before, &session, Html(render::login(&flashes)))
}

pub(super) async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let before = state.session(&headers);
    let mut session = before.clone();

    match state.desk().log_in(&mut session, &form.password) {
        Ok(()) => state.respond(&before, &session, Redirect::to(ADMIN_PATH)),
        Err(Error::AuthFailed) => {
            let mut flashes = session.take_flashes();
            flashes.push(Flash::error(MSG_INVALID_PASSWORD));
            state.respond(&before, &session, Html(render::login(&flashes)))
        }
        Err(err) => Err(err),
    }
}

pub(super) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let before = state.session(&headers);
    let mut session = before.clone();
    session.log_out();
    state.respond(&before, &session, Redirect::to(HOME_PATH))
}

pub(super) async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let before = state.session(&headers);
    Desk::require_admin(&before)?;

    let mut session = before.clone();
    let desk = state.desk().clone();
    let snapshot = session.clone();
    let dashboard = blocking(move || desk.dashboard(&snapshot)).await?;

    let flashes = session.take_flashes();
    state.respond(&before, &session, Html(render::dashboard(&dashboard, &flashes)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    tracking_id: std::result::Result<Path<String>, PathRejection>,
    form: std::result::Result<Form<UpdateForm>, FormRejection>,
) -> Result<Response> {
    let before = state.session(&headers);
    // Checked before the path and body so anonymous callers always get the redirect.
    Desk::require_admin(&before)?;
    let Path(tracking_id) = tracking_id.map_err(|e| Error::validation(e.body_text()))?;
    let Form(form) = form.map_err(|e| Error::validation(e.body_text()))?;

    let update = StatusUpdate::from_form(form.found_status.as_deref(), form.claim_status.as_deref());
    let desk = state.desk().clone();
    let snapshot = before.clone();
    let flash = blocking(move || desk.update_status(&snapshot, &tracking_id, update)).await?;

    let mut session = before.clone();
    session.push_flash(flash);
    state.respond(&before, &session, Redirect::to(ADMIN_PATH))
}
