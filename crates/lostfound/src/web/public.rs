//! Public page handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::Form;
use serde::Deserialize;

use crate::error::Result;
use crate::workflow::PublicAction;

use super::{blocking, render, AppState};

/// Form posted to `/`. Which fields matter depends on `action`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct HomeForm {
    action: String,
    passenger_name: String,
    item_name: String,
    description: String,
    tracking_id: String,
}

impl From<HomeForm> for PublicAction {
    fn from(form: HomeForm) -> Self {
        match form.action.as_str() {
            "report" => Self::Report {
                passenger_name: form.passenger_name,
                item_name: form.item_name,
                description: form.description,
            },
            "track" => Self::Track {
                tracking_id: form.tracking_id,
            },
            _ => Self::View,
        }
    }
}

pub(super) async fn home(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    render_home(state, headers, PublicAction::View).await
}

pub(super) async fn home_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HomeForm>,
) -> Result<Response> {
    render_home(state, headers, form.into()).await
}

async fn render_home(state: AppState, headers: HeaderMap, action: PublicAction) -> Result<Response> {
    let before = state.session(&headers);
    let mut session = before.clone();

    let desk = state.desk().clone();
    let mut page = blocking(move || desk.public_page(action)).await?;

    // Flashes queued by an earlier redirect come first.
    let mut flashes = session.take_flashes();
    flashes.append(&mut page.flashes);
    page.flashes = flashes;

    let html = render::home(&page, session.is_admin());
    state.respond(&before, &session, Html(html))
}
