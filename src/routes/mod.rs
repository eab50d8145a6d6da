pub mod public;
pub mod trip;

use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{http::StatusCode, response::Response, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use url::Url;

use crate::{error::AppError, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .nest("/trip", trip::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Path of the trip page, with the id percent-encoded as one segment.
pub fn trip_href(trip_id: &str) -> Result<String, AppError> {
    let mut url =
        Url::parse("http://tripmates.invalid/trip").map_err(|err| AppError::Other(err.into()))?;
    url.path_segments_mut()
        .map_err(|()| AppError::Other(anyhow::anyhow!("base url has no path")))?
        .push(trip_id);
    Ok(url.path().to_owned())
}

#[derive(Template)]
#[template(path = "message.html")]
struct MessageTemplate {
    message: String,
}

pub(crate) fn render_message(status: StatusCode, error: &AppError) -> Response {
    (
        status,
        AskamaTemplateResponse::into_response(MessageTemplate {
            message: error.to_string(),
        }),
    )
        .into_response()
}
