use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::{error::AppError, routes::trip_href, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(entry_form).post(entry_submit))
        .route("/thanks", get(thanks))
}

#[derive(Template)]
#[template(path = "entry.html")]
struct EntryTemplate {
    show_error: bool,
    error_message: String,
}

async fn entry_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(EntryTemplate {
        show_error: false,
        error_message: String::new(),
    })
}

#[derive(Deserialize)]
struct EntryForm {
    trip_id: String,
}

async fn entry_submit(Form(form): Form<EntryForm>) -> Result<Response, AppError> {
    let trip_id = form.trip_id.trim();
    if trip_id.is_empty() {
        return Ok(render_entry_error("Enter the trip id from your invite link".into()));
    }
    Ok(Redirect::to(&trip_href(trip_id)?).into_response())
}

fn render_entry_error(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(EntryTemplate {
            show_error: true,
            error_message: message,
        }),
    )
        .into_response()
}

#[derive(Template)]
#[template(path = "thanks.html")]
struct ThanksTemplate;

async fn thanks() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(ThanksTemplate)
}
