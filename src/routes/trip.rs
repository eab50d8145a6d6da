use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    auth::{self, TripAccess},
    error::AppError,
    models::trip::Trip,
    reconcile::{self, ParticipantForm},
    routes::{render_message, trip_href},
    state::AppState,
};

const THANKS_PATH: &str = "/thanks";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(trip_page))
        .route("/:id/unlock", post(unlock_submit))
        .route("/:id/join", post(join_submit))
}

#[derive(Template)]
#[template(path = "trip/passphrase.html")]
struct PassphraseTemplate {
    trip_path: String,
    show_error: bool,
    error_message: String,
}

#[derive(Clone)]
struct LinkRow {
    title: String,
    /// Empty when the link is not safe to render as an anchor.
    href: String,
}

#[derive(Template)]
#[template(path = "trip/detail.html")]
struct TripDetailTemplate {
    trip_path: String,
    title: String,
    description: String,
    details: String,
    date_range: String,
    seats_left: i64,
    have: String,
    need: String,
    going: String,
    links: Vec<LinkRow>,
    brings_hint: String,
}

impl TripDetailTemplate {
    fn build(trip_path: String, trip: &Trip, date_format: &str) -> Self {
        let links = trip
            .links
            .iter()
            .map(|link| LinkRow {
                title: link.title_text().to_owned(),
                href: link.safe_href().unwrap_or_default().to_owned(),
            })
            .collect();
        Self {
            trip_path,
            title: trip.title.clone(),
            description: trip.description.clone(),
            details: trip.details.clone(),
            date_range: reconcile::format_date_range_with(trip, date_format),
            seats_left: reconcile::seats_remaining(trip),
            have: reconcile::consolidated_have(trip).join(","),
            need: reconcile::outstanding_needs(trip).to_string(),
            going: reconcile::going_list(trip).join(", "),
            links,
            brings_hint: reconcile::requirement_hint(trip),
        }
    }
}

async fn trip_page(
    State(state): State<AppState>,
    access: TripAccess,
    Path(trip_id): Path<String>,
) -> Result<Response, AppError> {
    let trip_path = trip_href(&trip_id)?;
    if !access.allows(&trip_id) {
        return Ok(render_passphrase(trip_path, StatusCode::OK, None));
    }

    let Some(trip) = state.store.fetch_trip_by_id(&trip_id).await? else {
        return Ok(render_message(StatusCode::NOT_FOUND, &AppError::NotFound));
    };
    Ok(AskamaTemplateResponse::into_response(
        TripDetailTemplate::build(trip_path, &trip, &state.config.date_format),
    ))
}

#[derive(Deserialize)]
struct UnlockForm {
    passphrase: String,
}

async fn unlock_submit(
    State(state): State<AppState>,
    access: TripAccess,
    jar: PrivateCookieJar,
    Path(trip_id): Path<String>,
    Form(form): Form<UnlockForm>,
) -> Result<Response, AppError> {
    let trip_path = trip_href(&trip_id)?;
    let Some(trip) = state.store.fetch_trip_by_id(&trip_id).await? else {
        return Ok(render_passphrase(
            trip_path,
            StatusCode::NOT_FOUND,
            Some(&AppError::NotFound),
        ));
    };

    match auth::check_passphrase(&trip, &form.passphrase) {
        Ok(()) => {
            info!(trip = %trip_id, "trip unlocked");
            let jar = access.grant(jar, &trip_id)?;
            Ok((jar, Redirect::to(&trip_path)).into_response())
        }
        Err(err @ AppError::AccessDenied) => {
            info!(trip = %trip_id, "passphrase rejected");
            Ok(render_passphrase(trip_path, StatusCode::FORBIDDEN, Some(&err)))
        }
        Err(err) => Err(err),
    }
}

/// Folds the submission into the roster and moves on to the confirmation
/// page. A failed write is logged and the confirmation is shown anyway.
async fn join_submit(
    State(state): State<AppState>,
    access: TripAccess,
    Path(trip_id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    if let Err(err) = access.require(&trip_id) {
        return Ok(render_message(StatusCode::FORBIDDEN, &err));
    }

    let submission = match ParticipantForm::from_fields(
        fields
            .iter()
            .map(|(field, raw)| (field.as_str(), raw.as_str())),
    )
    .into_participant()
    {
        Ok(submission) => submission,
        Err(err) => {
            return Ok(render_message(StatusCode::BAD_REQUEST, &AppError::from(err)));
        }
    };

    let trip = match state.store.fetch_trip_by_id(&trip_id).await {
        Ok(Some(trip)) => trip,
        Ok(None) => return Ok(render_message(StatusCode::NOT_FOUND, &AppError::NotFound)),
        Err(err) => {
            warn!(trip = %trip_id, error = %err, "could not load trip for submission");
            return Ok(Redirect::to(THANKS_PATH).into_response());
        }
    };

    let name = submission.name.clone();
    let participants = reconcile::merge_participant(&trip, submission);
    match state
        .store
        .update_trip_participants(&trip_id, &participants)
        .await
    {
        Ok(()) => info!(trip = %trip_id, participant = %name, "participant saved"),
        Err(err) => {
            warn!(trip = %trip_id, participant = %name, error = %err, "participant update failed")
        }
    }

    Ok(Redirect::to(THANKS_PATH).into_response())
}

fn render_passphrase(trip_path: String, status: StatusCode, error: Option<&AppError>) -> Response {
    (
        status,
        AskamaTemplateResponse::into_response(PassphraseTemplate {
            trip_path,
            show_error: error.is_some(),
            error_message: error.map(ToString::to_string).unwrap_or_default(),
        }),
    )
        .into_response()
}
