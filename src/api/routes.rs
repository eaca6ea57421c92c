//! HTTP routes for the RSVP and score handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{Method, Uri};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::{Api, ApiError, Envelope, RsvpForm, RsvpRow, ScoreForm, ScoreParams, ScoreQuery, ScoreRow};

type ApiState = State<Arc<Api>>;

/// `/api/rsvp` and `/api/scores`; anything else is a JSON 404, other
/// methods on those paths a JSON 405
pub fn router(api: Api) -> Router {
    Router::new()
        .route(
            "/api/rsvp",
            get(list_rsvps_handler)
                .post(create_rsvp_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/api/scores",
            get(list_scores_handler)
                .post(create_score_handler)
                .fallback(method_not_allowed_handler),
        )
        .fallback(not_found_handler)
        .with_state(Arc::new(api))
}

/// Accept any JSON document, then decode it into the form type so a bad
/// field reads as a 400 rather than axum's 422
fn decode_body<T: serde::de::DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = body?;
    Ok(serde_json::from_value(value)?)
}

async fn create_rsvp_handler(
    State(api): ApiState,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<RsvpRow>>, ApiError> {
    let form: RsvpForm = decode_body(body)?;
    Ok(Json(api.create_rsvp(form).await?))
}

async fn list_rsvps_handler(State(api): ApiState) -> Result<Json<Envelope<Vec<RsvpRow>>>, ApiError> {
    Ok(Json(api.list_rsvps().await?))
}

async fn create_score_handler(
    State(api): ApiState,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<ScoreRow>>, ApiError> {
    let form: ScoreForm = decode_body(body)?;
    Ok(Json(api.create_score(form).await?))
}

async fn list_scores_handler(
    State(api): ApiState,
    Query(params): Query<ScoreParams>,
) -> Result<Json<Envelope<Vec<ScoreRow>>>, ApiError> {
    let query = ScoreQuery::from(params);
    Ok(Json(api.list_scores(&query).await?))
}

async fn method_not_allowed_handler(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
