use std::collections::HashMap;

use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;

use odg_domain::ValidationError;
use odg_service::{Error as ServiceError, ViewName};

use crate::state::AppState;

const INVALID_QUERY: &str = "Invalid query parameters";
const SEARCH_UNAVAILABLE: &str = "Unable to fetch datasets right now";
const VIEW_UNAVAILABLE: &str = "Unable to build visualization right now";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/datasets", get(datasets))
		.route("/api/views/{name}", get(view))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn datasets(
	State(state): State<AppState>,
	Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
	let result = state.service.search(&params).await.map_err(|err| match err {
		ServiceError::Validation(details) => ApiError::invalid_query(details),
		err => ApiError::upstream(SEARCH_UNAVAILABLE, &err),
	})?;

	Ok(cached(&state, Json(result)))
}

async fn view(
	State(state): State<AppState>,
	Path(name): Path<String>,
) -> Result<Response, ApiError> {
	let Some(view) = ViewName::parse(&name) else {
		return Err(ApiError::new(StatusCode::NOT_FOUND, format!("Unknown view \"{name}\".")));
	};
	let report =
		state.service.view(view).await.map_err(|err| ApiError::upstream(VIEW_UNAVAILABLE, &err))?;

	Ok(cached(&state, Json(report)))
}

fn cached(state: &AppState, body: impl IntoResponse) -> Response {
	([(header::CACHE_CONTROL, state.cache_control.clone())], body).into_response()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	details: Option<ValidationError>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error: String,
	details: Option<ValidationError>,
}
impl ApiError {
	fn new(status: StatusCode, error: impl Into<String>) -> Self {
		Self { status, error: error.into(), details: None }
	}

	fn invalid_query(details: ValidationError) -> Self {
		Self { status: StatusCode::BAD_REQUEST, error: INVALID_QUERY.to_string(), details: Some(details) }
	}

	/// The cause is logged, never returned to the caller.
	fn upstream(message: &str, err: &ServiceError) -> Self {
		tracing::warn!(error = %err, "Request failed upstream.");

		Self::new(StatusCode::BAD_GATEWAY, message)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error: self.error, details: self.details };

		(self.status, Json(body)).into_response()
	}
}
