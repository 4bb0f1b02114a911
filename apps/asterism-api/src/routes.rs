use std::sync::Arc;

use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use asterism_domain::{ContentItem, PostType, RawContentQuery, Taxonomy, Term};
use asterism_service::Error as ServiceError;

use crate::{query_string, state::AppState};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/ast/v1/query", get(query_from_params).post(query_from_body))
		.route("/ast/v1/types", get(list_types))
		.route("/ast/v1/taxonomies", get(list_taxonomies))
		.route("/ast/v1/taxonomies/{taxonomy}/terms", get(list_terms))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn query_from_params(
	State(state): State<AppState>,
	params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
	let raw = match params {
		Ok(Query(pairs)) => query_string::to_value(&pairs).map_err(|err| err.to_string()),
		Err(err) => Err(err.body_text()),
	};

	match raw {
		Ok(raw) => evaluate(&state, raw).await,
		Err(reason) => unreadable(&reason),
	}
}

async fn query_from_body(
	State(state): State<AppState>,
	payload: Result<Json<Value>, JsonRejection>,
) -> Response {
	match payload {
		Ok(Json(raw)) => evaluate(&state, raw).await,
		Err(err) => unreadable(&err.body_text()),
	}
}

/// A `fixedValue` object next to the query holds fields the editor locked; they win over the rest.
async fn evaluate(state: &AppState, mut raw: Value) -> Response {
	let fixed_value = raw.as_object_mut().and_then(|body| body.remove("fixedValue"));
	let parsed = serde_json::from_value::<RawContentQuery>(raw).and_then(|raw| {
		let fixed_value: RawContentQuery =
			fixed_value.map(serde_json::from_value).transpose()?.unwrap_or_default();

		Ok((raw, fixed_value))
	});
	let (raw, fixed_value) = match parsed {
		Ok(parsed) => parsed,
		Err(err) => return unreadable(&err.to_string()),
	};
	let query = state.service.normalize_fixed(raw, &fixed_value);
	let service = Arc::clone(&state.service);

	match tokio::spawn(async move { service.evaluate(&query).await }).await {
		Ok(items) => Json(items).into_response(),
		// Repository failures degrade to empty phases, so only a panic lands here.
		Err(err) => {
			tracing::error!(error = %err, "Content query evaluation failed.");

			(StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::<ContentItem>::new())).into_response()
		},
	}
}

/// Query endpoints answer with an empty list whatever went wrong, so a theme can render it as-is.
fn unreadable(reason: &str) -> Response {
	tracing::debug!(reason, "Rejected unreadable content query.");

	(StatusCode::BAD_REQUEST, Json(Vec::<ContentItem>::new())).into_response()
}

async fn list_types(State(state): State<AppState>) -> Result<Json<Vec<PostType>>, ApiError> {
	let types = state.service.list_types().await?;

	Ok(Json(types))
}

#[derive(Debug, Deserialize)]
struct TaxonomiesParams {
	#[serde(rename = "postType")]
	post_type: Option<String>,
}

async fn list_taxonomies(
	State(state): State<AppState>,
	Query(params): Query<TaxonomiesParams>,
) -> Result<Json<Vec<Taxonomy>>, ApiError> {
	let taxonomies = state.service.list_taxonomies(params.post_type.as_deref()).await?;

	Ok(Json(taxonomies))
}

async fn list_terms(
	State(state): State<AppState>,
	Path(taxonomy): Path<String>,
) -> Result<Json<Vec<Term>>, ApiError> {
	let terms = state.service.list_terms(&taxonomy).await?;

	Ok(Json(terms))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::Repository { message } => {
				tracing::error!(error = %message, "Catalogue lookup failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL_ERROR",
					"Content repository is unavailable.",
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
