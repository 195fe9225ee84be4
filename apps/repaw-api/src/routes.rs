use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use repaw_service::{
	CreateReportRequest, CreateReportResponse, Error as ServiceError, ListReportsRequest,
	ListReportsResponse, MatchSummary,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/match", post(run_match))
		.route("/v1/reports", post(create_report).get(list_reports))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct MatchParams {
	report_id: Option<String>,
}

async fn run_match(
	State(state): State<AppState>,
	Query(params): Query<MatchParams>,
) -> Result<Json<MatchSummary>, ApiError> {
	let Some(raw) = params.report_id else {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"report_id is required.",
		));
	};
	let report_id = Uuid::parse_str(&raw).map_err(|_| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", "report_id must be a UUID.")
	})?;
	let summary = state.service.match_report(report_id).await?;

	Ok(Json(summary))
}

async fn create_report(
	State(state): State<AppState>,
	Json(payload): Json<CreateReportRequest>,
) -> Result<Json<CreateReportResponse>, ApiError> {
	let response = state.service.create_report(payload).await?;

	Ok(Json(response))
}

async fn list_reports(
	State(state): State<AppState>,
	Query(params): Query<ListReportsRequest>,
) -> Result<Json<ListReportsResponse>, ApiError> {
	let response = state.service.list_reports(params).await?;

	Ok(Json(response))
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

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Provider { message } =>
				json_error(StatusCode::BAD_GATEWAY, "provider_error", message),
			ServiceError::Storage { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
