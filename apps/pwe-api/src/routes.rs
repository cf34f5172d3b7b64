use axum::{
	Json, Router,
	extract::{
		Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use pwe_service::{
	Error, GenerateRequest, GenerateResponse, HistoryRequest, HistoryResponse,
	TopStrategiesResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(health))
		.route("/v1/chat/completions", post(chat_completions))
		.route("/v1/history", get(history))
		.route("/v1/feedback", post(feedback))
		.route("/v1/top-strategies", get(top_strategies))
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
	status: &'static str,
	version: &'static str,
	generator: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
	pub strategy_id: String,
	pub success_score: i64,
	#[serde(default)]
	pub earnings: f64,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
	pub record_id: String,
	pub updated: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		version: pwe_cli::VERSION,
		generator: state.service.generator_label(),
	})
}

async fn chat_completions(
	State(state): State<AppState>,
	payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.handle_request(payload).await?;

	Ok(Json(response))
}

async fn history(
	State(state): State<AppState>,
	query: Result<Query<HistoryRequest>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
	let Query(query) = query?;
	let response = state.service.history(query).await?;

	Ok(Json(response))
}

async fn feedback(
	State(state): State<AppState>,
	payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
	let Json(payload) = payload?;
	let record = state
		.service
		.submit_feedback(&payload.strategy_id, payload.success_score, payload.earnings)
		.await?;

	Ok(Json(FeedbackResponse { record_id: record.id.to_string(), updated: true }))
}

async fn top_strategies(
	State(state): State<AppState>,
) -> Result<Json<TopStrategiesResponse>, ApiError> {
	let response = state.service.top_strategies_response().await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidInput { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_input", message),
			Error::NotFound { message } => Self::new(StatusCode::NOT_FOUND, "not_found", message),
			Error::StoreUnavailable { .. } => Self::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"store_unavailable",
				"The record store is unavailable. Try again later.",
			),
			Error::Config { message } =>
				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text())
	}
}

impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
