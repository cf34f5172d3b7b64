use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::Value;
use tower::util::ServiceExt;

use pwe_api::{routes, state::AppState};

const TEST_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "warn"

[storage]
backend = "memory"

[generator]
mode = "rule_based"
timeout_ms = 1000
"#;

async fn test_app() -> Router {
	let config = pwe_config::parse(TEST_CONFIG_TOML).expect("Failed to parse test config.");
	let state = AppState::new(config).await.expect("Failed to build app state.");

	routes::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.clone().oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

	(status, json)
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(CONTENT_TYPE, "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request.")
}

#[tokio::test]
async fn health_reports_generator_and_version() {
	let app = test_app().await;
	let (status, json) = send(&app, get("/")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["status"], "ok");
	assert_eq!(json["generator"], "rule_based");
	assert_eq!(json["version"], pwe_cli::VERSION);
}

#[tokio::test]
async fn generate_feedback_and_rank_round_trip() {
	let app = test_app().await;
	let (status, generated) = send(
		&app,
		post_json(
			"/v1/chat/completions",
			serde_json::json!({ "prompt": "Sell handmade candles this week", "user_id": "u1" }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(generated["category"], "ecommerce");
	assert_eq!(generated["matched_similar"], false);
	assert!(generated.get("similarity").is_none());
	assert_eq!(generated["estimated_earnings"], "$200-1000 (weekly potential)");
	assert_eq!(generated["confidence"], 0.6);

	let record_id = generated["record_id"].as_str().expect("record_id must be a string.");
	let (status, updated) = send(
		&app,
		post_json(
			"/v1/feedback",
			serde_json::json!({ "strategy_id": record_id, "success_score": 8, "earnings": 150.0 }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["record_id"], record_id);
	assert_eq!(updated["updated"], true);

	let (status, top) = send(&app, get("/v1/top-strategies")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(top["count"], 1);
	assert_eq!(top["strategies"][0]["category"], "ecommerce");

	let (status, history) = send(&app, get("/v1/history?user_id=u1&limit=5")).await;

	assert_eq!(status, StatusCode::OK);

	let record = &history["records"][0];

	assert_eq!(record["id"], record_id);
	assert_eq!(record["success_score"], 8);
	assert!(record.get("normalized_prompt").is_none());
	assert_eq!(history["top_categories"][0]["category"], "ecommerce");
}

#[tokio::test]
async fn repeated_prompt_reports_similarity() {
	let app = test_app().await;
	let payload = serde_json::json!({ "prompt": "Start a cooking blog" });

	send(&app, post_json("/v1/chat/completions", payload.clone())).await;

	let (status, json) = send(&app, post_json("/v1/chat/completions", payload)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["matched_similar"], true);
	assert_eq!(json["similarity"], 1.0);
}

#[tokio::test]
async fn blank_prompt_is_invalid_input() {
	let app = test_app().await;
	let (status, json) =
		send(&app, post_json("/v1/chat/completions", serde_json::json!({ "prompt": "  " }))).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_input");
	assert!(json["message"].as_str().is_some());
}

#[tokio::test]
async fn malformed_bodies_and_queries_are_invalid_input() {
	let app = test_app().await;
	let request = Request::builder()
		.method("POST")
		.uri("/v1/feedback")
		.header(CONTENT_TYPE, "application/json")
		.body(Body::from("{\"strategy_id\": 1"))
		.expect("Failed to build request.");
	let (status, json) = send(&app, request).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_input");

	let (status, json) = send(&app, get("/v1/history?limit=many")).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_input");
}

#[tokio::test]
async fn feedback_for_unknown_strategy_is_not_found() {
	let app = test_app().await;
	let (status, json) = send(
		&app,
		post_json(
			"/v1/feedback",
			serde_json::json!({
				"strategy_id": "does-not-exist",
				"success_score": 5,
				"earnings": 100,
			}),
		),
	)
	.await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(json["error_code"], "not_found");

	let (_, top) = send(&app, get("/v1/top-strategies")).await;

	assert_eq!(top["count"], 0);
}

#[tokio::test]
async fn out_of_range_score_is_invalid_input() {
	let app = test_app().await;
	let (_, generated) = send(
		&app,
		post_json("/v1/chat/completions", serde_json::json!({ "prompt": "Invest in ETFs" })),
	)
	.await;
	let record_id = generated["record_id"].clone();
	let (status, json) = send(
		&app,
		post_json(
			"/v1/feedback",
			serde_json::json!({ "strategy_id": record_id, "success_score": 11 }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_input");
}
