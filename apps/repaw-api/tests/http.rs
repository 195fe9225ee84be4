//! HTTP surface tests (gated on REPAW_PG_DSN). The offline embedding
//! provider is in effect since no api_key is configured.

use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode, header},
};
use tower::ServiceExt;
use uuid::Uuid;

use repaw_api::{routes, state::AppState};
use repaw_config::{Config, EmbeddingProviderConfig, Matching, Postgres, Service, Storage, Sweep};
use repaw_testkit::TestDatabase;

fn test_config(dsn: &str) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage {
			postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 4 },
		},
		providers: repaw_config::Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "offline".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: None,
				path: "/v1/embeddings".to_string(),
				model: "offline".to_string(),
				dimensions: 8,
				timeout_ms: 1_000,
				default_headers: Default::default(),
			},
		},
		matching: Matching::default(),
		sweep: Sweep::default(),
	}
}

async fn test_router(test_db: &TestDatabase) -> Router {
	let state = AppState::new(test_config(test_db.dsn()))
		.await
		.expect("Failed to build app state.");

	routes::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Response body must be JSON.")
}

#[tokio::test]
async fn health_responds_ok() {
	let Some(dsn) = repaw_testkit::env_dsn() else {
		eprintln!("Skipping health_responds_ok; set REPAW_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let response = app
		.oneshot(Request::get("/health").body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn match_requires_a_well_formed_report_id() {
	let Some(dsn) = repaw_testkit::env_dsn() else {
		eprintln!("Skipping match_requires_a_well_formed_report_id; set REPAW_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let missing = app
		.clone()
		.oneshot(Request::post("/v1/match").body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Request failed.");

	assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

	let body = body_json(missing).await;

	assert_eq!(body["error_code"], "invalid_request");

	let malformed = app
		.oneshot(
			Request::post("/v1/match?report_id=not-a-uuid")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn match_for_unknown_report_is_not_found() {
	let Some(dsn) = repaw_testkit::env_dsn() else {
		eprintln!("Skipping match_for_unknown_report_is_not_found; set REPAW_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let response = app
		.oneshot(
			Request::post(format!("/v1/match?report_id={}", Uuid::new_v4()))
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let body = body_json(response).await;

	assert_eq!(body["error_code"], "not_found");

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn report_create_list_and_match_round_trip() {
	let Some(dsn) = repaw_testkit::env_dsn() else {
		eprintln!("Skipping report_create_list_and_match_round_trip; set REPAW_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let payload = serde_json::json!({
		"kind": "LOST",
		"description": "black lab, red collar",
		"lat": 42.70,
		"lng": -73.10,
		"city": "Troy",
	});
	let created = app
		.clone()
		.oneshot(
			Request::post("/v1/reports")
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(created.status(), StatusCode::OK);

	let created_body = body_json(created).await;
	let id = created_body["id"].as_str().expect("Response must include id.").to_string();
	let listed = app
		.clone()
		.oneshot(
			Request::get("/v1/reports?kind=LOST")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(listed.status(), StatusCode::OK);

	let listed_body = body_json(listed).await;

	assert_eq!(listed_body["reports"][0]["id"], id.as_str());
	// Contact details never appear in listings.
	assert!(listed_body["reports"][0].get("contact_email").is_none());

	// No opposite-kind reports yet: the run succeeds with an empty summary.
	let matched = app
		.oneshot(
			Request::post(format!("/v1/match?report_id={id}"))
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(matched.status(), StatusCode::OK);

	let match_body = body_json(matched).await;

	assert_eq!(match_body["count"], 0);
	assert_eq!(match_body["top"].as_array().expect("top must be an array.").len(), 0);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn report_kind_is_validated() {
	let Some(dsn) = repaw_testkit::env_dsn() else {
		eprintln!("Skipping report_kind_is_validated; set REPAW_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&dsn).await.expect("Failed to create test database.");
	let app = test_router(&test_db).await;
	let payload = serde_json::json!({ "kind": "SIGHTING", "description": "maybe a dog" });
	let response = app
		.oneshot(
			Request::post("/v1/reports")
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body = body_json(response).await;

	assert_eq!(body["error_code"], "invalid_request");

	test_db.cleanup().await.expect("Failed to clean up test database.");
}
