use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
	response::Response,
};
use serde_json::Value;
use tower::util::ServiceExt;

use odg_api::{routes, state::AppState};
use odg_testkit::{Reply, StubUpstream, ckan_body, package, stub_service};

const CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

fn app(reply: Reply) -> Router {
	let (service, _) = stub_service(StubUpstream::new(reply));
	let state = AppState::from_service(service).expect("Failed to initialize app state.");

	routes::router(state)
}

fn catalog() -> Reply {
	Reply::Body(ckan_body(42, vec![package("a", "Hospital beds", &["CSV", "JSON"])]))
}

async fn get(app: Router, uri: &str) -> Response {
	app.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call the router.")
}

async fn json_body(response: Response) -> Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let response = get(app(catalog()), "/health").await;

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn datasets_returns_a_cacheable_page() {
	let response = get(app(catalog()), "/api/datasets?q=hospital&pageSize=10&format=csv").await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::CACHE_CONTROL).and_then(|value| value.to_str().ok()),
		Some(CACHE_CONTROL),
	);

	let json = json_body(response).await;

	assert_eq!(json["query"], "hospital");
	assert_eq!(json["pageSize"], 10);
	assert_eq!(json["totalPages"], 5);
	assert_eq!(json["sort"], "recent");
	assert_eq!(json["filters"]["format"], "CSV");
	assert_eq!(json["datasets"][0]["resources"][0]["format"], "CSV");
	assert!(json["generatedAt"].as_str().is_some_and(|value| value.ends_with('Z')));
}

#[tokio::test]
async fn unset_filters_are_echoed_as_nulls() {
	let json = json_body(get(app(catalog()), "/api/datasets").await).await;

	assert_eq!(json["filters"], serde_json::json!({ "tag": null, "format": null }));
}

#[tokio::test]
async fn invalid_parameters_are_reported_per_field() {
	let response = get(app(catalog()), "/api/datasets?pageSize=999&page=abc").await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert!(response.headers().get(header::CACHE_CONTROL).is_none());

	let json = json_body(response).await;

	assert_eq!(json["error"], "Invalid query parameters");
	assert_eq!(json["details"]["formErrors"], serde_json::json!([]));
	assert!(json["details"]["fieldErrors"]["pageSize"].is_array());
	assert!(json["details"]["fieldErrors"]["page"].is_array());
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() {
	let response = get(app(Reply::Status(500)), "/api/datasets").await;

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(
		json_body(response).await,
		serde_json::json!({ "error": "Unable to fetch datasets right now" }),
	);
}

#[tokio::test]
async fn malformed_upstream_payload_is_a_bad_gateway() {
	let response = get(app(Reply::Body("<html></html>".to_string())), "/api/datasets").await;

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn views_are_served_by_slug() {
	let response = get(app(catalog()), "/api/views/format-distribution").await;

	assert_eq!(response.status(), StatusCode::OK);
	assert!(response.headers().get(header::CACHE_CONTROL).is_some());

	let json = json_body(response).await;

	assert_eq!(json["view"], "format-distribution");
	assert_eq!(json["query"]["pageSize"], 100);
	assert_eq!(json["series"][0]["label"], "CSV");
	assert_eq!(json["series"][0]["percent"], 50);
}

#[tokio::test]
async fn unknown_view_is_not_found() {
	let response = get(app(catalog()), "/api/views/pie-chart").await;

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn panicked_view_task_is_a_bad_gateway() {
	let (service, _) = stub_service(
		StubUpstream::new(Reply::Body(ckan_body(3, Vec::new()))).route("opioid", Reply::Panic),
	);
	let state = AppState::from_service(service).expect("Failed to initialize app state.");
	let response = get(routes::router(state), "/api/views/search-comparison").await;

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(
		json_body(response).await,
		serde_json::json!({ "error": "Unable to build visualization right now" }),
	);
}

#[tokio::test]
async fn failed_view_is_a_bad_gateway() {
	let response = get(app(Reply::Status(503)), "/api/views/search-comparison").await;

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(
		json_body(response).await,
		serde_json::json!({ "error": "Unable to build visualization right now" }),
	);
}
