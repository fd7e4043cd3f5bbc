//! Fixtures shared by the service and HTTP test suites: a scripted upstream, CKAN payload
//! builders and an in-memory config.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use serde_json::{Value, json};
use url::Url;

use odg_config::{Cache, Config, Service, Upstream, Views};
use odg_service::{BoxFuture, GatewayService, UpstreamProvider};

pub const TEST_API_BASE: &str = "https://catalog.test";
pub const TEST_ORGANIZATION: &str = "hhs-gov";
pub const TEST_MODIFIED: &str = "2024-03-01T10:00:00.000000";

/// What the stub answers for one request.
#[derive(Clone, Debug)]
pub enum Reply {
	Body(String),
	Status(u16),
	/// Panics inside the fetch future, taking down the task that polls it.
	Panic,
}

/// Upstream double keyed on the `q` parameter of each request.
///
/// Unrouted requests get the fallback reply. Every URL is recorded in arrival order.
pub struct StubUpstream {
	routes: HashMap<String, Reply>,
	fallback: Reply,
	requests: Mutex<Vec<Url>>,
}
impl StubUpstream {
	pub fn new(fallback: Reply) -> Self {
		Self { routes: HashMap::new(), fallback, requests: Mutex::new(Vec::new()) }
	}

	pub fn route(mut self, text: &str, reply: Reply) -> Self {
		self.routes.insert(text.to_string(), reply);

		self
	}

	pub fn requests(&self) -> Vec<Url> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	fn reply_for(&self, url: &Url) -> Reply {
		let text = url.query_pairs().find(|(key, _)| key == "q").map(|(_, value)| value.into_owned());

		text.and_then(|text| self.routes.get(&text).cloned()).unwrap_or_else(|| self.fallback.clone())
	}
}
impl UpstreamProvider for StubUpstream {
	fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, odg_providers::Result<String>> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(url.clone());

		let reply = self.reply_for(url);
		let requested = url.to_string();

		Box::pin(async move {
			match reply {
				Reply::Body(body) => Ok(body),
				Reply::Status(status) => Err(odg_providers::Error::Status { status }),
				Reply::Panic => panic!("Scripted upstream panic for {requested}."),
			}
		})
	}
}

pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		upstream: Upstream {
			api_base: TEST_API_BASE.to_string(),
			path: odg_config::DEFAULT_UPSTREAM_PATH.to_string(),
			organization: TEST_ORGANIZATION.to_string(),
			timeout_ms: 1_000,
			api_key: None,
			default_headers: Default::default(),
		},
		cache: Cache::default(),
		views: Views::default(),
	}
}

/// Service wired to `upstream`; the stub stays reachable through the returned handle.
pub fn stub_service(upstream: StubUpstream) -> (GatewayService, Arc<StubUpstream>) {
	let upstream = Arc::new(upstream);
	let service = GatewayService::with_upstream(test_config(), upstream.clone())
		.unwrap_or_else(|err| panic!("Failed to build test service: {err}."));

	(service, upstream)
}

/// A successful `package_search` body.
pub fn ckan_body(count: u64, packages: Vec<Value>) -> String {
	json!({ "success": true, "result": { "count": count, "results": packages } }).to_string()
}

/// A package with one resource per entry in `formats` and no tags.
pub fn package(id: &str, title: &str, formats: &[&str]) -> Value {
	let resources: Vec<_> = formats
		.iter()
		.enumerate()
		.map(|(index, format)| {
			json!({
				"id": format!("{id}-r{index}"),
				"name": format!("{title} file {index}"),
				"format": format,
				"url": format!("{TEST_API_BASE}/files/{id}/{index}"),
			})
		})
		.collect();

	json!({
		"id": id,
		"title": title,
		"notes": format!("About {title}."),
		"metadata_modified": TEST_MODIFIED,
		"tags": [],
		"resources": resources,
	})
}

/// `package` with the given tag names attached.
pub fn tagged_package(id: &str, title: &str, tags: &[&str]) -> Value {
	let mut value = package(id, title, &["CSV"]);

	value["tags"] = tags.iter().map(|tag| json!({ "name": tag })).collect();

	value
}
