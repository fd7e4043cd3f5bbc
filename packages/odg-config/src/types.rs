use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_UPSTREAM_PATH: &str = "/api/3/action/package_search";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub upstream: Upstream,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub views: Views,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Upstream {
	/// Catalog origin, e.g. `https://opendata.hhs.gov`.
	pub api_base: String,
	#[serde(default = "default_upstream_path")]
	pub path: String,
	/// Publishing organization every search is scoped to. Not exposed to callers.
	pub organization: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub api_key: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl Upstream {
	/// `api_base` joined with `path`, without doubling the slash.
	pub fn endpoint(&self) -> String {
		format!("{}{}", self.api_base.trim_end_matches('/'), self.path)
	}
}

/// Edge-cache directive attached to successful responses.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub max_age_secs: u32,
	pub stale_while_revalidate_secs: u32,
}
impl Cache {
	pub fn cache_control(&self) -> String {
		format!(
			"public, s-maxage={}, stale-while-revalidate={}",
			self.max_age_secs, self.stale_while_revalidate_secs
		)
	}
}
impl Default for Cache {
	fn default() -> Self {
		Self { max_age_secs: 300, stale_while_revalidate_secs: 600 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Views {
	/// Terms compared side by side by the search-comparison view.
	pub comparison_terms: Vec<String>,
	/// Topics compared by the format-by-topic view.
	pub topics: Vec<String>,
}
impl Default for Views {
	fn default() -> Self {
		Self {
			comparison_terms: ["hospital", "medicare", "vaccine", "mental health", "opioid", "diabetes"]
				.into_iter()
				.map(str::to_string)
				.collect(),
			topics: ["hospital", "medicare", "vaccine"].into_iter().map(str::to_string).collect(),
		}
	}
}

fn default_upstream_path() -> String {
	DEFAULT_UPSTREAM_PATH.to_string()
}
