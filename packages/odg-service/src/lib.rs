pub mod search;
pub mod views;

mod error;

pub use error::{Error, Result};
pub use views::{ComparisonView, SeriesView, TopicFormats, TopicView, ViewName, ViewReport};

use std::{future::Future, pin::Pin, sync::Arc};

use url::Url;

use odg_config::Config;
use odg_providers::ckan::CkanClient;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of raw `package_search` bodies.
pub trait UpstreamProvider
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, odg_providers::Result<String>>;
}

impl UpstreamProvider for CkanClient {
	fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, odg_providers::Result<String>> {
		Box::pin(CkanClient::fetch(self, url))
	}
}

/// Request-scoped search pipeline plus the display views built on it.
///
/// Cloning is cheap; clones share the config and the upstream provider.
#[derive(Clone)]
pub struct GatewayService {
	pub cfg: Arc<Config>,
	pub endpoint: Url,
	pub upstream: Arc<dyn UpstreamProvider>,
}
impl GatewayService {
	pub fn new(cfg: Config) -> Result<Self> {
		let upstream = CkanClient::new(&cfg.upstream)?;

		Self::with_upstream(cfg, Arc::new(upstream))
	}

	pub fn with_upstream(cfg: Config, upstream: Arc<dyn UpstreamProvider>) -> Result<Self> {
		let endpoint = Url::parse(&cfg.upstream.endpoint()).map_err(|err| Error::InvalidConfig {
			message: format!("upstream endpoint is not a valid URL: {err}."),
		})?;

		Ok(Self { cfg: Arc::new(cfg), endpoint, upstream })
	}
}
