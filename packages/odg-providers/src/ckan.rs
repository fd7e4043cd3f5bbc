use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::{Error, Result};

/// HTTP transport for the CKAN `package_search` action.
///
/// Returns the raw body; schema validation happens in the domain layer.
#[derive(Clone, Debug)]
pub struct CkanClient {
	client: Client,
}
impl CkanClient {
	pub fn new(cfg: &odg_config::Upstream) -> Result<Self> {
		let headers = crate::request_headers(cfg.api_key.as_deref(), &cfg.default_headers)?;
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(headers)
			.build()?;

		Ok(Self { client })
	}

	/// One GET, no retries. Any non-2xx status is an error.
	pub async fn fetch(&self, url: &Url) -> Result<String> {
		tracing::debug!(%url, "Requesting upstream search.");

		let res = self.client.get(url.clone()).send().await?;
		let status = res.status();

		if !status.is_success() {
			return Err(status_error(status));
		}

		Ok(res.text().await?)
	}
}

fn status_error(status: StatusCode) -> Error {
	Error::Status { status: status.as_u16() }
}
