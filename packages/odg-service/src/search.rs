use std::collections::HashMap;

use time::OffsetDateTime;

use odg_domain::{
	Query, SearchResult, normalize::parse_upstream, query::parse_query, upstream::build_request,
};

use crate::{GatewayService, Result};

impl GatewayService {
	/// Validates raw query-string parameters, then runs [`GatewayService::search_query`].
	pub async fn search(&self, params: &HashMap<String, String>) -> Result<SearchResult> {
		let query = parse_query(params)?;

		self.search_query(&query).await
	}

	/// One upstream call, mapped onto the stable result schema. Nothing is retried.
	pub async fn search_query(&self, query: &Query) -> Result<SearchResult> {
		let url = build_request(&self.endpoint, &self.cfg.upstream.organization, query);
		let body = self.upstream.fetch(&url).await.inspect_err(|err| {
			tracing::warn!(%url, error = %err, "Upstream search failed.");
		})?;
		let page = parse_upstream(&body).inspect_err(|err| {
			tracing::warn!(%url, error = %err.message, "Upstream payload rejected.");
		})?;

		tracing::debug!(total = page.total, returned = page.datasets.len(), "Upstream search succeeded.");

		Ok(SearchResult::assemble(query, page, self.endpoint.as_str(), OffsetDateTime::now_utc()))
	}
}
