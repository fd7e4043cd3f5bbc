use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	label,
	normalize::{DatasetSummary, UpstreamPage},
	query::{Query, SortOrder},
};

/// `max(1, ceil(total / page_size))`; a zero page size is treated as 1.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
	total.div_ceil(u64::from(page_size.max(1))).max(1)
}

/// Filters that were actually sent upstream, echoed back to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilters {
	pub tag: Option<String>,
	/// Upper-cased, matching the `res_format` clause.
	pub format: Option<String>,
}
impl AppliedFilters {
	pub fn from_query(query: &Query) -> Self {
		Self {
			tag: query.tag.clone(),
			format: query.format.as_deref().map(|format| label::normalize_format(Some(format))),
		}
	}
}

/// Stable response contract of the search endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub query: String,
	pub page: u32,
	pub page_size: u32,
	pub total: u64,
	pub total_pages: u64,
	pub sort: SortOrder,
	pub filters: AppliedFilters,
	pub datasets: Vec<DatasetSummary>,
	pub source: String,
	#[serde(with = "crate::time_serde")]
	pub generated_at: OffsetDateTime,
}
impl SearchResult {
	pub fn assemble(
		query: &Query,
		page: UpstreamPage,
		source: impl Into<String>,
		generated_at: OffsetDateTime,
	) -> Self {
		let mut datasets = page.datasets;

		// Never more than one page, even if upstream ignores `rows`.
		datasets.truncate(query.page_size as usize);

		Self {
			query: query.text.clone(),
			page: query.page,
			page_size: query.page_size,
			total: page.total,
			total_pages: total_pages(page.total, query.page_size),
			sort: query.sort,
			filters: AppliedFilters::from_query(query),
			datasets,
			source: source.into(),
			generated_at,
		}
	}
}
