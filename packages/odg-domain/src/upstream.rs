use url::Url;

use crate::{
	label,
	query::{Query, SortOrder},
};

pub const PARAM_QUERY: &str = "q";
pub const PARAM_ROWS: &str = "rows";
pub const PARAM_START: &str = "start";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_FILTER: &str = "fq";

impl SortOrder {
	/// Solr sort clause understood by the CKAN `package_search` action.
	pub fn upstream_sort(self) -> &'static str {
		match self {
			Self::Recent => "metadata_modified desc",
			// Equal scores fall back to recency so paging stays stable.
			Self::Relevance => "score desc, metadata_modified desc",
			Self::Title => "title_string asc",
		}
	}
}

/// Builds the full upstream search URL for `query`.
///
/// The organization clause is always part of `fq`; callers have no way to drop or replace it.
pub fn build_request(endpoint: &Url, organization: &str, query: &Query) -> Url {
	let mut url = endpoint.clone();
	let start = u64::from(query.page.saturating_sub(1)) * u64::from(query.page_size);

	url.query_pairs_mut()
		.clear()
		.append_pair(PARAM_QUERY, &query.text)
		.append_pair(PARAM_ROWS, &query.page_size.to_string())
		.append_pair(PARAM_START, &start.to_string())
		.append_pair(PARAM_SORT, query.sort.upstream_sort())
		.append_pair(PARAM_FILTER, &filter_expression(organization, query));

	url
}

/// Combined `fq` expression: organization scope, then the optional tag and format clauses.
pub fn filter_expression(organization: &str, query: &Query) -> String {
	let mut clauses = vec![exact_clause("organization", organization)];

	if let Some(tag) = query.tag.as_deref() {
		clauses.push(exact_clause("tags", tag));
	}
	if let Some(format) = query.format.as_deref() {
		clauses.push(exact_clause("res_format", &label::normalize_format(Some(format))));
	}

	clauses.join(" AND ")
}

fn exact_clause(field: &str, value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for ch in value.chars() {
		if matches!(ch, '"' | '\\') {
			escaped.push('\\');
		}

		escaped.push(ch);
	}

	format!("{field}:\"{escaped}\"")
}
