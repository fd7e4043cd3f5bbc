//! Display views over live search results.
//!
//! Each view owns its own fetch and reduce steps and goes through [`GatewayService::search`], so
//! it sees exactly what the public endpoint would return. Multi-query views spawn one task per
//! query and fail as a whole if any task fails; siblings are left to finish and their results
//! are dropped.

use std::{collections::HashMap, fmt};

use serde::Serialize;

use odg_domain::{
	CountShare, DatasetSummary, Query, SearchResult, SortOrder, TermTotal,
	aggregate::{self, DEFAULT_FORMAT_LIMIT, DEFAULT_TAG_LIMIT, DEFAULT_TIMELINE_WINDOW},
	query::{PARAM_PAGE, PARAM_PAGE_SIZE, PARAM_SORT, PARAM_TEXT, parse_query},
};

use crate::{Error, GatewayService, Result};

const RECENT_PAGE_SIZE: u32 = 100;
const HEALTH_PAGE_SIZE: u32 = 50;
const TOPIC_PAGE_SIZE: u32 = 50;
const TOPIC_FORMAT_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewName {
	FormatDistribution,
	TagFrequency,
	SearchComparison,
	ResourceCounts,
	UpdateTimeline,
	FormatByTopic,
}
impl ViewName {
	pub const ALL: [Self; 6] = [
		Self::FormatDistribution,
		Self::TagFrequency,
		Self::SearchComparison,
		Self::ResourceCounts,
		Self::UpdateTimeline,
		Self::FormatByTopic,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::FormatDistribution => "format-distribution",
			Self::TagFrequency => "tag-frequency",
			Self::SearchComparison => "search-comparison",
			Self::ResourceCounts => "resource-counts",
			Self::UpdateTimeline => "update-timeline",
			Self::FormatByTopic => "format-by-topic",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|name| name.as_str() == raw)
	}
}
impl fmt::Display for ViewName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single-query view reduced to one count series.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
	pub view: ViewName,
	pub query: Query,
	/// Number of datasets the series was computed from.
	pub datasets: usize,
	pub series: Vec<CountShare>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
	pub view: ViewName,
	pub terms: Vec<TermTotal>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicFormats {
	pub topic: String,
	pub total_resources: usize,
	pub formats: Vec<CountShare>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
	pub view: ViewName,
	pub topics: Vec<TopicFormats>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ViewReport {
	Series(SeriesView),
	Comparison(ComparisonView),
	Topics(TopicView),
}

impl GatewayService {
	pub async fn view(&self, name: ViewName) -> Result<ViewReport> {
		tracing::debug!(view = %name, "Building view.");

		let report = match name {
			ViewName::FormatDistribution => ViewReport::Series(
				self.series_view(name, recent_params(), |datasets| {
					aggregate::format_counts(datasets, DEFAULT_FORMAT_LIMIT)
				})
				.await?,
			),
			ViewName::TagFrequency => ViewReport::Series(
				self.series_view(name, recent_params(), |datasets| {
					aggregate::tag_frequency(datasets, DEFAULT_TAG_LIMIT)
				})
				.await?,
			),
			ViewName::ResourceCounts => ViewReport::Series(
				self.series_view(
					name,
					search_params("health", HEALTH_PAGE_SIZE, SortOrder::Recent),
					aggregate::resource_buckets,
				)
				.await?,
			),
			ViewName::UpdateTimeline => ViewReport::Series(
				self.series_view(name, recent_params(), |datasets| {
					aggregate::update_timeline(datasets, DEFAULT_TIMELINE_WINDOW)
				})
				.await?,
			),
			ViewName::SearchComparison => ViewReport::Comparison(self.search_comparison().await?),
			ViewName::FormatByTopic => ViewReport::Topics(self.format_by_topic().await?),
		};

		Ok(report)
	}

	async fn series_view<F>(
		&self,
		name: ViewName,
		params: HashMap<String, String>,
		reduce: F,
	) -> Result<SeriesView>
	where
		F: FnOnce(&[DatasetSummary]) -> Vec<CountShare>,
	{
		let query = parse_query(&params)?;
		let result = self.search_query(&query).await?;

		Ok(SeriesView {
			view: name,
			query,
			datasets: result.datasets.len(),
			series: reduce(&result.datasets),
		})
	}

	async fn search_comparison(&self) -> Result<ComparisonView> {
		let queries = self
			.cfg
			.views
			.comparison_terms
			.iter()
			.map(|term| (term.clone(), search_params(term, 1, SortOrder::Relevance)))
			.collect();
		let totals: Vec<_> = self
			.fan_out(queries)
			.await?
			.into_iter()
			.map(|(term, result)| (term, result.total))
			.collect();

		Ok(ComparisonView { view: ViewName::SearchComparison, terms: aggregate::compare_totals(&totals) })
	}

	async fn format_by_topic(&self) -> Result<TopicView> {
		let queries = self
			.cfg
			.views
			.topics
			.iter()
			.map(|topic| (topic.clone(), search_params(topic, TOPIC_PAGE_SIZE, SortOrder::Relevance)))
			.collect();
		let topics = self
			.fan_out(queries)
			.await?
			.into_iter()
			.map(|(topic, result)| TopicFormats {
				topic,
				total_resources: result.datasets.iter().map(|dataset| dataset.resources.len()).sum(),
				formats: aggregate::format_counts(&result.datasets, TOPIC_FORMAT_LIMIT),
			})
			.collect();

		Ok(TopicView { view: ViewName::FormatByTopic, topics })
	}

	/// Runs every search as its own task and waits for all of them, preserving input order.
	async fn fan_out(
		&self,
		queries: Vec<(String, HashMap<String, String>)>,
	) -> Result<Vec<(String, SearchResult)>> {
		let handles: Vec<_> = queries
			.into_iter()
			.map(|(label, params)| {
				let service = self.clone();

				tokio::spawn(async move { service.search(&params).await.map(|result| (label, result)) })
			})
			.collect();
		let mut results = Vec::with_capacity(handles.len());

		for handle in handles {
			let joined = handle.await.map_err(|err| Error::Task { message: err.to_string() })?;

			results.push(joined?);
		}

		Ok(results)
	}
}

fn recent_params() -> HashMap<String, String> {
	search_params("", RECENT_PAGE_SIZE, SortOrder::Recent)
}

fn search_params(text: &str, page_size: u32, sort: SortOrder) -> HashMap<String, String> {
	HashMap::from([
		(PARAM_TEXT.to_string(), text.to_string()),
		(PARAM_PAGE.to_string(), "1".to_string()),
		(PARAM_PAGE_SIZE.to_string(), page_size.to_string()),
		(PARAM_SORT.to_string(), sort.as_str().to_string()),
	])
}
