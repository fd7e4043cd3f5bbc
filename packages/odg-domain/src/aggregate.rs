//! Count and percent series computed over a batch of [`DatasetSummary`] records.
//!
//! Each helper has its own percent base and the differences are observable:
//!
//! - [`format_counts`]: share of the displayed (truncated) total.
//! - [`tag_frequency`], [`update_timeline`], [`compare_totals`]: relative to the largest entry.
//! - [`resource_buckets`]: share of all datasets.
//! - [`normalize_metrics`]: relative to the largest value, two decimals.
//! - [`service_mix`]: share of the summed claims, two decimals.
//!
//! A zero denominator always yields a percent of 0.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::{
	Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
	format_description::well_known::{Iso8601, Rfc3339},
	macros::format_description,
};

use crate::{label, normalize::DatasetSummary};

pub const DEFAULT_FORMAT_LIMIT: usize = 6;
pub const DEFAULT_TAG_LIMIT: usize = 10;
pub const DEFAULT_TIMELINE_WINDOW: usize = 8;

pub const RESOURCE_BUCKETS: [(&str, usize); 5] = [
	("1 resource", 1),
	("2-3 resources", 3),
	("4-6 resources", 6),
	("7-10 resources", 10),
	("11+ resources", usize::MAX),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountShare {
	pub label: String,
	pub count: u64,
	pub percent: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
	pub label: String,
	pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricShare {
	pub label: String,
	pub value: f64,
	pub percent: f64,
}

/// Claim counts reported by one state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateClaims {
	pub state: String,
	pub total_claims: u64,
	pub autism_claims: u64,
	pub members: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClaims {
	pub category: String,
	pub claims: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearClaims {
	pub year: i32,
	pub claims: u64,
	pub spending_millions: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermTotal {
	pub term: String,
	pub total: u64,
	pub percent: u32,
}

/// Top resource formats, upper-cased, blank formats counted as `UNKNOWN`.
pub fn format_counts(datasets: &[DatasetSummary], limit: usize) -> Vec<CountShare> {
	let labels = datasets
		.iter()
		.flat_map(|dataset| dataset.resources.iter())
		.map(|resource| resource.normalized_format());
	let top = ranked(labels, limit);
	let displayed: u64 = top.iter().map(|(_, count)| count).sum();

	top.into_iter()
		.map(|(label, count)| CountShare { label, count, percent: percent_of(count, displayed) })
		.collect()
}

/// Most common tags, lower-cased. The first entry is always 100%.
pub fn tag_frequency(datasets: &[DatasetSummary], limit: usize) -> Vec<CountShare> {
	let labels = datasets
		.iter()
		.flat_map(|dataset| dataset.tags.iter())
		.map(|tag| label::normalize_tag(tag));

	relative_to_max(ranked(labels, limit))
}

/// Datasets grouped by resource count. All five buckets are always present.
pub fn resource_buckets(datasets: &[DatasetSummary]) -> Vec<CountShare> {
	let mut counts = [0_u64; RESOURCE_BUCKETS.len()];

	for dataset in datasets {
		let n = dataset.resources.len();
		let slot = RESOURCE_BUCKETS.iter().position(|(_, upper)| n <= *upper).unwrap_or(0);

		counts[slot] += 1;
	}

	let total = datasets.len() as u64;

	RESOURCE_BUCKETS
		.iter()
		.zip(counts)
		.map(|((label, _), count)| CountShare {
			label: (*label).to_string(),
			count,
			percent: percent_of(count, total),
		})
		.collect()
}

/// Datasets per `YYYY-MM` of `last_updated`, newest `window` periods first.
///
/// Records without a parseable date are skipped entirely.
pub fn update_timeline(datasets: &[DatasetSummary], window: usize) -> Vec<CountShare> {
	let mut periods: HashMap<String, u64> = HashMap::new();

	for raw in datasets.iter().filter_map(|dataset| dataset.last_updated.as_deref()) {
		let Some(date) = parse_update_date(raw) else {
			continue;
		};

		*periods.entry(format!("{:04}-{:02}", date.year(), u8::from(date.month()))).or_default() +=
			1;
	}

	let mut sorted: Vec<_> = periods.into_iter().collect();

	sorted.sort_by(|a, b| b.0.cmp(&a.0));
	sorted.truncate(window);

	relative_to_max(sorted)
}

/// Percent of the largest value, rounded to two decimals.
pub fn normalize_metrics(metrics: &[Metric]) -> Vec<MetricShare> {
	let max = metrics
		.iter()
		.map(|metric| metric.value)
		.filter(|value| value.is_finite())
		.fold(0.0_f64, f64::max);

	metrics
		.iter()
		.map(|metric| MetricShare {
			label: metric.label.clone(),
			value: metric.value,
			percent: two_decimal_percent(metric.value, max),
		})
		.collect()
}

/// Autism claims as a percent of all claims per state, highest share first.
pub fn claims_share_by_state(rows: &[StateClaims]) -> Vec<MetricShare> {
	let metrics = rows
		.iter()
		.map(|row| Metric {
			label: row.state.clone(),
			value: round_to_hundredths(ratio(row.autism_claims, row.total_claims) * 100.0),
		})
		.collect();

	normalize_metrics(&sorted_desc(metrics))
}

/// Autism claims per 10,000 members, rounded to whole claims, highest rate first.
pub fn claims_per_10k_members(rows: &[StateClaims]) -> Vec<MetricShare> {
	let metrics = rows
		.iter()
		.map(|row| Metric {
			label: row.state.clone(),
			value: (ratio(row.autism_claims, row.members) * 10_000.0).round(),
		})
		.collect();

	normalize_metrics(&sorted_desc(metrics))
}

/// Claims per service category as a share of all claims. Input order is kept.
pub fn service_mix(rows: &[ServiceClaims]) -> Vec<MetricShare> {
	let total: u64 = rows.iter().map(|row| row.claims).sum();

	rows.iter()
		.map(|row| MetricShare {
			label: row.category.clone(),
			value: row.claims as f64,
			percent: two_decimal_percent(row.claims as f64, total as f64),
		})
		.collect()
}

/// Claims per year in calendar order, relative to the busiest year.
pub fn yearly_trend(rows: &[YearClaims]) -> Vec<MetricShare> {
	let mut rows: Vec<_> = rows.iter().collect();

	rows.sort_by_key(|row| row.year);

	let metrics: Vec<_> = rows
		.into_iter()
		.map(|row| Metric { label: row.year.to_string(), value: row.claims as f64 })
		.collect();

	normalize_metrics(&metrics)
}

/// Match totals per search term, largest first. Ties keep their input order.
pub fn compare_totals(totals: &[(String, u64)]) -> Vec<TermTotal> {
	let max = totals.iter().map(|(_, total)| *total).max().unwrap_or(0);
	let mut compared: Vec<_> = totals
		.iter()
		.map(|(term, total)| TermTotal {
			term: term.clone(),
			total: *total,
			percent: percent_of(*total, max),
		})
		.collect();

	compared.sort_by(|a, b| b.total.cmp(&a.total));

	compared
}

/// Calendar date of a `last_updated` value.
///
/// Accepts RFC 3339 (normalized to UTC), offset-less ISO 8601 date-times and bare dates.
pub fn parse_update_date(raw: &str) -> Option<Date> {
	let raw = raw.trim();

	if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(value.to_offset(UtcOffset::UTC).date());
	}
	if let Ok(value) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
		return Some(value.date());
	}

	Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}

fn ranked(labels: impl Iterator<Item = String>, limit: usize) -> Vec<(String, u64)> {
	let mut counts: HashMap<String, u64> = HashMap::new();

	for label in labels {
		*counts.entry(label).or_default() += 1;
	}

	let mut sorted: Vec<_> = counts.into_iter().collect();

	sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	sorted.truncate(limit);

	sorted
}

fn relative_to_max(entries: Vec<(String, u64)>) -> Vec<CountShare> {
	let max = entries.iter().map(|(_, count)| *count).max().unwrap_or(0);

	entries
		.into_iter()
		.map(|(label, count)| CountShare { label, count, percent: percent_of(count, max) })
		.collect()
}

fn sorted_desc(mut metrics: Vec<Metric>) -> Vec<Metric> {
	metrics.sort_by(|a, b| b.value.total_cmp(&a.value));

	metrics
}

fn ratio(part: u64, whole: u64) -> f64 {
	if whole == 0 {
		return 0.0;
	}

	part as f64 / whole as f64
}

fn two_decimal_percent(value: f64, base: f64) -> f64 {
	if base > 0.0 && base.is_finite() && value.is_finite() {
		round_to_hundredths(value / base * 100.0)
	} else {
		0.0
	}
}

fn round_to_hundredths(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

fn percent_of(count: u64, denominator: u64) -> u32 {
	if denominator == 0 {
		return 0;
	}

	(count as f64 / denominator as f64 * 100.0).round() as u32
}
