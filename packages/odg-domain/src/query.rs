use std::{
	collections::{BTreeMap, HashMap},
	fmt,
};

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page the upstream catalog is asked for in a single call.
pub const MAX_PAGE_SIZE: u32 = 100;

pub const PARAM_TEXT: &str = "q";
pub const PARAM_PAGE: &str = "page";
pub const PARAM_PAGE_SIZE: &str = "pageSize";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_TAG: &str = "tag";
pub const PARAM_FORMAT: &str = "format";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	#[default]
	Recent,
	Relevance,
	Title,
}
impl SortOrder {
	pub const ALL: [Self; 3] = [Self::Recent, Self::Relevance, Self::Title];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Recent => "recent",
			Self::Relevance => "relevance",
			Self::Title => "title",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|order| order.as_str() == raw)
	}
}
impl fmt::Display for SortOrder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A validated search request.
///
/// `page` is always at least 1 and `page_size` always within `1..=MAX_PAGE_SIZE`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
	pub text: String,
	pub page: u32,
	pub page_size: u32,
	pub sort: SortOrder,
	pub tag: Option<String>,
	pub format: Option<String>,
}
impl Default for Query {
	fn default() -> Self {
		Self {
			text: String::new(),
			page: DEFAULT_PAGE,
			page_size: DEFAULT_PAGE_SIZE,
			sort: SortOrder::default(),
			tag: None,
			format: None,
		}
	}
}

/// Every offending parameter, keyed by its wire name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("Invalid query parameters ({} field(s) rejected).", .field_errors.len())]
pub struct ValidationError {
	pub form_errors: Vec<String>,
	pub field_errors: BTreeMap<String, Vec<String>>,
}
impl ValidationError {
	pub fn field_names(&self) -> Vec<&str> {
		self.field_errors.keys().map(String::as_str).collect()
	}

	pub fn is_empty(&self) -> bool {
		self.form_errors.is_empty() && self.field_errors.is_empty()
	}

	fn push(&mut self, field: &str, message: String) {
		self.field_errors.entry(field.to_string()).or_default().push(message);
	}
}

/// Parses raw query-string parameters into a [`Query`].
///
/// Keys that are absent fall back to their defaults. Anything present but malformed is reported;
/// values are never clamped into range.
pub fn parse_query(params: &HashMap<String, String>) -> Result<Query, ValidationError> {
	let mut errors = ValidationError::default();
	let get = |key: &str| params.get(key).map(String::as_str);
	let text = get(PARAM_TEXT).map(str::trim).unwrap_or_default().to_string();
	let page = parse_bounded(get(PARAM_PAGE), DEFAULT_PAGE, 1, None)
		.map_err(|message| errors.push(PARAM_PAGE, message))
		.ok();
	let page_size = parse_bounded(get(PARAM_PAGE_SIZE), DEFAULT_PAGE_SIZE, 1, Some(MAX_PAGE_SIZE))
		.map_err(|message| errors.push(PARAM_PAGE_SIZE, message))
		.ok();
	let sort = match get(PARAM_SORT) {
		None => Some(SortOrder::default()),
		Some(raw) => {
			let parsed = SortOrder::parse(raw.trim());

			if parsed.is_none() {
				errors.push(
					PARAM_SORT,
					format!("Expected one of recent, relevance, title, received \"{raw}\"."),
				);
			}

			parsed
		},
	};

	match (page, page_size, sort) {
		(Some(page), Some(page_size), Some(sort)) if errors.is_empty() => Ok(Query {
			text,
			page,
			page_size,
			sort,
			tag: optional_text(get(PARAM_TAG)),
			format: optional_text(get(PARAM_FORMAT)),
		}),
		_ => Err(errors),
	}
}

fn parse_bounded(raw: Option<&str>, default: u32, min: u32, max: Option<u32>) -> Result<u32, String> {
	let Some(raw) = raw else {
		return Ok(default);
	};
	let value: i64 = raw
		.trim()
		.parse()
		.map_err(|_| format!("Expected an integer, received \"{raw}\"."))?;

	if value < i64::from(min) {
		return Err(format!("Number must be greater than or equal to {min}."));
	}
	if let Some(max) = max
		&& value > i64::from(max)
	{
		return Err(format!("Number must be less than or equal to {max}."));
	}

	u32::try_from(value).map_err(|_| format!("Number must be less than or equal to {}.", u32::MAX))
}

fn optional_text(raw: Option<&str>) -> Option<String> {
	raw.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
