use serde::{Deserialize, Serialize};
use url::Url;

use crate::label;

pub const UNTITLED_RESOURCE: &str = "Untitled resource";

/// The upstream body did not match the `package_search` contract.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Upstream payload does not match the expected schema: {message}")]
pub struct SchemaError {
	pub message: String,
	/// Raw body as received, kept for diagnostics.
	pub body: String,
}
impl SchemaError {
	fn new(message: impl Into<String>, body: &str) -> Self {
		Self { message: message.into(), body: body.to_string() }
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub last_updated: Option<String>,
	/// Upstream order, duplicates included.
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
	pub id: String,
	pub name: String,
	/// As published; see [`Resource::normalized_format`] for the aggregation key.
	#[serde(default)]
	pub format: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
}
impl Resource {
	pub fn normalized_format(&self) -> String {
		label::normalize_format(self.format.as_deref())
	}
}

/// One validated page of upstream results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamPage {
	/// Match count reported by upstream, not the length of `datasets`.
	pub total: u64,
	pub datasets: Vec<DatasetSummary>,
}

#[derive(Deserialize)]
struct Envelope {
	success: bool,
	result: EnvelopeResult,
}

#[derive(Deserialize)]
struct EnvelopeResult {
	count: u64,
	results: Vec<Package>,
}

#[derive(Deserialize)]
struct Package {
	id: String,
	title: String,
	#[serde(default)]
	notes: Option<String>,
	#[serde(default)]
	metadata_modified: Option<String>,
	#[serde(default)]
	tags: Vec<Tag>,
	#[serde(default)]
	resources: Vec<PackageResource>,
}

#[derive(Deserialize)]
struct Tag {
	name: String,
}

#[derive(Deserialize)]
struct PackageResource {
	id: String,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	format: Option<String>,
	#[serde(default)]
	url: Option<String>,
}

/// Validates a raw `package_search` body and maps it onto [`DatasetSummary`] records.
///
/// Any structural mismatch rejects the whole page. `metadata_modified` is passed through
/// untouched; date parsing is left to consumers.
pub fn parse_upstream(body: &str) -> Result<UpstreamPage, SchemaError> {
	let envelope: Envelope =
		serde_json::from_str(body).map_err(|err| SchemaError::new(err.to_string(), body))?;

	if !envelope.success {
		return Err(SchemaError::new("success must be true.", body));
	}

	let mut datasets = Vec::with_capacity(envelope.result.results.len());

	for (index, package) in envelope.result.results.into_iter().enumerate() {
		datasets.push(map_package(package).map_err(|message| {
			SchemaError::new(format!("result.results[{index}]: {message}"), body)
		})?);
	}

	Ok(UpstreamPage { total: envelope.result.count, datasets })
}

fn map_package(package: Package) -> Result<DatasetSummary, String> {
	let mut resources = Vec::with_capacity(package.resources.len());

	for (index, resource) in package.resources.into_iter().enumerate() {
		if let Some(raw) = resource.url.as_deref()
			&& let Err(err) = Url::parse(raw)
		{
			return Err(format!("resources[{index}].url is not an absolute URL ({err})."));
		}

		resources.push(Resource {
			id: resource.id,
			name: resource.name.unwrap_or_else(|| UNTITLED_RESOURCE.to_string()),
			format: resource.format,
			url: resource.url,
		});
	}

	Ok(DatasetSummary {
		id: package.id,
		title: package.title,
		description: package.notes.unwrap_or_default(),
		last_updated: package.metadata_modified,
		tags: package.tags.into_iter().map(|tag| tag.name).collect(),
		resources,
	})
}
