//! Offline bar charts from a saved `/api/datasets` response.

use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use serde::Deserialize;

use odg_domain::{CountShare, DatasetSummary, aggregate};

const BAR_WIDTH: u64 = 460;
const ROW_HEIGHT: usize = 32;
const MIN_CHART_HEIGHT: usize = 340;

#[derive(Debug, Parser)]
#[command(
	version = odg_cli::VERSION,
	rename_all = "kebab",
	styles = odg_cli::styles(),
)]
pub struct Args {
	/// Saved search response.
	#[arg(value_name = "INPUT.json")]
	pub input: PathBuf,
	#[arg(long, value_enum, default_value_t = ChartView::Formats)]
	pub view: ChartView,
	/// Number of bars; defaults depend on the view.
	#[arg(long, value_name = "N")]
	pub limit: Option<usize>,
	/// Defaults to `<input stem>-viz.html` next to the input.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
	#[arg(long, value_name = "LEVEL", default_value = "warn")]
	pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChartView {
	Formats,
	Tags,
	Resources,
	Timeline,
}
impl ChartView {
	fn default_limit(self) -> usize {
		match self {
			Self::Formats | Self::Timeline => 8,
			Self::Tags => aggregate::DEFAULT_TAG_LIMIT,
			Self::Resources => aggregate::RESOURCE_BUCKETS.len(),
		}
	}

	fn title(self) -> &'static str {
		match self {
			Self::Formats => "Resource format distribution",
			Self::Tags => "Tag frequency",
			Self::Resources => "Resources per dataset",
			Self::Timeline => "Datasets updated per month",
		}
	}

	/// Series for `datasets`; `limit` is ignored by the fixed resource buckets.
	pub fn series(self, datasets: &[DatasetSummary], limit: Option<usize>) -> Vec<CountShare> {
		let limit = limit.unwrap_or_else(|| self.default_limit());

		match self {
			Self::Formats => aggregate::format_counts(datasets, limit),
			Self::Tags => aggregate::tag_frequency(datasets, limit),
			Self::Resources => aggregate::resource_buckets(datasets),
			Self::Timeline => aggregate::update_timeline(datasets, limit),
		}
	}
}

#[derive(Debug, Deserialize)]
struct SavedResponse {
	#[serde(default)]
	datasets: Vec<DatasetSummary>,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	odg_cli::init_tracing(&args.log_level);

	let datasets = load_datasets(&args.input)?;
	let series = args.view.series(&datasets, args.limit);

	tracing::debug!(datasets = datasets.len(), bars = series.len(), "Computed chart series.");

	let label =
		args.input.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
	let html = render(args.view, &label, &series);
	let output = args.output.unwrap_or_else(|| output_path(&args.input));

	fs::write(&output, html).wrap_err_with(|| format!("Failed to write {}.", output.display()))?;

	println!("Wrote {}", output.display());

	Ok(())
}

/// Datasets of a saved response. A missing `datasets` array reads as empty.
pub fn load_datasets(path: &Path) -> color_eyre::Result<Vec<DatasetSummary>> {
	let raw =
		fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}.", path.display()))?;
	let saved: SavedResponse = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("{} is not a saved search response.", path.display()))?;

	Ok(saved.datasets)
}

/// `data/run.json` becomes `data/run-viz.html`. Other extensions are kept in the name.
pub fn output_path(input: &Path) -> PathBuf {
	let is_json =
		input.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
	let base = if is_json { input.file_stem() } else { input.file_name() };
	let base = base.map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();

	input.with_file_name(format!("{base}-viz.html"))
}

/// Standalone HTML page with one gradient bar per entry, scaled against the largest count.
pub fn render(view: ChartView, input_label: &str, series: &[CountShare]) -> String {
	let max = series.iter().map(|entry| entry.count).max().unwrap_or(0).max(1);
	let height = (60 + series.len() * ROW_HEIGHT).max(MIN_CHART_HEIGHT);
	let title = view.title();
	let mut bars = String::new();

	for (index, entry) in series.iter().enumerate() {
		let width = bar_width(entry.count, max);
		let y = 40 + index * ROW_HEIGHT;

		bars.push_str(&format!(
			"<g transform=\"translate(20, {y})\"><g><text x=\"0\" y=\"0\" fill=\"#d8f9ff\" font-size=\"13\">{} ({})</text><rect x=\"170\" y=\"-12\" width=\"{width}\" height=\"14\" rx=\"7\" fill=\"url(#bar)\" /></g></g>\n",
			escape_html(&entry.label),
			entry.count,
		));
	}

	format!(
		r##"<!doctype html>
<html>
  <body style="margin:0;font-family:Inter,Arial,sans-serif;background:#07040f;color:#d8f9ff;">
    <main style="max-width:760px;margin:0 auto;padding:24px;">
      <h1 style="color:#ff66e8;">{title}</h1>
      <p>Input: {input}</p>
      <svg width="700" height="{height}" role="img" aria-label="{title} bar chart">
        <defs>
          <linearGradient id="bar" x1="0" y1="0" x2="1" y2="0">
            <stop offset="0%" stop-color="#7df9ff"/>
            <stop offset="100%" stop-color="#ff66e8"/>
          </linearGradient>
        </defs>
{bars}      </svg>
    </main>
  </body>
</html>
"##,
		input = escape_html(input_label),
	)
}

pub fn escape_html(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());

	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}

	escaped
}

fn bar_width(count: u64, max: u64) -> u64 {
	(count as f64 / max as f64 * BAR_WIDTH as f64).round() as u64
}
