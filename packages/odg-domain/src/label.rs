/// Bucket used whenever a label is missing or blank.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelCase {
	Upper,
	Lower,
}

/// Folds a free-text label into its aggregation key.
///
/// Every aggregation goes through here so blank handling stays identical across views.
pub fn normalize_label(raw: Option<&str>, case: LabelCase) -> String {
	let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
		return UNKNOWN_LABEL.to_string();
	};

	match case {
		LabelCase::Upper => trimmed.to_uppercase(),
		LabelCase::Lower => trimmed.to_lowercase(),
	}
}

pub fn normalize_format(raw: Option<&str>) -> String {
	normalize_label(raw, LabelCase::Upper)
}

pub fn normalize_tag(raw: &str) -> String {
	normalize_label(Some(raw), LabelCase::Lower)
}
