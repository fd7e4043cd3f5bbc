mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Cache, Config, DEFAULT_UPSTREAM_PATH, Service, Upstream, Views};

use std::{fs, net::SocketAddr, path::Path};

use url::Url;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.parse::<SocketAddr>().is_err() {
		return Err(Error::Validation {
			message: "service.http_bind must be a socket address.".to_string(),
		});
	}
	if cfg.upstream.organization.trim().is_empty() {
		return Err(Error::Validation {
			message: "upstream.organization must be non-empty.".to_string(),
		});
	}
	if !cfg.upstream.path.starts_with('/') {
		return Err(Error::Validation {
			message: "upstream.path must start with '/'.".to_string(),
		});
	}

	match Url::parse(&cfg.upstream.endpoint()) {
		Ok(url) if matches!(url.scheme(), "http" | "https") => {},
		_ => {
			return Err(Error::Validation {
				message: "upstream.api_base must be an absolute http(s) URL.".to_string(),
			});
		},
	}

	if cfg.upstream.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "upstream.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.upstream.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("upstream.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.cache.max_age_secs == 0 {
		return Err(Error::Validation {
			message: "cache.max_age_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.stale_while_revalidate_secs < cfg.cache.max_age_secs {
		return Err(Error::Validation {
			message: "cache.stale_while_revalidate_secs must be at least cache.max_age_secs."
				.to_string(),
		});
	}

	for (label, values) in
		[("views.comparison_terms", &cfg.views.comparison_terms), ("views.topics", &cfg.views.topics)]
	{
		if values.is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
		if values.iter().any(|value| value.trim().is_empty()) {
			return Err(Error::Validation {
				message: format!("{label} entries must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.upstream.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.upstream.api_key = None;
	}

	cfg.upstream.organization = cfg.upstream.organization.trim().to_string();
}
