use odg_domain::{SchemaError, ValidationError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error(transparent)]
	Schema(#[from] SchemaError),
	#[error("Upstream transport failed: {message}")]
	Transport { message: String },
	#[error("View task failed: {message}")]
	Task { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
}
impl From<odg_providers::Error> for Error {
	fn from(err: odg_providers::Error) -> Self {
		match err {
			odg_providers::Error::InvalidConfig { message } => Self::InvalidConfig { message },
			other @ (odg_providers::Error::InvalidHeaderName(_)
			| odg_providers::Error::InvalidHeaderValue(_)) =>
				Self::InvalidConfig { message: other.to_string() },
			other => Self::Transport { message: other.to_string() },
		}
	}
}
