pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised while calling the completion provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Completion request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("Invalid provider header name: {0}")]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error("Invalid provider header value: {0}")]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },

	#[error("Malformed completion: {message}")]
	InvalidResponse { message: String },
}
