pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Store unavailable: {message}")]
	StoreUnavailable { message: String },
	#[error("Invalid configuration: {message}")]
	Config { message: String },
}
impl Error {
	pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
		Self::InvalidInput { message: message.into() }
	}
}

impl From<pwe_storage::Error> for Error {
	fn from(err: pwe_storage::Error) -> Self {
		match err {
			pwe_storage::Error::NotFound(message) => Self::NotFound { message },
			other => {
				tracing::error!(error = %other, "Record store operation failed.");

				Self::StoreUnavailable { message: other.to_string() }
			},
		}
	}
}
