//! Strategy text generators: an OpenAI-compatible chat-completions client and a deterministic
//! template generator.

pub mod completion;
pub mod rule_based;

mod error;

pub use error::{Error, Result};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde::Serialize;
use serde_json::{Map, Value};

/// A prior request whose prompt cleared the similarity threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorStrategy {
	pub prompt: String,
	pub response_text: String,
	pub success_score: Option<i32>,
	pub earnings: Option<f64>,
	pub similarity: f64,
}

/// Everything a generator may use besides the prompt itself.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
	/// Opaque client-supplied context, forwarded as-is.
	pub request: Option<Value>,
	pub similar: Option<PriorStrategy>,
}

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
