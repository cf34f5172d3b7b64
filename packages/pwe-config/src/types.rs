use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub generator: Generator,
	#[serde(default)]
	pub similarity: Similarity,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub history: History,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_max_prompt_chars")]
	pub max_prompt_chars: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub postgres: Option<Postgres>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	Postgres,
	Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	#[serde(default = "default_acquire_timeout_ms")]
	pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Generator {
	pub mode: GeneratorMode,
	pub timeout_ms: u64,
	pub model: Option<LlmProviderConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorMode {
	/// Chat-completions call against an OpenAI-compatible endpoint.
	Model,
	/// Deterministic keyword templates; never fails.
	RuleBased,
}
impl GeneratorMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Model => "model",
			Self::RuleBased => "rule_based",
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Similarity {
	/// Minimum Jaccard overlap for two prompts to count as the same request.
	pub threshold: f64,
}
impl Default for Similarity {
	fn default() -> Self {
		Self { threshold: 0.6 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub success_weight: f64,
	pub earnings_weight: f64,
	pub recency_weight: f64,
	pub recency_half_life_days: f64,
	pub top_n: u32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			success_weight: 0.6,
			earnings_weight: 0.3,
			recency_weight: 0.1,
			recency_half_life_days: 7.0,
			top_n: 3,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct History {
	pub default_limit: u32,
	pub max_limit: u32,
}
impl Default for History {
	fn default() -> Self {
		Self { default_limit: 50, max_limit: 200 }
	}
}

fn default_max_prompt_chars() -> u32 {
	4_000
}

fn default_acquire_timeout_ms() -> u64 {
	5_000
}

fn default_max_tokens() -> u32 {
	600
}
