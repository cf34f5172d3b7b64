pub mod feedback;
pub mod generate;
pub mod history;
pub mod ranking;
pub mod similarity;

mod error;

pub use error::{Error, Result};
pub use generate::{GenerateRequest, GenerateResponse};
pub use history::{HistoryRecord, HistoryRequest, HistoryResponse};
pub use ranking::{StrategyScore, TopStrategiesResponse};
pub use similarity::SimilarMatch;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use pwe_config::{Config, GeneratorMode, LlmProviderConfig};
use pwe_providers::{GenerationContext, completion, rule_based};
use pwe_storage::RecordStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Produces strategy text for a prompt.
pub trait StrategyGenerator
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		prompt: &'a str,
		context: &'a GenerationContext,
	) -> BoxFuture<'a, pwe_providers::Result<String>>;
}

pub struct ModelGenerator {
	cfg: LlmProviderConfig,
	timeout: Duration,
}
impl ModelGenerator {
	pub fn new(cfg: LlmProviderConfig, timeout: Duration) -> Self {
		Self { cfg, timeout }
	}
}

impl StrategyGenerator for ModelGenerator {
	fn generate<'a>(
		&'a self,
		prompt: &'a str,
		context: &'a GenerationContext,
	) -> BoxFuture<'a, pwe_providers::Result<String>> {
		Box::pin(completion::complete(&self.cfg, self.timeout, prompt, context))
	}
}

pub struct RuleBasedGenerator;

impl StrategyGenerator for RuleBasedGenerator {
	fn generate<'a>(
		&'a self,
		prompt: &'a str,
		context: &'a GenerationContext,
	) -> BoxFuture<'a, pwe_providers::Result<String>> {
		let text = rule_based::generate(prompt, context);

		Box::pin(async move { Ok(text) })
	}
}

pub struct PweService {
	pub cfg: Config,
	pub store: Arc<dyn RecordStore>,
	pub generator: Arc<dyn StrategyGenerator>,
}
impl PweService {
	/// Builds the service with the generator selected by `generator.mode`.
	pub fn new(cfg: Config, store: Arc<dyn RecordStore>) -> Result<Self> {
		let generator: Arc<dyn StrategyGenerator> = match cfg.generator.mode {
			GeneratorMode::Model => {
				let Some(model) = cfg.generator.model.clone() else {
					return Err(Error::Config {
						message: "generator.model is required when generator.mode is model."
							.to_string(),
					});
				};

				Arc::new(ModelGenerator::new(
					model,
					Duration::from_millis(cfg.generator.timeout_ms),
				))
			},
			GeneratorMode::RuleBased => Arc::new(RuleBasedGenerator),
		};

		Ok(Self::with_generator(cfg, store, generator))
	}

	pub fn with_generator(
		cfg: Config,
		store: Arc<dyn RecordStore>,
		generator: Arc<dyn StrategyGenerator>,
	) -> Self {
		Self { cfg, store, generator }
	}

	pub fn generator_label(&self) -> &'static str {
		self.cfg.generator.mode.as_str()
	}
}
