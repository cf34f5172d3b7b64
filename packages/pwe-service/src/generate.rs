use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use pwe_config::GeneratorMode;
use pwe_domain::{category, insights, prompt};
use pwe_providers::{GenerationContext, PriorStrategy, rule_based};
use pwe_storage::models::NewRecord;

use crate::{Error, PweService, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
	pub prompt: String,
	#[serde(default)]
	pub user_id: Option<String>,
	#[serde(default)]
	pub context: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
	pub record_id: String,
	pub response_text: String,
	pub category: String,
	pub matched_similar: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub similarity: Option<f64>,
	pub suggested_actions: Vec<String>,
	pub estimated_earnings: String,
	pub confidence: f64,
}

impl PweService {
	pub async fn handle_request(&self, req: GenerateRequest) -> Result<GenerateResponse> {
		let raw_prompt = req.prompt.trim();

		if raw_prompt.is_empty() {
			return Err(Error::invalid_input("prompt must be non-empty."));
		}

		let max_chars = self.cfg.service.max_prompt_chars as usize;

		if raw_prompt.chars().count() > max_chars {
			return Err(Error::invalid_input(format!(
				"prompt must be at most {max_chars} characters."
			)));
		}

		let user_id = req.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
		let similar = self.find_similar(raw_prompt, user_id).await?;
		let context = GenerationContext {
			request: req.context.clone(),
			similar: similar.as_ref().map(|found| PriorStrategy {
				prompt: found.record.raw_prompt.clone(),
				response_text: found.record.response_text.clone(),
				success_score: found.record.success_score,
				earnings: found.record.earnings,
				similarity: found.score,
			}),
		};
		let (response_text, generated) = self.generate_text(raw_prompt, &context).await;
		let category = category::classify(raw_prompt, &response_text);
		let record = self
			.store
			.insert(NewRecord {
				user_id: user_id.map(str::to_string),
				raw_prompt: raw_prompt.to_string(),
				normalized_prompt: prompt::normalize_prompt(raw_prompt),
				response_text,
				category: category.to_string(),
				created_at: OffsetDateTime::now_utc(),
			})
			.await?;

		tracing::info!(
			record_id = record.id,
			category = %record.category,
			matched_similar = similar.is_some(),
			fallback = !generated,
			"Strategy generated."
		);

		let model_text = generated && self.cfg.generator.mode == GeneratorMode::Model;

		Ok(GenerateResponse {
			record_id: record.id.to_string(),
			suggested_actions: insights::extract_suggested_actions(&record.response_text),
			estimated_earnings: insights::estimate_earnings(&record.raw_prompt),
			response_text: record.response_text,
			category: record.category,
			matched_similar: similar.is_some(),
			confidence: insights::confidence(model_text, similar.is_some()),
			similarity: similar.map(|found| found.score),
		})
	}

	/// Runs the configured generator under `generator.timeout_ms`, substituting the rule-based
	/// text on error, timeout, or empty output. The flag is false when the fallback was used.
	async fn generate_text(&self, prompt: &str, context: &GenerationContext) -> (String, bool) {
		let timeout_ms = self.cfg.generator.timeout_ms;
		let generated = tokio::time::timeout(
			Duration::from_millis(timeout_ms),
			self.generator.generate(prompt, context),
		)
		.await;

		match generated {
			Ok(Ok(text)) if !text.trim().is_empty() => return (text, true),
			Ok(Ok(_)) => {
				tracing::warn!("Generator returned empty text. Using rule-based fallback.");
			},
			Ok(Err(err)) => {
				tracing::warn!(error = %err, "Generator failed. Using rule-based fallback.");
			},
			Err(_) => {
				tracing::warn!(timeout_ms, "Generator timed out. Using rule-based fallback.");
			},
		}

		(rule_based::generate(prompt, context), false)
	}
}
