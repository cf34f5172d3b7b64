use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, GenerationContext, Result};

const SYSTEM_PROMPT: &str = "\
You are an expert financial strategist and entrepreneur. Provide a detailed, actionable \
money-making strategy for the user's request.

Consider these factors:
1. Timeline and realistic expectations
2. Required skills and resources
3. Step-by-step action plan
4. Potential earnings and ROI
5. Risk assessment and mitigation
6. Scalability options

Format the action plan as a numbered list.";

/// Calls an OpenAI-compatible chat-completions endpoint and returns the first choice's text.
pub async fn complete(
	cfg: &pwe_config::LlmProviderConfig,
	timeout: Duration,
	prompt: &str,
	context: &GenerationContext,
) -> Result<String> {
	let client = Client::builder().timeout(timeout).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": build_messages(prompt, context),
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(&json)
}

pub fn build_messages(prompt: &str, context: &GenerationContext) -> Vec<Value> {
	let mut messages = vec![serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT })];

	if let Some(similar) = &context.similar {
		let mut note = format!(
			"A similar earlier request (similarity {:.2}) was: \"{}\".\nThe strategy then:\n{}",
			similar.similarity, similar.prompt, similar.response_text
		);

		if let (Some(score), Some(earnings)) = (similar.success_score, similar.earnings) {
			note.push_str(&format!(
				"\nThe user rated it {score}/10 and reported ${earnings:.2} in earnings. \
				 Build on what worked."
			));
		}

		messages.push(serde_json::json!({ "role": "system", "content": note }));
	}
	if let Some(request) = context.request.as_ref().filter(|value| !value.is_null()) {
		messages.push(serde_json::json!({
			"role": "system",
			"content": format!("Additional context from the user: {request}"),
		}));
	}

	messages.push(serde_json::json!({ "role": "user", "content": prompt }));

	messages
}

fn parse_completion(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices[0].message.content.".to_string(),
		})?;
	let trimmed = content.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidResponse { message: "Completion content is empty.".to_string() });
	}

	Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::PriorStrategy;

	#[test]
	fn parses_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": "  1. Pick a niche\n" } }
			]
		});
		let parsed = parse_completion(&json).expect("parse failed");

		assert_eq!(parsed, "1. Pick a niche");
	}

	#[test]
	fn rejects_missing_or_blank_content() {
		let missing = serde_json::json!({ "choices": [] });
		let blank = serde_json::json!({ "choices": [{ "message": { "content": "   " } }] });

		assert!(matches!(parse_completion(&missing), Err(Error::InvalidResponse { .. })));
		assert!(matches!(parse_completion(&blank), Err(Error::InvalidResponse { .. })));

		let err = parse_completion(&blank).expect_err("Expected blank content to fail.");

		assert_eq!(err.to_string(), "Malformed completion: Completion content is empty.");
	}

	#[test]
	fn messages_carry_similar_request_and_user_context() {
		let context = GenerationContext {
			request: Some(serde_json::json!({ "budget": 100 })),
			similar: Some(PriorStrategy {
				prompt: "Start a blog".to_string(),
				response_text: "1. Choose a niche".to_string(),
				success_score: Some(7),
				earnings: Some(250.0),
				similarity: 0.8,
			}),
		};
		let messages = build_messages("Start a food blog", &context);

		assert_eq!(messages.len(), 4);
		assert_eq!(messages[0]["role"], "system");

		let note = messages[1]["content"].as_str().expect("note content");

		assert!(note.contains("Start a blog"));
		assert!(note.contains("7/10"));
		assert!(messages[2]["content"].as_str().expect("context").contains("budget"));
		assert_eq!(messages[3]["content"], "Start a food blog");
	}

	#[test]
	fn messages_without_context_are_system_then_user() {
		let messages = build_messages("Earn $100", &GenerationContext::default());

		assert_eq!(messages.len(), 2);
		assert_eq!(messages[1]["role"], "user");
	}
}
