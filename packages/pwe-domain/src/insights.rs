//! Actionable lines and earnings estimates attached to generated strategies.

use std::sync::LazyLock;

use regex::Regex;

use crate::prompt;

const MAX_ACTIONS: usize = 5;
const MIN_ACTION_CHARS: usize = 10;
const MODEL_CONFIDENCE: f64 = 0.8;
const RULE_BASED_CONFIDENCE: f64 = 0.6;
const SIMILAR_MATCH_BONUS: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.95;

static DOLLAR_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\$(\d+(?:,\d{3})*(?:\.\d{2})?)").expect("Dollar amount pattern must compile.")
});
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:\d+[.)]\s*|[-*\u{2022}]\s+)").expect("List marker pattern must compile.")
});

/// Up to five list items from the strategy text, markers removed.
pub fn extract_suggested_actions(strategy: &str) -> Vec<String> {
	strategy
		.lines()
		.filter_map(|line| {
			let line = line.trim();
			let marker = LIST_MARKER.find(line)?;
			let action = line[marker.end()..].trim().trim_matches('*').trim();

			(action.chars().count() > MIN_ACTION_CHARS).then(|| action.to_string())
		})
		.take(MAX_ACTIONS)
		.collect()
}

/// The first dollar amount named in the prompt, otherwise a range keyed on the time horizon.
pub fn estimate_earnings(raw_prompt: &str) -> String {
	if let Some(captures) = DOLLAR_AMOUNT.captures(raw_prompt) {
		let amount = captures[1].replace(',', "");

		return format!("Target: ${amount} (as specified)");
	}

	let normalized = prompt::normalize_prompt(raw_prompt);
	let has_any =
		|words: &[&str]| normalized.split_whitespace().any(|token| words.contains(&token));

	if has_any(&["day", "days", "today", "tonight", "quick", "quickly"]) {
		"$50-200 (short-term)".to_string()
	} else if has_any(&["week", "weeks", "weekly"]) {
		"$200-1000 (weekly potential)".to_string()
	} else if has_any(&["month", "months", "monthly"]) {
		"$1000-5000 (monthly potential)".to_string()
	} else {
		"$100-500 (typical range)".to_string()
	}
}

/// Heuristic confidence in a generated strategy.
///
/// Model text starts higher than rule-based text, and a similar prior request adds a bonus.
pub fn confidence(model_text: bool, matched_similar: bool) -> f64 {
	let base = if model_text { MODEL_CONFIDENCE } else { RULE_BASED_CONFIDENCE };
	let bonus = if matched_similar { SIMILAR_MATCH_BONUS } else { 0.0 };

	(base + bonus).min(MAX_CONFIDENCE)
}
