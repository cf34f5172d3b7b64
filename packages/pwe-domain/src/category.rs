//! Keyword classification of prompts and strategy text into strategy categories.

use crate::prompt;

pub const GENERAL: &str = "general";

/// Ordered rule table. Keywords match as token prefixes, so "freelanc" covers "freelance",
/// "freelancer" and "freelancing". Earlier rules win ties.
const RULES: &[(&str, &[&str])] = &[
	("freelance", &["freelanc", "gig", "upwork", "fiverr", "client", "servic", "consult"]),
	(
		"content",
		&["blog", "content", "writ", "article", "ebook", "youtube", "video", "podcast", "copywrit"],
	),
	("outreach", &["email", "outreach", "cold", "newsletter", "leads", "prospect", "pitch"]),
	("ecommerce", &["sell", "product", "ecommerce", "shop", "store", "dropship", "etsy", "amazon"]),
	("investment", &["invest", "stock", "crypto", "dividend", "trading", "etf", "bitcoin"]),
	("online", &["online", "digital", "internet", "affiliate", "website"]),
];

pub fn categories() -> impl Iterator<Item = &'static str> {
	RULES.iter().map(|(category, _)| *category).chain(std::iter::once(GENERAL))
}

/// Category of a request: decided by the prompt when it carries a signal, then by the strategy
/// text, then [`GENERAL`].
pub fn classify(prompt: &str, response: &str) -> &'static str {
	classify_text(prompt).or_else(|| classify_text(response)).unwrap_or(GENERAL)
}

/// Category with the most keyword hits in `text`, or `None` when nothing matches.
pub fn classify_text(text: &str) -> Option<&'static str> {
	let normalized = prompt::normalize_prompt(text);
	let mut best: Option<(&'static str, usize)> = None;

	for (category, keywords) in RULES {
		let hits = normalized
			.split_whitespace()
			.filter(|token| keywords.iter().any(|keyword| token.starts_with(keyword)))
			.count();

		if hits == 0 {
			continue;
		}
		if best.map(|(_, best_hits)| hits > best_hits).unwrap_or(true) {
			best = Some((category, hits));
		}
	}

	best.map(|(category, _)| category)
}
