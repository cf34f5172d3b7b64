use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// Lower-cased, punctuation-stripped, whitespace-collapsed form of a prompt.
///
/// Apostrophes are removed outright so contractions stay one token ("don't" becomes "dont"); every
/// other non-alphanumeric character separates tokens.
pub fn normalize_prompt(raw: &str) -> String {
	let mut spaced = String::with_capacity(raw.len());

	for ch in raw.nfkc().flat_map(char::to_lowercase) {
		if ch.is_alphanumeric() {
			spaced.push(ch);
		} else if !matches!(ch, '\'' | '\u{2019}') {
			spaced.push(' ');
		}
	}

	spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn token_set(normalized: &str) -> BTreeSet<&str> {
	normalized.split_whitespace().collect()
}

/// `|a ∩ b| / |a ∪ b|`; zero whenever either side is empty.
pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	let intersection = a.intersection(b).count();
	let union = a.len() + b.len() - intersection;

	intersection as f64 / union as f64
}

pub fn prompt_similarity(a: &str, b: &str) -> f64 {
	let a = normalize_prompt(a);
	let b = normalize_prompt(b);

	jaccard(&token_set(&a), &token_set(&b))
}
