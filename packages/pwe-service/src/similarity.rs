//! Nearest prior prompt by token-set Jaccard similarity.

use std::collections::BTreeSet;

use pwe_domain::prompt;
use pwe_storage::models::{ConversationRecord, PromptCandidate};

use crate::{PweService, Result};

#[derive(Debug, Clone)]
pub struct SimilarMatch {
	pub record: ConversationRecord,
	pub score: f64,
}

impl PweService {
	/// Best prior record whose prompt clears `similarity.threshold`.
	///
	/// A known user's own records are scanned first; the global scan runs only when none of them
	/// qualifies.
	pub async fn find_similar(
		&self,
		raw_prompt: &str,
		user_id: Option<&str>,
	) -> Result<Option<SimilarMatch>> {
		let normalized = prompt::normalize_prompt(raw_prompt);
		let query = prompt::token_set(&normalized);

		if query.is_empty() {
			return Ok(None);
		}

		let tokens = query.iter().map(|token| token.to_string()).collect::<Vec<_>>();
		let threshold = self.cfg.similarity.threshold;

		if let Some(user_id) = user_id {
			let candidates = self.store.similarity_candidates(Some(user_id), &tokens).await?;

			if let Some((candidate, score)) = best_candidate(&query, &candidates, threshold) {
				return self.load_match(candidate.id, score).await;
			}
		}

		let candidates = self.store.similarity_candidates(None, &tokens).await?;

		match best_candidate(&query, &candidates, threshold) {
			Some((candidate, score)) => self.load_match(candidate.id, score).await,
			None => Ok(None),
		}
	}

	async fn load_match(&self, id: i64, score: f64) -> Result<Option<SimilarMatch>> {
		let record = self.store.get(id).await?;

		Ok(record.map(|record| SimilarMatch { record, score }))
	}
}

/// Highest-scoring candidate at or above `threshold`. Ties go to the newest record, then the
/// higher id.
pub fn best_candidate<'a>(
	query: &BTreeSet<&str>,
	candidates: &'a [PromptCandidate],
	threshold: f64,
) -> Option<(&'a PromptCandidate, f64)> {
	candidates
		.iter()
		.filter_map(|candidate| {
			let score = prompt::jaccard(query, &prompt::token_set(&candidate.normalized_prompt));

			(score >= threshold).then_some((candidate, score))
		})
		.max_by(|(a, a_score), (b, b_score)| {
			a_score
				.total_cmp(b_score)
				.then_with(|| a.created_at.cmp(&b.created_at))
				.then_with(|| a.id.cmp(&b.id))
		})
}

#[cfg(test)]
mod tests {
	use time::{Duration, OffsetDateTime};

	use super::*;

	fn candidate(id: i64, normalized_prompt: &str, age_minutes: i64) -> PromptCandidate {
		PromptCandidate {
			id,
			normalized_prompt: normalized_prompt.to_string(),
			created_at: OffsetDateTime::UNIX_EPOCH + Duration::days(1)
				- Duration::minutes(age_minutes),
		}
	}

	#[test]
	fn below_threshold_never_matches() {
		let query = prompt::token_set("earn me 500 today");
		let candidates = [candidate(1, "i want to earn 500 dollars today", 0)];

		assert!(best_candidate(&query, &candidates, 0.6).is_none());
		assert!(best_candidate(&query, &candidates, 0.375).is_some());
	}

	#[test]
	fn ties_prefer_newest_then_higher_id() {
		let query = prompt::token_set("sell art online");
		let candidates = [
			candidate(1, "sell art online", 10),
			candidate(2, "online art sell", 5),
			candidate(3, "sell online art", 5),
		];
		let (best, score) = best_candidate(&query, &candidates, 0.6).expect("match");

		assert_eq!(best.id, 3);
		assert_eq!(score, 1.0);
	}

	#[test]
	fn higher_score_beats_recency() {
		let query = prompt::token_set("start a food blog");
		let candidates =
			[candidate(1, "start a food blog", 60), candidate(2, "start a food blog now", 0)];
		let (best, _) = best_candidate(&query, &candidates, 0.6).expect("match");

		assert_eq!(best.id, 1);
	}
}
