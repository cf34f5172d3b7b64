use std::cmp::Ordering;

use time::OffsetDateTime;

use pwe_config::Ranking;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone)]
pub struct CategoryStats<'a> {
	pub category: &'a str,
	pub use_count: i64,
	pub rated_count: i64,
	pub avg_success_score: Option<f64>,
	pub avg_earnings: Option<f64>,
	pub last_used_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCategory {
	pub category: String,
	pub score: f64,
	pub use_count: i64,
}

/// Exponential decay with the configured half-life, clamped to `[0, 1]`.
pub fn recency_weight(
	last_used_at: OffsetDateTime,
	now: OffsetDateTime,
	half_life_days: f64,
) -> f64 {
	let age_days = (now - last_used_at).as_seconds_f64() / SECONDS_PER_DAY;

	if age_days <= 0.0 {
		return 1.0;
	}

	0.5_f64.powf(age_days / half_life_days).clamp(0.0, 1.0)
}

/// Scores every rated category and sorts best first. Unrated categories are dropped.
pub fn rank_categories(
	stats: &[CategoryStats<'_>],
	cfg: &Ranking,
	now: OffsetDateTime,
) -> Vec<RankedCategory> {
	let rated = stats.iter().filter(|stat| stat.rated_count > 0).collect::<Vec<_>>();
	let max_avg_earnings =
		rated.iter().filter_map(|stat| stat.avg_earnings).fold(0.0_f64, f64::max);
	let mut ranked = rated
		.into_iter()
		.map(|stat| {
			let normalized_success = (stat.avg_success_score.unwrap_or(0.0) / 10.0).clamp(0.0, 1.0);
			let avg_earnings = stat.avg_earnings.unwrap_or(0.0);
			// Holding the maximum scores 1.0, including when every average is zero.
			let normalized_earnings = if avg_earnings >= max_avg_earnings {
				1.0
			} else {
				(avg_earnings / max_avg_earnings).clamp(0.0, 1.0)
			};
			let recency = recency_weight(stat.last_used_at, now, cfg.recency_half_life_days);
			let score = cfg.success_weight * normalized_success
				+ cfg.earnings_weight * normalized_earnings
				+ cfg.recency_weight * recency;

			RankedCategory { category: stat.category.to_string(), score, use_count: stat.use_count }
		})
		.collect::<Vec<_>>();

	ranked.sort_by(cmp_ranked);

	ranked
}

pub fn top_categories(
	stats: &[CategoryStats<'_>],
	cfg: &Ranking,
	now: OffsetDateTime,
	n: usize,
) -> Vec<RankedCategory> {
	let mut ranked = rank_categories(stats, cfg, now);

	ranked.truncate(n);

	ranked
}

fn cmp_ranked(a: &RankedCategory, b: &RankedCategory) -> Ordering {
	b.score
		.total_cmp(&a.score)
		.then_with(|| b.use_count.cmp(&a.use_count))
		.then_with(|| a.category.cmp(&b.category))
}
