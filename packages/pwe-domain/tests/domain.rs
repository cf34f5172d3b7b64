use time::{Duration, OffsetDateTime};

use pwe_config::Ranking;
use pwe_domain::{
	category,
	feedback::{self, Feedback, RatedMeans},
	prompt,
	ranking::{self, CategoryStats},
};

fn stats(
	category: &str,
	use_count: i64,
	rated_count: i64,
	avg_success_score: Option<f64>,
	avg_earnings: Option<f64>,
	last_used_at: OffsetDateTime,
) -> CategoryStats<'_> {
	CategoryStats {
		category,
		use_count,
		rated_count,
		avg_success_score,
		avg_earnings,
		last_used_at,
	}
}

#[test]
fn similarity_is_symmetric() {
	let p1 = "Earn me $500 today";
	let p2 = "I want to earn 500 dollars today";
	let forward = prompt::prompt_similarity(p1, p2);
	let backward = prompt::prompt_similarity(p2, p1);

	assert_eq!(forward, backward);
	// {earn, 500, today} shared out of eight distinct tokens.
	assert!((forward - 3.0 / 8.0).abs() < 1e-12);
}

#[test]
fn identical_prompts_modulo_punctuation_score_one() {
	assert_eq!(prompt::prompt_similarity("Earn $500, today!", "earn 500 today"), 1.0);
}

#[test]
fn punctuation_only_prompts_never_match_each_other() {
	assert_eq!(prompt::prompt_similarity("???", "???"), 0.0);
	assert_eq!(prompt::prompt_similarity("???", "!!!"), 0.0);
}

#[test]
fn running_mean_follows_each_step() {
	let mut means = RatedMeans::default();
	let mut observed = Vec::new();

	for score in [8, 6, 10] {
		means = feedback::apply(means, None, Feedback { success_score: score, earnings: 0.0 });

		observed.push(means.avg_success_score.expect("Mean must be defined after a rating."));
	}

	assert_eq!(observed, vec![8.0, 7.0, 8.0]);
	assert_eq!(means.rated_count, 3);
}

#[test]
fn identical_resubmission_keeps_means() {
	let first = Feedback { success_score: 7, earnings: 250.0 };
	let other = Feedback { success_score: 3, earnings: 40.0 };
	let once = feedback::apply(feedback::apply(RatedMeans::default(), None, other), None, first);
	let twice = feedback::apply(once, Some(first), first);

	assert_eq!(once, twice);
}

#[test]
fn ranking_skips_unrated_categories() {
	let now = OffsetDateTime::now_utc();
	let input = vec![
		stats("content", 12, 0, None, None, now),
		stats("freelance", 3, 2, Some(6.0), Some(100.0), now),
	];
	let ranked = ranking::rank_categories(&input, &Ranking::default(), now);

	assert_eq!(ranked.len(), 1);
	assert_eq!(ranked[0].category, "freelance");
}

#[test]
fn ranking_blends_success_earnings_and_recency() {
	let now = OffsetDateTime::now_utc();
	let input = vec![
		stats("freelance", 4, 2, Some(10.0), Some(50.0), now),
		stats("investment", 4, 2, Some(5.0), Some(100.0), now - Duration::days(7)),
	];
	let ranked = ranking::rank_categories(&input, &Ranking::default(), now);

	// freelance: 0.6 * 1.0 + 0.3 * 0.5 + 0.1 * 1.0 = 0.85
	// investment: 0.6 * 0.5 + 0.3 * 1.0 + 0.1 * 0.5 = 0.65
	assert_eq!(ranked[0].category, "freelance");
	assert!((ranked[0].score - 0.85).abs() < 1e-9);
	assert!((ranked[1].score - 0.65).abs() < 1e-9);
}

#[test]
fn zero_earnings_everywhere_counts_as_the_maximum() {
	let now = OffsetDateTime::now_utc();
	let input = vec![
		stats("online", 1, 1, Some(10.0), Some(0.0), now),
		stats("content", 1, 1, Some(5.0), Some(0.0), now),
	];
	let ranked = ranking::rank_categories(&input, &Ranking::default(), now);

	// online: 0.6 * 1.0 + 0.3 * 1.0 + 0.1 * 1.0 = 1.0
	// content: 0.6 * 0.5 + 0.3 * 1.0 + 0.1 * 1.0 = 0.7
	assert_eq!(ranked[0].category, "online");
	assert!((ranked[0].score - 1.0).abs() < 1e-9);
	assert!((ranked[1].score - 0.7).abs() < 1e-9);
}

#[test]
fn every_category_at_the_maximum_gets_full_earnings_credit() {
	let now = OffsetDateTime::now_utc();
	let input = vec![
		stats("ecommerce", 1, 1, Some(0.0), Some(80.0), now),
		stats("freelance", 1, 1, Some(0.0), Some(80.0), now),
		stats("online", 1, 1, Some(0.0), Some(20.0), now),
	];
	let ranked = ranking::rank_categories(&input, &Ranking::default(), now);

	assert!((ranked[0].score - 0.4).abs() < 1e-9);
	assert!((ranked[1].score - 0.4).abs() < 1e-9);
	// online: 0.3 * 0.25 + 0.1 * 1.0 = 0.175
	assert!((ranked[2].score - 0.175).abs() < 1e-9);
}

#[test]
fn ties_prefer_use_count_then_name() {
	let now = OffsetDateTime::now_utc();
	let input = vec![
		stats("outreach", 2, 1, Some(5.0), Some(10.0), now),
		stats("content", 2, 1, Some(5.0), Some(10.0), now),
		stats("online", 9, 1, Some(5.0), Some(10.0), now),
	];
	let top = ranking::top_categories(&input, &Ranking::default(), now, 3);
	let names = top.iter().map(|item| item.category.as_str()).collect::<Vec<_>>();

	assert_eq!(names, vec!["online", "content", "outreach"]);
}

#[test]
fn top_categories_truncates() {
	let now = OffsetDateTime::now_utc();
	let input = category::categories()
		.enumerate()
		.map(|(i, name)| stats(name, 1, 1, Some(i as f64), Some(1.0), now))
		.collect::<Vec<_>>();

	assert_eq!(ranking::top_categories(&input, &Ranking::default(), now, 3).len(), 3);
}
