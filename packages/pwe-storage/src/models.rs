use time::OffsetDateTime;

use pwe_domain::feedback::{Feedback, RatedMeans};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ConversationRecord {
	pub id: i64,
	pub user_id: Option<String>,
	pub raw_prompt: String,
	pub normalized_prompt: String,
	pub response_text: String,
	pub category: String,
	pub created_at: OffsetDateTime,
	pub success_score: Option<i32>,
	pub earnings: Option<f64>,
}
impl ConversationRecord {
	pub fn feedback(&self) -> Option<Feedback> {
		match (self.success_score, self.earnings) {
			(Some(success_score), Some(earnings)) => Some(Feedback { success_score, earnings }),
			_ => None,
		}
	}
}

#[derive(Debug, Clone)]
pub struct NewRecord {
	pub user_id: Option<String>,
	pub raw_prompt: String,
	pub normalized_prompt: String,
	pub response_text: String,
	pub category: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StrategyAggregate {
	pub category: String,
	pub use_count: i64,
	pub rated_count: i64,
	pub avg_success_score: Option<f64>,
	pub avg_earnings: Option<f64>,
	pub last_used_at: OffsetDateTime,
}
impl StrategyAggregate {
	pub fn new(category: &str, now: OffsetDateTime) -> Self {
		Self {
			category: category.to_string(),
			use_count: 0,
			rated_count: 0,
			avg_success_score: None,
			avg_earnings: None,
			last_used_at: now,
		}
	}

	pub fn rated_means(&self) -> RatedMeans {
		RatedMeans {
			rated_count: self.rated_count,
			avg_success_score: self.avg_success_score,
			avg_earnings: self.avg_earnings,
		}
	}

	pub fn apply_feedback(&mut self, previous: Option<Feedback>, next: Feedback) {
		let means = pwe_domain::feedback::apply(self.rated_means(), previous, next);

		self.rated_count = means.rated_count;
		self.avg_success_score = means.avg_success_score;
		self.avg_earnings = means.avg_earnings;
	}

	pub fn record_use(&mut self, used_at: OffsetDateTime) {
		self.use_count += 1;

		if used_at > self.last_used_at {
			self.last_used_at = used_at;
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
	pub user_id: Option<String>,
	pub category: Option<String>,
	pub since: Option<OffsetDateTime>,
}
impl RecordFilter {
	pub fn matches(&self, record: &ConversationRecord) -> bool {
		if let Some(user_id) = self.user_id.as_deref()
			&& record.user_id.as_deref() != Some(user_id)
		{
			return false;
		}
		if let Some(category) = self.category.as_deref()
			&& record.category != category
		{
			return false;
		}
		if let Some(since) = self.since
			&& record.created_at < since
		{
			return false;
		}

		true
	}
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PromptCandidate {
	pub id: i64,
	pub normalized_prompt: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct FeedbackUpdate {
	pub record: ConversationRecord,
	pub previous: Option<Feedback>,
	pub aggregate: StrategyAggregate,
}
