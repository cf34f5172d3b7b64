use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use pwe_storage::models::{ConversationRecord, RecordFilter};

use crate::{Error, PweService, Result, StrategyScore};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryRequest {
	#[serde(default)]
	pub user_id: Option<String>,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub limit: Option<u32>,
}

/// A conversation as shown to users. The normalized prompt stays internal.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
	pub id: String,
	pub user_id: Option<String>,
	pub prompt: String,
	pub response_text: String,
	pub category: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	pub success_score: Option<i32>,
	pub earnings: Option<f64>,
}
impl From<ConversationRecord> for HistoryRecord {
	fn from(record: ConversationRecord) -> Self {
		Self {
			id: record.id.to_string(),
			user_id: record.user_id,
			prompt: record.raw_prompt,
			response_text: record.response_text,
			category: record.category,
			created_at: record.created_at,
			success_score: record.success_score,
			earnings: record.earnings,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
	pub records: Vec<HistoryRecord>,
	pub top_categories: Vec<StrategyScore>,
}

impl PweService {
	pub async fn history(&self, req: HistoryRequest) -> Result<HistoryResponse> {
		let limit = match req.limit {
			Some(0) => return Err(Error::invalid_input("limit must be greater than zero.")),
			Some(limit) => limit.min(self.cfg.history.max_limit),
			None => self.cfg.history.default_limit,
		};
		let filter = RecordFilter {
			user_id: non_blank(req.user_id),
			category: non_blank(req.category),
			since: None,
		};
		let records = self.store.list(&filter, limit).await?;
		let top_categories = self
			.top_strategies(self.cfg.ranking.top_n.min(pwe_config::MAX_TOP_N) as usize)
			.await?
			.into_iter()
			.map(StrategyScore::from)
			.collect();

		Ok(HistoryResponse {
			records: records.into_iter().map(HistoryRecord::from).collect(),
			top_categories,
		})
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
