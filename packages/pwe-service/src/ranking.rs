use serde::Serialize;
use time::OffsetDateTime;

use pwe_domain::ranking::{self, CategoryStats, RankedCategory};

use crate::{PweService, Result};

#[derive(Debug, Clone, Serialize)]
pub struct StrategyScore {
	pub category: String,
	pub score: f64,
}
impl From<RankedCategory> for StrategyScore {
	fn from(ranked: RankedCategory) -> Self {
		Self { category: ranked.category, score: ranked.score }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct TopStrategiesResponse {
	pub strategies: Vec<StrategyScore>,
	pub count: usize,
}

impl PweService {
	/// Best `n` rated categories, scored from the current aggregates on every call.
	pub async fn top_strategies(&self, n: usize) -> Result<Vec<RankedCategory>> {
		let aggregates = self.store.list_aggregates().await?;
		let stats = aggregates
			.iter()
			.map(|aggregate| CategoryStats {
				category: &aggregate.category,
				use_count: aggregate.use_count,
				rated_count: aggregate.rated_count,
				avg_success_score: aggregate.avg_success_score,
				avg_earnings: aggregate.avg_earnings,
				last_used_at: aggregate.last_used_at,
			})
			.collect::<Vec<_>>();

		Ok(ranking::top_categories(&stats, &self.cfg.ranking, OffsetDateTime::now_utc(), n))
	}

	/// The boundary list, never longer than [`pwe_config::MAX_TOP_N`].
	pub async fn top_strategies_response(&self) -> Result<TopStrategiesResponse> {
		let n = self.cfg.ranking.top_n.min(pwe_config::MAX_TOP_N) as usize;
		let strategies = self
			.top_strategies(n)
			.await?
			.into_iter()
			.map(StrategyScore::from)
			.collect::<Vec<_>>();

		Ok(TopStrategiesResponse { count: strategies.len(), strategies })
	}
}
