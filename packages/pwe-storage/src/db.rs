use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use time::OffsetDateTime;

use pwe_domain::feedback::Feedback;

use crate::{
	AggregateMutator, BoxFuture, Error, RecordStore, Result,
	models::{
		ConversationRecord, FeedbackUpdate, NewRecord, PromptCandidate, RecordFilter,
		StrategyAggregate,
	},
	queries, schema,
};

const SCHEMA_LOCK_ID: i64 = 7_120_115;

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &pwe_config::Postgres) -> Result<Self> {
		let pool = PgPoolOptions::new()
			.max_connections(cfg.pool_max_conns)
			.acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
			.connect(&cfg.dsn)
			.await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)")
			.bind(SCHEMA_LOCK_ID)
			.execute(&mut *tx)
			.await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		tracing::info!("Database schema is up to date.");

		Ok(())
	}

	async fn insert_record(&self, record: NewRecord) -> Result<ConversationRecord> {
		let mut tx = self.pool.begin().await?;
		let stored = queries::insert_conversation(&mut *tx, &record).await?;

		queries::record_strategy_use(&mut *tx, &stored.category, stored.created_at).await?;

		tx.commit().await?;

		Ok(stored)
	}

	async fn apply_feedback(&self, id: i64, feedback: Feedback) -> Result<FeedbackUpdate> {
		let mut tx = self.pool.begin().await?;
		// Lock order is record, then aggregate. Inserts only ever lock the aggregate.
		let Some(current) = queries::get_conversation_for_update(&mut *tx, id).await? else {
			return Err(Error::NotFound(format!("Conversation {id} does not exist.")));
		};
		let previous = current.feedback();

		queries::ensure_strategy(&mut *tx, &current.category, current.created_at).await?;

		let category = current.category.as_str();
		let mut aggregate = queries::get_strategy_for_update(&mut *tx, category)
			.await?
			.ok_or_else(|| Error::NotFound(format!("Strategy {category} does not exist.")))?;
		let record = queries::update_conversation_feedback(&mut *tx, id, feedback).await?;

		aggregate.apply_feedback(previous, feedback);

		queries::update_strategy(&mut *tx, &aggregate).await?;

		tx.commit().await?;

		Ok(FeedbackUpdate { record, previous, aggregate })
	}

	async fn mutate_aggregate(
		&self,
		category: &str,
		mutator: AggregateMutator<'_>,
	) -> Result<StrategyAggregate> {
		if category.trim().is_empty() {
			return Err(Error::InvalidArgument("category must be non-empty.".to_string()));
		}

		let mut tx = self.pool.begin().await?;

		queries::ensure_strategy(&mut *tx, category, OffsetDateTime::now_utc()).await?;

		let mut aggregate = queries::get_strategy_for_update(&mut *tx, category)
			.await?
			.ok_or_else(|| Error::NotFound(format!("Strategy {category} does not exist.")))?;

		mutator(&mut aggregate);

		aggregate.category = category.to_string();

		queries::update_strategy(&mut *tx, &aggregate).await?;

		tx.commit().await?;

		Ok(aggregate)
	}
}

impl RecordStore for Db {
	fn insert<'a>(&'a self, record: NewRecord) -> BoxFuture<'a, Result<ConversationRecord>> {
		Box::pin(self.insert_record(record))
	}

	fn get<'a>(&'a self, id: i64) -> BoxFuture<'a, Result<Option<ConversationRecord>>> {
		Box::pin(queries::get_conversation(&self.pool, id))
	}

	fn list<'a>(
		&'a self,
		filter: &'a RecordFilter,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ConversationRecord>>> {
		Box::pin(queries::list_conversations(&self.pool, filter, limit))
	}

	fn similarity_candidates<'a>(
		&'a self,
		user_id: Option<&'a str>,
		tokens: &'a [String],
	) -> BoxFuture<'a, Result<Vec<PromptCandidate>>> {
		Box::pin(async move {
			if tokens.is_empty() {
				return Ok(Vec::new());
			}

			queries::similarity_candidates(&self.pool, user_id, tokens).await
		})
	}

	fn upsert_feedback<'a>(
		&'a self,
		id: i64,
		feedback: Feedback,
	) -> BoxFuture<'a, Result<FeedbackUpdate>> {
		Box::pin(self.apply_feedback(id, feedback))
	}

	fn get_aggregate<'a>(
		&'a self,
		category: &'a str,
	) -> BoxFuture<'a, Result<Option<StrategyAggregate>>> {
		Box::pin(queries::get_strategy(&self.pool, category))
	}

	fn list_aggregates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<StrategyAggregate>>> {
		Box::pin(queries::list_strategies(&self.pool))
	}

	fn upsert_aggregate<'a>(
		&'a self,
		category: &'a str,
		mutator: AggregateMutator<'a>,
	) -> BoxFuture<'a, Result<StrategyAggregate>> {
		Box::pin(self.mutate_aggregate(category, mutator))
	}
}
