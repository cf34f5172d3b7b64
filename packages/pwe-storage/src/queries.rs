use sqlx::{PgExecutor, Postgres, QueryBuilder};
use time::OffsetDateTime;

use pwe_domain::feedback::Feedback;

use crate::{
	Result,
	models::{ConversationRecord, NewRecord, PromptCandidate, RecordFilter, StrategyAggregate},
};

const CONVERSATION_COLUMNS: &str = "\
id, user_id, raw_prompt, normalized_prompt, response_text, category, created_at, success_score, \
earnings";

pub async fn insert_conversation<'e, E>(
	executor: E,
	record: &NewRecord,
) -> Result<ConversationRecord>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
INSERT INTO conversations (
\tuser_id,
\traw_prompt,
\tnormalized_prompt,
\tresponse_text,
\tcategory,
\tcreated_at
)
VALUES ($1, $2, $3, $4, $5, $6)
RETURNING {CONVERSATION_COLUMNS}"
	);
	let stored = sqlx::query_as::<_, ConversationRecord>(&sql)
		.bind(record.user_id.as_deref())
		.bind(record.raw_prompt.as_str())
		.bind(record.normalized_prompt.as_str())
		.bind(record.response_text.as_str())
		.bind(record.category.as_str())
		.bind(record.created_at)
		.fetch_one(executor)
		.await?;

	Ok(stored)
}

pub async fn get_conversation<'e, E>(executor: E, id: i64) -> Result<Option<ConversationRecord>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");
	let record = sqlx::query_as::<_, ConversationRecord>(&sql)
		.bind(id)
		.fetch_optional(executor)
		.await?;

	Ok(record)
}

pub async fn get_conversation_for_update<'e, E>(
	executor: E,
	id: i64,
) -> Result<Option<ConversationRecord>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1 FOR UPDATE");
	let record = sqlx::query_as::<_, ConversationRecord>(&sql)
		.bind(id)
		.fetch_optional(executor)
		.await?;

	Ok(record)
}

pub async fn list_conversations<'e, E>(
	executor: E,
	filter: &RecordFilter,
	limit: u32,
) -> Result<Vec<ConversationRecord>>
where
	E: PgExecutor<'e>,
{
	let mut builder = QueryBuilder::<Postgres>::new(format!(
		"SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE TRUE"
	));

	if let Some(user_id) = filter.user_id.as_deref() {
		builder.push(" AND user_id = ");
		builder.push_bind(user_id);
	}
	if let Some(category) = filter.category.as_deref() {
		builder.push(" AND category = ");
		builder.push_bind(category);
	}
	if let Some(since) = filter.since {
		builder.push(" AND created_at >= ");
		builder.push_bind(since);
	}

	builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
	builder.push_bind(i64::from(limit));

	let records = builder.build_query_as::<ConversationRecord>().fetch_all(executor).await?;

	Ok(records)
}

pub async fn similarity_candidates<'e, E>(
	executor: E,
	user_id: Option<&str>,
	tokens: &[String],
) -> Result<Vec<PromptCandidate>>
where
	E: PgExecutor<'e>,
{
	let candidates = sqlx::query_as::<_, PromptCandidate>(
		"\
SELECT id, normalized_prompt, created_at
FROM conversations
WHERE string_to_array(normalized_prompt, ' ') && $1::text[]
	AND ($2::text IS NULL OR user_id = $2)",
	)
	.bind(tokens)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(candidates)
}

pub async fn update_conversation_feedback<'e, E>(
	executor: E,
	id: i64,
	feedback: Feedback,
) -> Result<ConversationRecord>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
UPDATE conversations
SET
\tsuccess_score = $1,
\tearnings = $2
WHERE id = $3
RETURNING {CONVERSATION_COLUMNS}"
	);
	let record = sqlx::query_as::<_, ConversationRecord>(&sql)
		.bind(feedback.success_score)
		.bind(feedback.earnings)
		.bind(id)
		.fetch_one(executor)
		.await?;

	Ok(record)
}

/// Creates the category row or bumps `use_count`; the row lock serializes concurrent inserts.
pub async fn record_strategy_use<'e, E>(
	executor: E,
	category: &str,
	used_at: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO strategies (category, use_count, rated_count, last_used_at)
VALUES ($1, 1, 0, $2)
ON CONFLICT (category) DO UPDATE
SET
\tuse_count = strategies.use_count + 1,
\tlast_used_at = GREATEST(strategies.last_used_at, EXCLUDED.last_used_at)",
	)
	.bind(category)
	.bind(used_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn ensure_strategy<'e, E>(executor: E, category: &str, now: OffsetDateTime) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO strategies (category, use_count, rated_count, last_used_at)
VALUES ($1, 0, 0, $2)
ON CONFLICT (category) DO NOTHING",
	)
	.bind(category)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_strategy<'e, E>(executor: E, category: &str) -> Result<Option<StrategyAggregate>>
where
	E: PgExecutor<'e>,
{
	let aggregate = sqlx::query_as::<_, StrategyAggregate>(
		"\
SELECT category, use_count, rated_count, avg_success_score, avg_earnings, last_used_at
FROM strategies
WHERE category = $1",
	)
	.bind(category)
	.fetch_optional(executor)
	.await?;

	Ok(aggregate)
}

pub async fn get_strategy_for_update<'e, E>(
	executor: E,
	category: &str,
) -> Result<Option<StrategyAggregate>>
where
	E: PgExecutor<'e>,
{
	let aggregate = sqlx::query_as::<_, StrategyAggregate>(
		"\
SELECT category, use_count, rated_count, avg_success_score, avg_earnings, last_used_at
FROM strategies
WHERE category = $1
FOR UPDATE",
	)
	.bind(category)
	.fetch_optional(executor)
	.await?;

	Ok(aggregate)
}

pub async fn list_strategies<'e, E>(executor: E) -> Result<Vec<StrategyAggregate>>
where
	E: PgExecutor<'e>,
{
	let aggregates = sqlx::query_as::<_, StrategyAggregate>(
		"\
SELECT category, use_count, rated_count, avg_success_score, avg_earnings, last_used_at
FROM strategies
ORDER BY category",
	)
	.fetch_all(executor)
	.await?;

	Ok(aggregates)
}

pub async fn update_strategy<'e, E>(executor: E, aggregate: &StrategyAggregate) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE strategies
SET
\tuse_count = $1,
\trated_count = $2,
\tavg_success_score = $3,
\tavg_earnings = $4,
\tlast_used_at = $5
WHERE category = $6",
	)
	.bind(aggregate.use_count)
	.bind(aggregate.rated_count)
	.bind(aggregate.avg_success_score)
	.bind(aggregate.avg_earnings)
	.bind(aggregate.last_used_at)
	.bind(aggregate.category.as_str())
	.execute(executor)
	.await?;

	Ok(())
}
