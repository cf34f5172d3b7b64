//! Process-local store used for development and tests.

use std::{
	collections::{BTreeMap, HashSet},
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use time::OffsetDateTime;

use pwe_domain::feedback::Feedback;

use crate::{
	AggregateMutator, BoxFuture, Error, RecordStore, Result,
	models::{
		ConversationRecord, FeedbackUpdate, NewRecord, PromptCandidate, RecordFilter,
		StrategyAggregate,
	},
};

/// One lock guards records and aggregates together, which makes every operation atomic.
#[derive(Default)]
pub struct MemoryStore {
	state: RwLock<State>,
}

#[derive(Default)]
struct State {
	last_id: i64,
	records: BTreeMap<i64, ConversationRecord>,
	aggregates: BTreeMap<String, StrategyAggregate>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.read().records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn read(&self) -> RwLockReadGuard<'_, State> {
		self.state.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, State> {
		self.state.write().unwrap_or_else(|err| err.into_inner())
	}

	fn insert_now(&self, record: NewRecord) -> ConversationRecord {
		let mut state = self.write();

		state.last_id += 1;

		let stored = ConversationRecord {
			id: state.last_id,
			user_id: record.user_id,
			raw_prompt: record.raw_prompt,
			normalized_prompt: record.normalized_prompt,
			response_text: record.response_text,
			category: record.category,
			created_at: record.created_at,
			success_score: None,
			earnings: None,
		};

		state
			.aggregates
			.entry(stored.category.clone())
			.or_insert_with(|| StrategyAggregate::new(&stored.category, stored.created_at))
			.record_use(stored.created_at);
		state.records.insert(stored.id, stored.clone());

		stored
	}

	fn list_now(&self, filter: &RecordFilter, limit: u32) -> Vec<ConversationRecord> {
		let state = self.read();
		let mut records =
			state.records.values().filter(|record| filter.matches(record)).collect::<Vec<_>>();

		records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

		records.into_iter().take(limit as usize).cloned().collect()
	}

	fn candidates_now(&self, user_id: Option<&str>, tokens: &[String]) -> Vec<PromptCandidate> {
		if tokens.is_empty() {
			return Vec::new();
		}

		let wanted = tokens.iter().map(String::as_str).collect::<HashSet<_>>();
		let state = self.read();

		state
			.records
			.values()
			.filter(|record| {
				user_id.is_none_or(|user_id| record.user_id.as_deref() == Some(user_id))
			})
			.filter(|record| {
				record.normalized_prompt.split_whitespace().any(|token| wanted.contains(token))
			})
			.map(|record| PromptCandidate {
				id: record.id,
				normalized_prompt: record.normalized_prompt.clone(),
				created_at: record.created_at,
			})
			.collect()
	}

	fn upsert_feedback_now(&self, id: i64, feedback: Feedback) -> Result<FeedbackUpdate> {
		let mut state = self.write();
		let state = &mut *state;
		let Some(record) = state.records.get_mut(&id) else {
			return Err(Error::NotFound(format!("Conversation {id} does not exist.")));
		};
		let previous = record.feedback();

		record.success_score = Some(feedback.success_score);
		record.earnings = Some(feedback.earnings);

		let aggregate = state
			.aggregates
			.entry(record.category.clone())
			.or_insert_with(|| StrategyAggregate::new(&record.category, record.created_at));

		aggregate.apply_feedback(previous, feedback);

		Ok(FeedbackUpdate { record: record.clone(), previous, aggregate: aggregate.clone() })
	}

	fn upsert_aggregate_now(
		&self,
		category: &str,
		mutator: AggregateMutator<'_>,
	) -> Result<StrategyAggregate> {
		if category.trim().is_empty() {
			return Err(Error::InvalidArgument("category must be non-empty.".to_string()));
		}

		let mut state = self.write();
		let aggregate = state
			.aggregates
			.entry(category.to_string())
			.or_insert_with(|| StrategyAggregate::new(category, OffsetDateTime::now_utc()));

		mutator(aggregate);

		aggregate.category = category.to_string();

		Ok(aggregate.clone())
	}
}

impl RecordStore for MemoryStore {
	fn insert<'a>(&'a self, record: NewRecord) -> BoxFuture<'a, Result<ConversationRecord>> {
		let stored = self.insert_now(record);

		Box::pin(async move { Ok(stored) })
	}

	fn get<'a>(&'a self, id: i64) -> BoxFuture<'a, Result<Option<ConversationRecord>>> {
		let record = self.read().records.get(&id).cloned();

		Box::pin(async move { Ok(record) })
	}

	fn list<'a>(
		&'a self,
		filter: &'a RecordFilter,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ConversationRecord>>> {
		let records = self.list_now(filter, limit);

		Box::pin(async move { Ok(records) })
	}

	fn similarity_candidates<'a>(
		&'a self,
		user_id: Option<&'a str>,
		tokens: &'a [String],
	) -> BoxFuture<'a, Result<Vec<PromptCandidate>>> {
		let candidates = self.candidates_now(user_id, tokens);

		Box::pin(async move { Ok(candidates) })
	}

	fn upsert_feedback<'a>(
		&'a self,
		id: i64,
		feedback: Feedback,
	) -> BoxFuture<'a, Result<FeedbackUpdate>> {
		let result = self.upsert_feedback_now(id, feedback);

		Box::pin(async move { result })
	}

	fn get_aggregate<'a>(
		&'a self,
		category: &'a str,
	) -> BoxFuture<'a, Result<Option<StrategyAggregate>>> {
		let aggregate = self.read().aggregates.get(category).cloned();

		Box::pin(async move { Ok(aggregate) })
	}

	fn list_aggregates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<StrategyAggregate>>> {
		let aggregates = self.read().aggregates.values().cloned().collect::<Vec<_>>();

		Box::pin(async move { Ok(aggregates) })
	}

	fn upsert_aggregate<'a>(
		&'a self,
		category: &'a str,
		mutator: AggregateMutator<'a>,
	) -> BoxFuture<'a, Result<StrategyAggregate>> {
		let result = self.upsert_aggregate_now(category, mutator);

		Box::pin(async move { result })
	}
}
