pub mod db;
pub mod memory;
pub mod models;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use pwe_domain::feedback::Feedback;

use crate::models::{
	ConversationRecord, FeedbackUpdate, NewRecord, PromptCandidate, RecordFilter,
	StrategyAggregate,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read-modify-write step applied to one aggregate while its category is locked.
pub type AggregateMutator<'a> = Box<dyn FnOnce(&mut StrategyAggregate) + Send + 'a>;

/// Durable home of conversation records and per-category strategy aggregates.
///
/// Every method is atomic on its own. Methods touching an aggregate serialize per category so
/// concurrent writers never lose an update.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Assigns a fresh id and bumps the category aggregate in the same atomic unit.
	fn insert<'a>(&'a self, record: NewRecord) -> BoxFuture<'a, Result<ConversationRecord>>;

	fn get<'a>(&'a self, id: i64) -> BoxFuture<'a, Result<Option<ConversationRecord>>>;

	/// Newest first, at most `limit` records.
	fn list<'a>(
		&'a self,
		filter: &'a RecordFilter,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ConversationRecord>>>;

	/// Records sharing at least one token with `tokens`, restricted to `user_id` when given.
	fn similarity_candidates<'a>(
		&'a self,
		user_id: Option<&'a str>,
		tokens: &'a [String],
	) -> BoxFuture<'a, Result<Vec<PromptCandidate>>>;

	/// Overwrites the record's feedback and folds it into the owning aggregate.
	///
	/// Fails with [`Error::NotFound`] when the record does not exist, leaving every aggregate
	/// untouched.
	fn upsert_feedback<'a>(
		&'a self,
		id: i64,
		feedback: Feedback,
	) -> BoxFuture<'a, Result<FeedbackUpdate>>;

	fn get_aggregate<'a>(
		&'a self,
		category: &'a str,
	) -> BoxFuture<'a, Result<Option<StrategyAggregate>>>;

	fn list_aggregates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<StrategyAggregate>>>;

	/// Creates the aggregate when missing, then applies `mutator` under the category lock.
	fn upsert_aggregate<'a>(
		&'a self,
		category: &'a str,
		mutator: AggregateMutator<'a>,
	) -> BoxFuture<'a, Result<StrategyAggregate>>;
}
