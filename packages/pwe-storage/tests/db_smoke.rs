use std::sync::Arc;

use time::OffsetDateTime;

use pwe_domain::feedback::Feedback;
use pwe_storage::{
	Error, RecordStore,
	db::Db,
	models::{NewRecord, RecordFilter},
};
use pwe_testkit::TestDatabase;

async fn open_db() -> Option<(TestDatabase, Db)> {
	let Some(dsn) = pwe_testkit::env_dsn() else {
		eprintln!("Skipping Postgres test; set PWE_PG_DSN to run this test.");

		return None;
	};
	let test_db = TestDatabase::new(&dsn).await.expect("Failed to create test database.");
	let db =
		Db::connect(&test_db.postgres_config(8)).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	Some((test_db, db))
}

fn new_record(user_id: Option<&str>, normalized_prompt: &str, category: &str) -> NewRecord {
	NewRecord {
		user_id: user_id.map(str::to_string),
		raw_prompt: normalized_prompt.to_string(),
		normalized_prompt: normalized_prompt.to_string(),
		response_text: format!("Plan for {normalized_prompt}."),
		category: category.to_string(),
		created_at: OffsetDateTime::now_utc(),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PWE_PG_DSN to run."]
async fn schema_bootstrap_is_repeatable() {
	let Some((test_db, db)) = open_db().await else { return };

	db.ensure_schema().await.expect("Second schema bootstrap failed.");

	let tables: Vec<String> = sqlx::query_scalar(
		"\
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = 'public'
ORDER BY table_name",
	)
	.fetch_all(&db.pool)
	.await
	.expect("Failed to list tables.");

	assert_eq!(tables, vec!["conversations".to_string(), "strategies".to_string()]);

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PWE_PG_DSN to run."]
async fn insert_assigns_ids_and_bumps_the_aggregate() {
	let Some((test_db, db)) = open_db().await else { return };
	let first = db
		.insert(new_record(Some("u1"), "start a blog", "content"))
		.await
		.expect("Insert failed.");
	let second = db
		.insert(new_record(None, "write a newsletter", "content"))
		.await
		.expect("Insert failed.");

	assert!(second.id > first.id);
	assert_eq!(second.success_score, None);

	let aggregate = db
		.get_aggregate("content")
		.await
		.expect("Aggregate lookup failed.")
		.expect("Aggregate missing.");

	assert_eq!(aggregate.use_count, 2);
	assert_eq!(aggregate.rated_count, 0);
	assert_eq!(aggregate.avg_success_score, None);

	let filter = RecordFilter { user_id: Some("u1".to_string()), ..Default::default() };
	let listed = db.list(&filter, 10).await.expect("List failed.");

	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].id, first.id);

	let tokens = vec!["blog".to_string()];
	let candidates =
		db.similarity_candidates(None, &tokens).await.expect("Candidate scan failed.");

	assert_eq!(candidates.len(), 1);
	assert_eq!(candidates[0].id, first.id);

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PWE_PG_DSN to run."]
async fn resubmitted_feedback_replaces_the_previous_sample() {
	let Some((test_db, db)) = open_db().await else { return };
	let a = db.insert(new_record(None, "sell crafts", "ecommerce")).await.expect("Insert failed.");
	let b = db.insert(new_record(None, "sell prints", "ecommerce")).await.expect("Insert failed.");

	db.upsert_feedback(a.id, Feedback { success_score: 8, earnings: 100.0 })
		.await
		.expect("Feedback failed.");

	let update = db
		.upsert_feedback(b.id, Feedback { success_score: 6, earnings: 300.0 })
		.await
		.expect("Feedback failed.");

	assert_eq!(update.aggregate.rated_count, 2);
	assert_eq!(update.aggregate.avg_success_score, Some(7.0));

	let update = db
		.upsert_feedback(a.id, Feedback { success_score: 10, earnings: 100.0 })
		.await
		.expect("Feedback failed.");

	assert_eq!(update.previous, Some(Feedback { success_score: 8, earnings: 100.0 }));
	assert_eq!(update.record.success_score, Some(10));
	assert_eq!(update.aggregate.rated_count, 2);
	assert_eq!(update.aggregate.avg_success_score, Some(8.0));
	assert_eq!(update.aggregate.avg_earnings, Some(200.0));

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PWE_PG_DSN to run."]
async fn feedback_for_missing_record_changes_nothing() {
	let Some((test_db, db)) = open_db().await else { return };

	db.insert(new_record(None, "cold email", "outreach")).await.expect("Insert failed.");

	let before = db.list_aggregates().await.expect("List aggregates failed.");
	let err = db
		.upsert_feedback(999_999, Feedback { success_score: 5, earnings: 1.0 })
		.await
		.expect_err("Expected missing record to fail.");

	assert!(matches!(err, Error::NotFound(_)));
	assert_eq!(db.list_aggregates().await.expect("List aggregates failed."), before);

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires external Postgres. Set PWE_PG_DSN to run."]
async fn concurrent_feedback_keeps_every_sample() {
	let Some((test_db, db)) = open_db().await else { return };
	let db = Arc::new(db);
	let mut ids = Vec::new();

	for i in 0..40 {
		let record = db
			.insert(new_record(None, &format!("freelance gig {i}"), "freelance"))
			.await
			.expect("Insert failed.");

		ids.push(record.id);
	}

	let mut handles = Vec::new();

	for (i, id) in ids.iter().copied().enumerate() {
		let db = Arc::clone(&db);
		let score = if i % 2 == 0 { 4 } else { 8 };

		handles.push(tokio::spawn(async move {
			db.upsert_feedback(id, Feedback { success_score: score, earnings: 50.0 }).await
		}));
	}

	for handle in handles {
		handle.await.expect("Task panicked.").expect("Feedback failed.");
	}

	let aggregate = db
		.get_aggregate("freelance")
		.await
		.expect("Aggregate lookup failed.")
		.expect("Aggregate missing.");

	assert_eq!(aggregate.use_count, 40);
	assert_eq!(aggregate.rated_count, 40);

	let mean = aggregate.avg_success_score.expect("Mean missing.");

	assert!((mean - 6.0).abs() < 1e-9, "mean was {mean}");

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
