use pwe_domain::feedback;
use pwe_storage::models::ConversationRecord;

use crate::{Error, PweService, Result};

impl PweService {
	/// Records feedback for a conversation and folds it into its category's running means.
	///
	/// `record_id` is the string form of the id; anything that does not parse is `NotFound`.
	pub async fn submit_feedback(
		&self,
		record_id: &str,
		success_score: i64,
		earnings: f64,
	) -> Result<ConversationRecord> {
		let feedback = feedback::validate(success_score, earnings)
			.map_err(|code| Error::invalid_input(code.message()))?;
		let Ok(id) = record_id.trim().parse::<i64>() else {
			return Err(Error::NotFound {
				message: format!("Conversation {record_id} does not exist."),
			});
		};
		let update = self.store.upsert_feedback(id, feedback).await?;

		tracing::info!(
			record_id = update.record.id,
			category = %update.aggregate.category,
			resubmitted = update.previous.is_some(),
			rated_count = update.aggregate.rated_count,
			"Feedback recorded."
		);

		Ok(update.record)
	}
}
