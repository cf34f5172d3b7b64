//! Feedback validation and the running-mean arithmetic behind strategy aggregates.

pub const MIN_SUCCESS_SCORE: i64 = 0;
pub const MAX_SUCCESS_SCORE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectScoreOutOfRange,
	RejectEarningsNotFinite,
	RejectEarningsNegative,
}
impl RejectCode {
	pub fn message(self) -> &'static str {
		match self {
			Self::RejectScoreOutOfRange => "success_score must be an integer between 0 and 10.",
			Self::RejectEarningsNotFinite => "earnings must be a finite number.",
			Self::RejectEarningsNegative => "earnings must be zero or greater.",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback {
	pub success_score: i32,
	pub earnings: f64,
}

/// Rated-record statistics of one category. Means are `None` until the first rating.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatedMeans {
	pub rated_count: i64,
	pub avg_success_score: Option<f64>,
	pub avg_earnings: Option<f64>,
}

pub fn validate(success_score: i64, earnings: f64) -> Result<Feedback, RejectCode> {
	if !(MIN_SUCCESS_SCORE..=MAX_SUCCESS_SCORE).contains(&success_score) {
		return Err(RejectCode::RejectScoreOutOfRange);
	}
	if !earnings.is_finite() {
		return Err(RejectCode::RejectEarningsNotFinite);
	}
	if earnings < 0.0 {
		return Err(RejectCode::RejectEarningsNegative);
	}

	Ok(Feedback { success_score: success_score as i32, earnings })
}

/// Folds one feedback event into `current`.
///
/// A record's first feedback adds a sample. A resubmission replaces the record's earlier sample in
/// place, leaving `rated_count` unchanged.
pub fn apply(current: RatedMeans, previous: Option<Feedback>, next: Feedback) -> RatedMeans {
	match previous {
		Some(previous) if current.rated_count > 0 => RatedMeans {
			rated_count: current.rated_count,
			avg_success_score: Some(replace_sample(
				current.avg_success_score,
				current.rated_count,
				f64::from(previous.success_score),
				f64::from(next.success_score),
			)),
			avg_earnings: Some(replace_sample(
				current.avg_earnings,
				current.rated_count,
				previous.earnings,
				next.earnings,
			)),
		},
		_ => {
			let rated_count = current.rated_count + 1;

			RatedMeans {
				rated_count,
				avg_success_score: Some(add_sample(
					current.avg_success_score,
					rated_count,
					f64::from(next.success_score),
				)),
				avg_earnings: Some(add_sample(current.avg_earnings, rated_count, next.earnings)),
			}
		},
	}
}

/// `mean + (value - mean) / count`, where `count` already includes the new sample.
pub fn add_sample(mean: Option<f64>, count: i64, value: f64) -> f64 {
	let mean = mean.unwrap_or(0.0);

	mean + (value - mean) / count as f64
}

/// `mean + (new - old) / count`.
pub fn replace_sample(mean: Option<f64>, count: i64, old: f64, new: f64) -> f64 {
	let mean = mean.unwrap_or(old);

	mean + (new - old) / count as f64
}
