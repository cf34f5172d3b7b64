pub mod category;
pub mod feedback;
pub mod insights;
pub mod prompt;
pub mod ranking;
