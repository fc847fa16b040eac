pub mod assessment;
pub mod streak;
