pub mod exercises;
pub mod series;
pub mod sessions;

pub use series::SeriesInsertOutcome;
pub use sessions::SessionRecord;
