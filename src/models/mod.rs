pub mod exercise;
pub mod series;
pub mod session;

pub use exercise::{Exercise, SetType};
pub use series::CompletedSet;
pub use session::{Session, SessionStatus, StartedSession};
