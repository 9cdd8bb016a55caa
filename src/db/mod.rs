//! SQLite persistence for the offline backend.
//!
//! A single worker thread owns the connection (`connection::Database`);
//! repositories add typed queries on top of it.

mod connection;
pub mod helpers;
mod migrations;
pub mod repositories;

pub use connection::Database;
pub use repositories::{SeriesInsertOutcome, SessionRecord};
