/// State management module
///
/// This module handles all persisted application state:
/// - SQLite catalog connection and queries (library.rs)
/// - Shared data structures (data.rs)

pub mod library;
pub mod data;

pub use data::ImageRecord;
pub use library::{RecordStore, DEFAULT_DB_PATH};
