/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the portal layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single stored upload in the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    /// Unique database ID, never reused after deletion
    pub id: i64,
    /// Disease label (the only mutable field)
    pub disease_name: String,
    /// Original upload name (e.g., "rash_01.jpg")
    pub file_name: String,
    /// Raw file content exactly as uploaded
    #[serde(skip)]
    pub image_bytes: Vec<u8>,
    /// Set by the store when the record is created
    pub upload_time: DateTime<Utc>,
}

impl ImageRecord {
    /// Caption shown under the image when browsing
    pub fn caption(&self) -> String {
        format!("Disease: {}, File: {}", self.disease_name, self.file_name)
    }

    /// Payload size in bytes
    pub fn size(&self) -> usize {
        self.image_bytes.len()
    }
}
