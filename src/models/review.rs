//! Review model matching the frontend review contract.
//!
//! Tags are persisted as a single comma-delimited string (the original schema's
//! `tags VARCHAR` column); the presentation engine is responsible for splitting
//! and trimming them for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored review, optionally joined with the author's username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub review_id: i64,
    pub movie_id: i64,
    pub user_id: i64,
    /// Star rating, 1-5 inclusive
    pub rating: i64,
    pub comment: String,
    pub spoiler: bool,
    /// Comma-delimited spoiler-category labels; empty when none were selected
    #[serde(default)]
    pub tags: String,
    pub created_at: DateTime<Utc>,
    /// Present on list-by-movie responses (joined from the users table)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Inbound review submission, before write-path validation.
///
/// `movie_id` and `rating` default to zero so that absent fields surface as
/// validation errors rather than deserialization failures, matching the
/// original API's behavior.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewDraft {
    #[serde(default)]
    pub movie_id: i64,
    #[serde(default)]
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub spoiler: bool,
    /// Selected tags as chosen in the UI; joined into the delimited form at
    /// submission time
    #[serde(default)]
    pub tags: Vec<String>,
}
