//! Review aggregation and presentation engine.
//!
//! Pure computation over a movie's fetched review set: spoiler/normal
//! filtering, tag filtering, stable sorting, and per-session spoiler
//! disclosure. The write path validates drafts before any store call.
//!
//! `ReviewFeed` is the stateful session shell around these functions. It owns
//! the in-memory review list and the disclosure set explicitly, so every
//! transformation is a function of its inputs and deterministic to test.

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Movie, Review, ReviewDraft};


/// Fixed vocabulary of spoiler-category labels a reviewer may attach.
pub const TAG_VOCABULARY: [&str; 10] = [
    "결말",
    "반전",
    "죽음",
    "빌런정체",
    "쿠키영상",
    "액션",
    "감동",
    "연출",
    "잔인함",
    "OST",
];

/// Delimiter used in the stored tag string.
pub const TAG_DELIMITER: char = ',';

/// Spoiler-based review filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    All,
    /// Spoiler reviews only
    Spoiler,
    /// Non-spoiler reviews only
    Normal,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::All => "all",
            FilterKind::Spoiler => "spoiler",
            FilterKind::Normal => "normal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(FilterKind::All),
            "spoiler" => Some(FilterKind::Spoiler),
            "normal" => Some(FilterKind::Normal),
            _ => None,
        }
    }

    /// Predicate for this filter variant.
    pub fn matches(&self, review: &Review) -> bool {
        match self {
            FilterKind::All => true,
            FilterKind::Spoiler => review.spoiler,
            FilterKind::Normal => !review.spoiler,
        }
    }
}

/// Review sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Newest first
    #[default]
    Latest,
    /// Oldest first
    Oldest,
    /// Rating descending
    High,
    /// Rating ascending
    Low,
}

impl SortKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKind::Latest => "latest",
            SortKind::Oldest => "oldest",
            SortKind::High => "high",
            SortKind::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "latest" => Some(SortKind::Latest),
            "oldest" => Some(SortKind::Oldest),
            "high" => Some(SortKind::High),
            "low" => Some(SortKind::Low),
            _ => None,
        }
    }

    /// Comparator for this sort variant. Ties compare equal so that a stable
    /// sort preserves the relative order of the previous pipeline stage.
    pub fn compare(&self, a: &Review, b: &Review) -> Ordering {
        match self {
            SortKind::Latest => b.created_at.cmp(&a.created_at),
            SortKind::Oldest => a.created_at.cmp(&b.created_at),
            SortKind::High => b.rating.cmp(&a.rating),
            SortKind::Low => a.rating.cmp(&b.rating),
        }
    }
}

/// Filter, sort, and tag selection for one presentation pass.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresentQuery {
    #[serde(default)]
    pub filter: FilterKind,
    #[serde(default)]
    pub sort: SortKind,
    /// `None` means no tag filtering; an unknown tag matches nothing
    #[serde(default)]
    pub tag: Option<String>,
}

/// Split a stored delimited tag string into trimmed, non-empty labels.
///
/// Tolerates trailing delimiters and stray whitespace; empty fragments are
/// treated as absent tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join selected tags into the stored delimited form.
///
/// Duplicates are dropped keeping the first occurrence; an empty selection
/// serializes to an empty string.
pub fn join_tags(tags: &[String]) -> String {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(t.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Exact, case-sensitive containment check against a stored tag string.
fn tag_matches(stored: &str, selected: &str) -> bool {
    split_tags(stored).iter().any(|t| t == selected)
}

/// Per-session spoiler disclosure state.
///
/// Reveals are monotonic: once a review is opened it stays open until the
/// next fresh fetch clears the whole set. Nothing here is ever persisted.
#[derive(Debug, Clone, Default)]
pub struct Disclosures {
    revealed: HashSet<i64>,
}

impl Disclosures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a review as revealed. Returns true if it was newly revealed.
    pub fn reveal(&mut self, review_id: i64) -> bool {
        self.revealed.insert(review_id)
    }

    pub fn is_revealed(&self, review_id: i64) -> bool {
        self.revealed.contains(&review_id)
    }

    /// Reset all disclosure state (on every fresh fetch).
    pub fn clear(&mut self) {
        self.revealed.clear();
    }
}

/// A review shaped for display: original fields plus computed view state.
#[derive(Debug, Clone, Serialize)]
pub struct PresentedReview {
    pub review_id: i64,
    pub movie_id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub rating: i64,
    pub spoiler: bool,
    /// Parsed, trimmed tag list (empty fragments dropped)
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub is_revealed: bool,
    /// Absent while a spoiler review is still locked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Apply the filter and tag stages, then stable-sort the survivors.
///
/// Stage order is fixed: spoiler filter narrows first, tag matching second,
/// sort last over the remaining set.
pub fn filter_and_sort(reviews: &[Review], query: &PresentQuery) -> Vec<Review> {
    let mut out: Vec<Review> = reviews
        .iter()
        .filter(|r| query.filter.matches(r))
        .filter(|r| match &query.tag {
            None => true,
            Some(tag) => tag_matches(&r.tags, tag),
        })
        .cloned()
        .collect();

    // Vec::sort_by is stable, so ties keep the order of the filter output.
    out.sort_by(|a, b| query.sort.compare(a, b));
    out
}

/// Run the full presentation pipeline: filter, tag match, sort, disclosure.
///
/// A spoiler review's comment is omitted until its id has been revealed in
/// `disclosures`; non-spoiler comments are always present.
pub fn present(
    reviews: &[Review],
    query: &PresentQuery,
    disclosures: &Disclosures,
) -> Vec<PresentedReview> {
    filter_and_sort(reviews, query)
        .into_iter()
        .map(|review| {
            let is_revealed = !review.spoiler || disclosures.is_revealed(review.review_id);
            PresentedReview {
                review_id: review.review_id,
                movie_id: review.movie_id,
                user_id: review.user_id,
                username: review.username,
                rating: review.rating,
                spoiler: review.spoiler,
                tags: split_tags(&review.tags),
                created_at: review.created_at,
                is_revealed,
                comment: if is_revealed {
                    Some(review.comment)
                } else {
                    None
                },
            }
        })
        .collect()
}

/// Validate a review draft before any store call.
pub fn validate_draft(draft: &ReviewDraft) -> Result<(), AppError> {
    if draft.movie_id <= 0 {
        return Err(AppError::Validation(
            "Movie id and rating are required".to_string(),
        ));
    }
    if !(1..=5).contains(&draft.rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

/// Review persistence collaborator, as seen by the presentation engine.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// All reviews for one movie, joined with author usernames.
    async fn list_for_movie(&self, movie_id: i64) -> Result<Vec<Review>, AppError>;

    /// Persist a new review for the given author.
    async fn create(&self, user_id: i64, draft: &ReviewDraft) -> Result<Review, AppError>;

    /// Delete a review if and only if the requester is its author.
    /// Returns false when no row matched (missing or not owned).
    async fn delete(&self, review_id: i64, user_id: i64) -> Result<bool, AppError>;
}

/// Movie metadata collaborator.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn movie_details(&self, movie_id: i64) -> Result<Movie, AppError>;
}

/// The authenticated viewer of a feed, as supplied by the identity provider.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: i64,
    pub username: String,
}

/// Session shell for one movie's detail view.
///
/// Owns the fetched movie record, the review list, and the disclosure set.
/// Writes never merge incrementally: after a successful submit or delete the
/// whole feed is re-fetched, so the presented list is always re-derived from
/// the store.
pub struct ReviewFeed<S, M> {
    store: S,
    metadata: M,
    movie_id: i64,
    viewer: Option<Viewer>,
    movie: Option<Movie>,
    reviews: Vec<Review>,
    disclosures: Disclosures,
}

impl<S: ReviewStore, M: MetadataProvider> ReviewFeed<S, M> {
    pub fn new(store: S, metadata: M, movie_id: i64, viewer: Option<Viewer>) -> Self {
        Self {
            store,
            metadata,
            movie_id,
            viewer,
            movie: None,
            reviews: Vec::new(),
            disclosures: Disclosures::new(),
        }
    }

    pub fn movie_id(&self) -> i64 {
        self.movie_id
    }

    pub fn movie(&self) -> Option<&Movie> {
        self.movie.as_ref()
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Fetch the movie record and its reviews concurrently and replace the
    /// cached state wholesale, resetting all disclosure overrides.
    ///
    /// Both fetches must succeed before anything is committed; on failure the
    /// previously fetched list stays presentable. In-flight fetches are not
    /// cancelled by later calls, so rapid successive navigations apply in
    /// completion order.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        let (movie, reviews) = tokio::join!(
            self.metadata.movie_details(self.movie_id),
            self.store.list_for_movie(self.movie_id)
        );
        let movie = movie?;
        let reviews = reviews?;

        self.movie = Some(movie);
        self.reviews = reviews;
        self.disclosures.clear();
        Ok(())
    }

    /// Switch the feed to a different movie and re-fetch.
    pub async fn navigate(&mut self, movie_id: i64) -> Result<(), AppError> {
        self.movie_id = movie_id;
        self.refresh().await
    }

    /// Present the cached review list under the given query.
    pub fn present(&self, query: &PresentQuery) -> Vec<PresentedReview> {
        present(&self.reviews, query, &self.disclosures)
    }

    /// Reveal a spoiler review for the rest of this session.
    /// Returns true if the review was newly revealed.
    pub fn reveal(&mut self, review_id: i64) -> bool {
        self.disclosures.reveal(review_id)
    }

    /// Validate and submit a new review, then re-fetch the whole feed.
    ///
    /// Invalid drafts and unauthenticated viewers are rejected before the
    /// store is contacted.
    pub async fn submit(&mut self, draft: &ReviewDraft) -> Result<(), AppError> {
        validate_draft(draft)?;
        let viewer = self.viewer.clone().ok_or_else(|| {
            AppError::Unauthorized("Login is required to write a review".to_string())
        })?;

        self.store.create(viewer.user_id, draft).await?;
        self.refresh().await
    }

    /// Delete one of the viewer's own reviews, then re-fetch the whole feed.
    ///
    /// Ownership is checked against the cached list first so a non-owner
    /// never triggers a store call; the store re-enforces the check anyway,
    /// and a zero-row delete surfaces as not-found-or-not-permitted.
    pub async fn request_delete(&mut self, review_id: i64) -> Result<(), AppError> {
        let viewer = self.viewer.clone().ok_or_else(|| {
            AppError::Unauthorized("Login is required to delete a review".to_string())
        })?;

        if let Some(review) = self.reviews.iter().find(|r| r.review_id == review_id) {
            if review.user_id != viewer.user_id {
                return Err(AppError::Forbidden(
                    "Only the author can delete a review".to_string(),
                ));
            }
        }

        let deleted = self.store.delete(review_id, viewer.user_id).await?;
        if !deleted {
            return Err(AppError::NotFound(
                "Review not found or not permitted".to_string(),
            ));
        }

        self.refresh().await
    }
}
