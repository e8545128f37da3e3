//! Review API endpoints.
//!
//! The write path runs the engine's draft validation before the store is
//! touched; the list path optionally applies the engine's filter/sort/tag
//! stages server-side. Spoiler disclosure stays a client-session concern, so
//! listed reviews always carry their comments.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, success, ApiResult};
use crate::auth::AuthUser;
use crate::engine::{self, PresentQuery};
use crate::errors::AppError;
use crate::models::{Review, ReviewDraft};
use crate::AppState;

/// POST /api/reviews - Create a review (authenticated).
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<ReviewDraft>,
) -> ApiResult<Review> {
    engine::validate_draft(&draft)?;

    let review = state.repo.create_review(user.user_id, &draft).await?;

    tracing::info!(
        review_id = review.review_id,
        movie_id = review.movie_id,
        "Review created"
    );
    created(review, "Review created")
}

/// GET /api/reviews/:movie_id - List a movie's reviews, newest first by
/// default; `filter`, `sort` and `tag` query params refine the result.
pub async fn list_movie_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(query): Query<PresentQuery>,
) -> ApiResult<Vec<Review>> {
    let reviews = state.repo.list_reviews_for_movie(movie_id).await?;
    success(engine::filter_and_sort(&reviews, &query))
}

/// GET /api/users/me/reviews - The authenticated user's own reviews across
/// all movies, newest first.
pub async fn list_my_reviews(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<Review>> {
    success(state.repo.list_reviews_for_user(user.user_id).await?)
}

/// DELETE /api/reviews/:review_id - Delete one of the requester's own
/// reviews (authenticated). The delete is owner-scoped in SQL; a miss means
/// the review does not exist or belongs to someone else.
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(review_id): Path<i64>,
) -> ApiResult<()> {
    let deleted = state.repo.delete_review(review_id, user.user_id).await?;

    if !deleted {
        return Err(AppError::NotFound(
            "Review not found or not permitted".to_string(),
        ));
    }

    tracing::info!(review_id, user_id = user.user_id, "Review deleted");
    Ok(super::ApiResponse::new(()).with_message("Review deleted"))
}
