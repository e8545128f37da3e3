//! Database repository for CRUD operations.
//!
//! Uses prepared statements throughout; review deletion is scoped to the
//! owning user in SQL so authorization is enforced at the store level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::engine::{self, ReviewStore};
use crate::errors::AppError;
use crate::models::{Review, ReviewDraft, User, UserRecord};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Create a new user with an already-hashed password.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        username: &str,
    ) -> Result<User, AppError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, username, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(username)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(User {
            user_id: result.last_insert_rowid(),
            email: email.to_string(),
            username: username.to_string(),
            created_at: now,
        })
    }

    /// Find a user by email, including the stored password hash.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query(
            "SELECT user_id, email, password_hash, username, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_record_from_row))
    }

    /// Find a user by id.
    pub async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT user_id, email, password_hash, username, created_at FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|r| user_record_from_row(r).into_user()))
    }

    // ==================== REVIEW OPERATIONS ====================

    /// Create a new review. The draft's selected tags are joined into the
    /// stored delimited form.
    pub async fn create_review(
        &self,
        user_id: i64,
        draft: &ReviewDraft,
    ) -> Result<Review, AppError> {
        let now = Utc::now();
        let tags = engine::join_tags(&draft.tags);

        let result = sqlx::query(
            "INSERT INTO reviews (movie_id, user_id, rating, comment, spoiler, tags, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(draft.movie_id)
        .bind(user_id)
        .bind(draft.rating)
        .bind(&draft.comment)
        .bind(draft.spoiler)
        .bind(&tags)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Review {
            review_id: result.last_insert_rowid(),
            movie_id: draft.movie_id,
            user_id,
            rating: draft.rating,
            comment: draft.comment.clone(),
            spoiler: draft.spoiler,
            tags,
            created_at: now,
            username: None,
        })
    }

    /// All reviews for a movie, joined with the author's username,
    /// newest first.
    pub async fn list_reviews_for_movie(&self, movie_id: i64) -> Result<Vec<Review>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT
                r.review_id, r.movie_id, r.user_id, r.rating, r.comment,
                r.spoiler, r.tags, r.created_at, u.username
            FROM reviews r
            INNER JOIN users u ON r.user_id = u.user_id
            WHERE r.movie_id = ?
            ORDER BY r.created_at DESC, r.review_id DESC
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    /// All reviews written by one user, newest first.
    pub async fn list_reviews_for_user(&self, user_id: i64) -> Result<Vec<Review>, AppError> {
        let rows = sqlx::query(
            "SELECT review_id, movie_id, user_id, rating, comment, spoiler, tags, created_at FROM reviews WHERE user_id = ? ORDER BY created_at DESC, review_id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    /// Delete a review owned by the given user.
    /// Returns false when no row matched (missing or owned by someone else).
    pub async fn delete_review(&self, review_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE review_id = ? AND user_id = ?")
            .bind(review_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewStore for Repository {
    async fn list_for_movie(&self, movie_id: i64) -> Result<Vec<Review>, AppError> {
        self.list_reviews_for_movie(movie_id).await
    }

    async fn create(&self, user_id: i64, draft: &ReviewDraft) -> Result<Review, AppError> {
        self.create_review(user_id, draft).await
    }

    async fn delete(&self, review_id: i64, user_id: i64) -> Result<bool, AppError> {
        self.delete_review(review_id, user_id).await
    }
}

/// Map a user row to a record including the password hash.
fn user_record_from_row(row: &SqliteRow) -> UserRecord {
    UserRecord {
        user_id: row.get("user_id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

/// Map a review row to the model; `username` is present only on joined rows.
fn review_from_row(row: &SqliteRow) -> Review {
    Review {
        review_id: row.get("review_id"),
        movie_id: row.get("movie_id"),
        user_id: row.get("user_id"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        spoiler: row.get("spoiler"),
        tags: row.get("tags"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        username: row.try_get("username").ok(),
    }
}
