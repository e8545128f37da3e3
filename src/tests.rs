//! Integration tests for the Cinema backend.

use std::sync::Arc;

use axum::{extract::Path, routing::get, Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::tmdb::TmdbClient;
use crate::{create_router, AppState};

/// Spawn a stand-in TMDB server returning canned payloads and return its
/// base URL.
async fn spawn_stub_tmdb() -> String {
    let app = Router::new()
        .route(
            "/movie/popular",
            get(|| async {
                Json(json!({
                    "page": 1,
                    "results": [{
                        "id": 42,
                        "title": "Stub Movie",
                        "vote_average": 7.5,
                        "release_date": "2024-01-01"
                    }],
                    "total_pages": 1,
                    "total_results": 1
                }))
            }),
        )
        .route(
            "/movie/top_rated",
            get(|| async {
                Json(json!({ "page": 1, "results": [], "total_pages": 0, "total_results": 0 }))
            }),
        )
        .route(
            "/search/movie",
            get(|| async {
                Json(json!({
                    "page": 1,
                    "results": [{ "id": 7, "title": "Found Movie" }],
                    "total_pages": 1,
                    "total_results": 1
                }))
            }),
        )
        .route(
            "/movie/{id}",
            get(|Path(id): Path<i64>| async move {
                Json(json!({
                    "id": id,
                    "title": "Stub Movie",
                    "overview": "A movie for tests",
                    "vote_average": 7.5,
                    "genres": [{ "id": 28, "name": "Action" }],
                    "videos": { "results": [
                        { "key": "abc", "name": "Official Trailer", "site": "YouTube", "type": "Trailer" },
                        { "key": "def", "name": "Clip", "site": "YouTube", "type": "Clip" }
                    ]}
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub");
    let addr = listener.local_addr().expect("Failed to get stub addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Point the metadata client at the stub server
        let tmdb_base_url = spawn_stub_tmdb().await;
        let tmdb = Arc::new(TmdbClient::new(tmdb_base_url.clone(), "test-key", "ko-KR"));

        let config = Config {
            jwt_secret: "test-secret".to_string(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            tmdb_api_key: Some("test-key".to_string()),
            tmdb_base_url,
            tmdb_language: "ko-KR".to_string(),
        };

        let state = AppState {
            repo,
            tmdb,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sign up and log in a user, returning the bearer token and user id.
    async fn register(&self, email: &str, username: &str) -> (String, i64) {
        let resp = self
            .client
            .post(self.url("/api/users/signup"))
            .json(&json!({ "email": email, "password": "pw-123456", "username": username }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);

        let resp = self
            .client
            .post(self.url("/api/users/login"))
            .json(&json!({ "email": email, "password": "pw-123456" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        let token = body["data"]["token"].as_str().unwrap().to_string();
        let user_id = body["data"]["user"]["user_id"].as_i64().unwrap();
        (token, user_id)
    }

    async fn post_review(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/reviews"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn list_reviews(&self, movie_id: i64, params: &str) -> Value {
        let resp = self
            .client
            .get(self.url(&format!("/api/reviews/{}{}", movie_id, params)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_api_index() {
    let fixture = TestFixture::new().await;

    let resp = fixture.client.get(fixture.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Cinema 21 API Server");
    assert_eq!(body["endpoints"]["reviews"], "/api/reviews");
}

#[tokio::test]
async fn test_signup_requires_all_fields() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/users/signup"))
        .json(&json!({ "email": "a@b.com", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let fixture = TestFixture::new().await;
    fixture.register("dupe@example.com", "first").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/users/signup"))
        .json(&json!({ "email": "dupe@example.com", "password": "pw-123456", "username": "second" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let fixture = TestFixture::new().await;
    fixture.register("user@example.com", "user").await;

    // Wrong password and unknown email produce the same response.
    for payload in [
        json!({ "email": "user@example.com", "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": "pw-123456" }),
    ] {
        let resp = fixture
            .client
            .post(fixture.url("/api/users/login"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Invalid email or password");
    }
}

#[tokio::test]
async fn test_current_user_profile() {
    let fixture = TestFixture::new().await;
    let (token, user_id) = fixture.register("me@example.com", "me").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/users/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["user_id"], user_id);
    assert_eq!(body["data"]["email"], "me@example.com");
    assert_eq!(body["data"]["username"], "me");
    // The password hash never leaves the store.
    assert!(body["data"].get("password_hash").is_none());

    let resp = fixture
        .client
        .get(fixture.url("/api/users/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_list_own_reviews_across_movies() {
    let fixture = TestFixture::new().await;
    let (mine, _) = fixture.register("mine@example.com", "mine").await;
    let (other, _) = fixture.register("other@example.com", "other").await;

    fixture
        .post_review(&mine, json!({ "movie_id": 42, "rating": 5, "comment": "first" }))
        .await;
    fixture
        .post_review(&mine, json!({ "movie_id": 7, "rating": 3, "comment": "second" }))
        .await;
    fixture
        .post_review(&other, json!({ "movie_id": 42, "rating": 1, "comment": "theirs" }))
        .await;

    let resp = fixture
        .client
        .get(fixture.url("/api/users/me/reviews"))
        .bearer_auth(&mine)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    // Newest first, both movies, only the requester's reviews.
    let movie_ids: Vec<i64> = reviews
        .iter()
        .map(|r| r["movie_id"].as_i64().unwrap())
        .collect();
    assert_eq!(movie_ids, vec![7, 42]);
    assert!(reviews.iter().all(|r| r["comment"] != "theirs"));
}

#[tokio::test]
async fn test_create_review_requires_token() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/reviews"))
        .json(&json!({ "movie_id": 42, "rating": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .client
        .post(fixture.url("/api/reviews"))
        .bearer_auth("not-a-jwt")
        .json(&json!({ "movie_id": 42, "rating": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_create_review_rejects_invalid_rating_before_store() {
    let fixture = TestFixture::new().await;
    let (token, _) = fixture.register("rev@example.com", "rev").await;

    let resp = fixture
        .post_review(&token, json!({ "movie_id": 42, "rating": 6, "comment": "x" }))
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture
        .post_review(&token, json!({ "rating": 3, "comment": "no movie id" }))
        .await;
    assert_eq!(resp.status(), 400);

    // Nothing reached the store.
    let body = fixture.list_reviews(42, "").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_and_list_reviews() {
    let fixture = TestFixture::new().await;
    let (token, user_id) = fixture.register("author@example.com", "author").await;

    let resp = fixture
        .post_review(
            &token,
            json!({
                "movie_id": 42,
                "rating": 5,
                "comment": "Great twist",
                "spoiler": true,
                "tags": ["결말", "반전", "결말"]
            }),
        )
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    // Selected tags are deduplicated and joined into the stored form.
    assert_eq!(body["data"]["tags"], "결말,반전");

    let resp = fixture
        .post_review(&token, json!({ "movie_id": 42, "rating": 2, "comment": "Meh" }))
        .await;
    assert_eq!(resp.status(), 201);

    let body = fixture.list_reviews(42, "").await;
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    // Newest first by default; comments and usernames are always present.
    assert_eq!(reviews[0]["comment"], "Meh");
    assert_eq!(reviews[1]["comment"], "Great twist");
    assert_eq!(reviews[0]["username"], "author");
    assert_eq!(reviews[1]["user_id"], user_id);

    // Reviews for other movies stay out of the listing.
    let body = fixture.list_reviews(43, "").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_reviews_filter_sort_and_tag() {
    let fixture = TestFixture::new().await;
    let (token, _) = fixture.register("filter@example.com", "filterer").await;

    for payload in [
        json!({ "movie_id": 42, "rating": 5, "comment": "spoiled", "spoiler": true, "tags": ["반전"] }),
        json!({ "movie_id": 42, "rating": 2, "comment": "safe" }),
        json!({ "movie_id": 42, "rating": 4, "comment": "spoiled too", "spoiler": true, "tags": ["결말"] }),
    ] {
        let resp = fixture.post_review(&token, payload).await;
        assert_eq!(resp.status(), 201);
    }

    let body = fixture.list_reviews(42, "?filter=spoiler").await;
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert!(reviews.iter().all(|r| r["spoiler"] == true));

    let body = fixture.list_reviews(42, "?filter=normal").await;
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["comment"], "safe");

    let body = fixture.list_reviews(42, "?sort=low").await;
    let ratings: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["rating"].as_i64().unwrap())
        .collect();
    assert_eq!(ratings, vec![2, 4, 5]);

    let body = fixture.list_reviews(42, "?tag=%EB%B0%98%EC%A0%84").await; // 반전
    let reviews = body["data"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["comment"], "spoiled");

    // An unknown tag matches nothing rather than everything.
    let body = fixture.list_reviews(42, "?tag=unknown").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_review_is_owner_scoped() {
    let fixture = TestFixture::new().await;
    let (owner_token, _) = fixture.register("owner@example.com", "owner").await;
    let (other_token, _) = fixture.register("other@example.com", "other").await;

    let resp = fixture
        .post_review(&owner_token, json!({ "movie_id": 42, "rating": 4, "comment": "mine" }))
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let review_id = body["data"]["review_id"].as_i64().unwrap();

    // A non-owner gets not-found-or-not-permitted, and the review survives.
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/reviews/{}", review_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let body = fixture.list_reviews(42, "").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // The owner can delete it.
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/reviews/{}", review_id)))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body = fixture.list_reviews(42, "").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_requires_token() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .delete(fixture.url("/api/reviews/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_movies_popular_proxy() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/movies/popular?page=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["results"][0]["title"], "Stub Movie");
}

#[tokio::test]
async fn test_movie_details_include_videos() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/movies/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], 42);
    assert_eq!(body["data"]["genres"][0]["name"], "Action");
    let videos = body["data"]["videos"]["results"].as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["type"], "Trailer");
}

#[tokio::test]
async fn test_movie_search_requires_query() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/movies/search"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture
        .client
        .get(fixture.url("/api/movies/search?query=found"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["results"][0]["title"], "Found Movie");
}
