//! End-to-end checks of the HTTP surface against an in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use barter_api::auth::{AppState, AppStateInner, create_token};
use barter_db::Database;
use barter_types::models::{ProposalFilter, ProposalStatus};

const SECRET: &str = "test-secret";

struct TestApp {
    state: AppState,
    router: Router,
}

struct TestUser {
    id: Uuid,
    token: String,
}

impl TestApp {
    fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: SECRET.to_string(),
        });
        let router = barter_api::router(state.clone());
        Self { state, router }
    }

    /// Skips argon2 so tests stay fast; the register/login test covers it.
    fn user(&self, username: &str) -> TestUser {
        let id = Uuid::new_v4();
        self.state.db.create_user(id, username, "unused").unwrap();
        TestUser { id, token: create_token(SECRET, id, username).unwrap() }
    }

    async fn send(&self, method: &str, uri: &str, user: Option<&TestUser>, body: Option<Value>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", user.token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, headers, json)
    }

    async fn create_ad(&self, user: &TestUser, title: &str, category: &str, condition: &str) -> i64 {
        let (status, _, body) = self
            .send(
                "POST",
                "/ads",
                Some(user),
                Some(json!({
                    "title": title,
                    "description": format!("{title} description"),
                    "category": category,
                    "condition": condition,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn propose(&self, user: &TestUser, sender: i64, receiver: i64, comment: &str) -> i64 {
        let (status, _, body) = self
            .send(
                "POST",
                "/proposals",
                Some(user),
                Some(json!({ "ad_sender": sender, "ad_receiver": receiver, "comment": comment })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    fn proposal_status(&self, id: i64) -> ProposalStatus {
        self.state.db.get_proposal(id).unwrap().status
    }
}

fn titles(body: &Value) -> Vec<String> {
    body["page"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|ad| ad["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn register_then_login_issues_working_tokens() {
    let app = TestApp::new();

    let (status, _, body) = app
        .send("POST", "/auth/register", None, Some(json!({ "username": "testuser", "password": "12345678" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());

    let (status, _, _) = app
        .send("POST", "/auth/register", None, Some(json!({ "username": "testuser", "password": "12345678" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = app
        .send("POST", "/auth/login", None, Some(json!({ "username": "testuser", "password": "wrong-password" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = app
        .send("POST", "/auth/login", None, Some(json!({ "username": "testuser", "password": "12345678" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let user = TestUser {
        id: body["user_id"].as_str().unwrap().parse().unwrap(),
        token: body["token"].as_str().unwrap().to_string(),
    };
    let (status, _, body) = app.send("GET", "/me/ads", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn register_reports_bad_fields() {
    let app = TestApp::new();
    let (status, _, body) = app
        .send("POST", "/auth/register", None, Some(json!({ "username": "ab", "password": "short" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "username");
    assert_eq!(body["errors"][1]["field"], "password");
}

#[tokio::test]
async fn mutations_require_a_valid_token() {
    let app = TestApp::new();
    let (status, _, _) = app
        .send("POST", "/ads", None, Some(json!({ "title": "New Ad" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TestUser { id: Uuid::new_v4(), token: create_token("other-secret", Uuid::new_v4(), "x").unwrap() };
    let (status, _, _) = app.send("GET", "/me/ads", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_ad_and_reject_invalid_fields() {
    let app = TestApp::new();
    let user = app.user("testuser");

    let id = app.create_ad(&user, "New Ad", "electronics", "used").await;
    let (status, _, body) = app.send("GET", &format!("/ads/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New Ad");
    assert_eq!(body["owner"]["id"], user.id.to_string());

    let (status, _, body) = app
        .send(
            "POST",
            "/ads",
            Some(&user),
            Some(json!({ "title": "", "description": "x", "category": "cars", "condition": "used" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "category"]);
}

#[tokio::test]
async fn missing_ad_is_404() {
    let app = TestApp::new();
    let (status, _, _) = app.send("GET", "/ads/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_by_owner_and_refusal_for_others() {
    let app = TestApp::new();
    let owner = app.user("testuser");
    let other = app.user("otheruser");
    let id = app.create_ad(&owner, "Test Ad", "toys", "new").await;

    let (status, _, body) = app
        .send("PUT", &format!("/ads/{id}"), Some(&other), Some(json!({ "title": "Hacked Title" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["redirect"], "/ads");
    assert_eq!(app.state.db.get_ad(id).unwrap().title, "Test Ad");

    let (status, _, body) = app
        .send(
            "PUT",
            &format!("/ads/{id}"),
            Some(&owner),
            Some(json!({
                "title": "Updated Title",
                "description": "Updated description",
                "category": "books",
                "condition": "used",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Updated Title");
    assert_eq!(body["category"], "books");
}

#[tokio::test]
async fn delete_by_owner_cascades() {
    let app = TestApp::new();
    let u1 = app.user("user1");
    let u2 = app.user("user2");
    let ad1 = app.create_ad(&u1, "Ad 1", "books", "used").await;
    let ad2 = app.create_ad(&u2, "Ad 2", "sports", "new").await;
    app.propose(&u2, ad2, ad1, "Would you trade?").await;

    let (status, _, _) = app.send("DELETE", &format!("/ads/{ad1}"), Some(&u2), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = app.send("DELETE", &format!("/ads/{ad1}"), Some(&u1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/ads");

    let (status, _, _) = app.send("GET", &format!("/ads/{ad1}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.state.db.list_proposals(&ProposalFilter::default()).unwrap().is_empty());
}

#[tokio::test]
async fn listing_filters_searches_and_paginates() {
    let app = TestApp::new();
    let user = app.user("testuser");
    app.create_ad(&user, "Test Ad", "toys", "new").await;
    app.create_ad(&user, "Old toy", "toys", "used").await;
    for i in 1..=6 {
        app.create_ad(&user, &format!("Book {i}"), "books", "new").await;
    }

    let (status, _, body) = app.send("GET", "/ads?category=toys&condition=new", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Test Ad"]);
    assert_eq!(body["category"], "toys");

    let (_, _, body) = app.send("GET", "/ads?q=test", None, None).await;
    assert_eq!(titles(&body), vec!["Test Ad"]);
    assert_eq!(body["search_query"], "test");

    let (_, _, body) = app.send("GET", "/ads", None, None).await;
    assert_eq!(body["page"]["num_pages"], 2);
    assert_eq!(body["page"]["items"].as_array().unwrap().len(), 6);

    let (_, _, body) = app.send("GET", "/ads?page=50", None, None).await;
    assert_eq!(body["page"]["number"], 2);
    assert_eq!(titles(&body), vec!["Old toy", "Test Ad"]);

    let (_, _, body) = app.send("GET", "/ads?category=&q=", None, None).await;
    assert_eq!(body["page"]["total_count"], 8);

    let (status, _, _) = app.send("GET", "/ads?category=cars", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn search_text_is_matched_as_sent() {
    let app = TestApp::new();
    let user = app.user("testuser");
    app.create_ad(&user, "Test Ad", "toys", "new").await;
    app.create_ad(&user, "Adventure", "books", "used").await;

    let (status, _, body) = app.send("GET", "/ads?q=%20Ad", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Test Ad"]);
    assert_eq!(body["search_query"], " Ad");

    let (_, _, body) = app.send("GET", "/ads?q=%20%20%20", None, None).await;
    assert_eq!(body["page"]["total_count"], 0);
    assert_eq!(body["search_query"], "   ");
}

#[tokio::test]
async fn proposal_creation_enforces_ownership() {
    let app = TestApp::new();
    let u1 = app.user("user1");
    let u2 = app.user("user2");
    let ad1 = app.create_ad(&u1, "Ad 1", "books", "used").await;
    let ad2 = app.create_ad(&u2, "Ad 2", "sports", "new").await;

    let (status, _, body) = app
        .send("POST", "/proposals", Some(&u2), Some(json!({ "ad_sender": ad1, "ad_receiver": ad2 })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "ad_sender");

    let id = app.propose(&u2, ad2, ad1, "Would you trade?").await;
    assert_eq!(app.proposal_status(id), ProposalStatus::Pending);
}

#[tokio::test]
async fn decisions_redirect_whether_applied_or_absorbed() {
    let app = TestApp::new();
    let u1 = app.user("user1");
    let u2 = app.user("user2");
    let ad1 = app.create_ad(&u1, "Ad 1", "books", "used").await;
    let ad2 = app.create_ad(&u2, "Ad 2", "sports", "new").await;

    let accepted = app.propose(&u2, ad2, ad1, "Interested?").await;
    let (status, headers, _) = app
        .send("POST", &format!("/proposals/{accepted}/status/Y"), Some(&u1), None)
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/proposals");
    assert_eq!(app.proposal_status(accepted), ProposalStatus::Accepted);

    let fresh = app.propose(&u2, ad2, ad1, "Unauthorized test").await;
    let (status, _, _) = app
        .send("POST", &format!("/proposals/{fresh}/status/Y"), Some(&u2), None)
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(app.proposal_status(fresh), ProposalStatus::Pending);

    let (status, _, _) = app
        .send("POST", &format!("/proposals/{fresh}/status/maybe"), Some(&u1), None)
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(app.proposal_status(fresh), ProposalStatus::Pending);

    let (status, _, _) = app
        .send("POST", &format!("/proposals/{fresh}/status/N"), Some(&u1), None)
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(app.proposal_status(fresh), ProposalStatus::Rejected);

    let (status, _, _) = app.send("POST", "/proposals/999/status/Y", Some(&u1), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn proposal_listing_filters() {
    let app = TestApp::new();
    let u1 = app.user("user1");
    let u2 = app.user("user2");
    let ad1 = app.create_ad(&u1, "Ad 1", "books", "used").await;
    let ad2 = app.create_ad(&u2, "Ad 2", "sports", "new").await;
    app.propose(&u2, ad2, ad1, "Test filter").await;

    let (status, _, body) = app.send("GET", "/proposals?status=W", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proposals"][0]["comment"], "Test filter");
    assert_eq!(body["status"], "W");

    let (_, _, body) = app
        .send("GET", &format!("/proposals?receiver={}", u2.id), None, None)
        .await;
    assert_eq!(body["proposals"], json!([]));

    let (_, _, body) = app
        .send("GET", &format!("/proposals?sender={}&status=", u2.id), None, None)
        .await;
    assert_eq!(body["proposals"].as_array().unwrap().len(), 1);
    assert_eq!(body["sender_id"], u2.id.to_string());

    let (status, _, body) = app.send("GET", "/proposals?status=Q", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proposals"], json!([]));
    assert_eq!(body["status"], "Q");
}

#[tokio::test]
async fn catalogue_lists_choices() {
    let app = TestApp::new();
    let (status, _, body) = app.send("GET", "/catalogue", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"].as_array().unwrap().len(), 7);
    assert_eq!(body["conditions"][1]["code"], "used");
    assert_eq!(body["statuses"][0]["code"], "W");
}
