mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use beyond::middleware::USER_ID_HEADER;
use beyond::routes;

use common::{article, harness};

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, user_id: Option<i64>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header(USER_ID_HEADER, user_id.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn list_articles_returns_envelope() {
    let h = harness();
    h.store.seed_article(article(1, 7, 100, 3));
    h.store.seed_article(article(2, 7, 200, 1));
    let router = routes::router(h.state.clone());

    let (status, body) = send(
        router,
        get("/api/articles?author_id=7&sort_type=1&page_size=5"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    let data = &body["resp_data"];
    assert_eq!(data["is_end"], true);
    assert_eq!(data["next_cursor"], 2);
    assert_eq!(data["items"][0]["article_id"], 1);
    assert_eq!(data["items"][1]["article_id"], 2);
}

#[tokio::test]
async fn unsupported_sort_is_a_validation_error() {
    let h = harness();
    let router = routes::router(h.state.clone());

    let (status, body) = send(router, get("/api/articles?author_id=7&sort_type=9")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
}

#[tokio::test]
async fn mutations_require_caller_identity() {
    let h = harness();
    let router = routes::router(h.state.clone());

    let (status, body) = send(
        router,
        post(
            "/api/articles/publish",
            None,
            json!({"title": "t", "content": "c"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn publish_then_read_detail_and_delete() {
    let h = harness();

    let (status, body) = send(
        routes::router(h.state.clone()),
        post(
            "/api/articles/publish",
            Some(3),
            json!({"title": "hello", "content": "world"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let article_id = body["resp_data"]["article_id"].as_i64().unwrap();

    let (_, body) = send(
        routes::router(h.state.clone()),
        get(&format!("/api/articles/{article_id}")),
    )
    .await;
    assert_eq!(body["resp_data"]["title"], "hello");
    assert_eq!(body["resp_data"]["author_id"], 3);

    let (status, body) = send(
        routes::router(h.state.clone()),
        post(
            "/api/articles/delete",
            Some(4),
            json!({"article_id": article_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1003);

    let (status, _) = send(
        routes::router(h.state.clone()),
        post(
            "/api/articles/delete",
            Some(3),
            json!({"article_id": article_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        routes::router(h.state.clone()),
        get(&format!("/api/articles/{article_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["resp_data"].is_null());
}

#[tokio::test]
async fn follow_routes_update_lists() {
    let h = harness();

    let (status, body) = send(
        routes::router(h.state.clone()),
        post("/api/follows/follow", Some(1), json!({"target_id": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);

    let (_, body) = send(
        routes::router(h.state.clone()),
        get("/api/follows/fans?user_id=2"),
    )
    .await;
    assert_eq!(body["resp_data"]["items"][0]["user_id"], 1);
    assert_eq!(body["resp_data"]["items"][0]["follow_count"], 1);

    let (status, body) = send(
        routes::router(h.state.clone()),
        post("/api/follows/follow", Some(5), json!({"target_id": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
}

#[tokio::test]
async fn cache_outage_is_reported_as_internal_error() {
    let h = harness();
    h.cache.set_fail_reads(true);

    let (status, body) = send(
        routes::router(h.state.clone()),
        get("/api/follows/following?user_id=1"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 5000);
}
