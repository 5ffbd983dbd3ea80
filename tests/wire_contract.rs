//! Checks the stub account server against the upstream wire contract
//! the bridge depends on, without going through the bridge.

mod support;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use support::BankState;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn positive_balance_advertises_all_three_links() {
    let app = support::router(BankState::seeded());

    let response = app.oneshot(get("/accounts/acc-123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["accountId"], "acc-123");
    assert_eq!(body["balance"], 1250.75);
    let links = body["_links"].as_object().unwrap();
    assert!(links.contains_key("self"));
    assert!(links.contains_key("deposit"));
    assert!(links.contains_key("withdraw"));
    assert_eq!(links["withdraw"]["method"], "POST");
}

#[tokio::test]
async fn negative_balance_omits_withdraw_link() {
    let app = support::router(BankState::seeded());

    let body = body_json(app.oneshot(get("/accounts/acc-456")).await.unwrap()).await;
    let links = body["_links"].as_object().unwrap();
    assert!(links.contains_key("self"));
    assert!(links.contains_key("deposit"));
    assert!(!links.contains_key("withdraw"));
}

#[tokio::test]
async fn unknown_account_is_404() {
    let app = support::router(BankState::seeded());
    let response = app.oneshot(get("/accounts/acc-999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deposit_rejects_non_positive_amount() {
    let app = support::router(BankState::seeded());

    let response = app
        .oneshot(post("/accounts/acc-123/deposit", json!({"amount": -1.0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Amount must be positive"
    );
}

#[tokio::test]
async fn withdraw_forbidden_while_balance_non_positive() {
    let app = support::router(BankState::seeded());

    let response = app
        .oneshot(post("/accounts/acc-456/withdraw", json!({"amount": 10.0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "Withdrawal not allowed with negative balance"
    );
}

#[tokio::test]
async fn deposit_returns_updated_representation() {
    let state = BankState::seeded();
    let app = support::router(state.clone());

    let response = app
        .oneshot(post("/accounts/acc-456/deposit", json!({"amount": 200.0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["balance"], 49.75);
    // Balance crossed zero: the withdraw transition reappears.
    assert!(body["_links"].as_object().unwrap().contains_key("withdraw"));
    assert_eq!(state.balance("acc-456"), Some(49.75));
}
