use axum::http::StatusCode;
use cartera::api;
use cartera::db::init_db;
use cartera::domain::{Decimal, Quote};
use cartera::Repository;
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    user_id: i64,
    ars_id: i64,
    stock_id: i64,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let user = repo.insert_user("test@test.com", "10001").await.unwrap();
    let ars = repo
        .insert_instrument("ARS", "PESOS", "MONEDA")
        .await
        .unwrap();
    let stock = repo
        .insert_instrument("PAMP", "Pampa Holding S.A.", "ACCIONES")
        .await
        .unwrap();
    repo.insert_quote(&Quote {
        instrument_id: stock.id,
        close: Decimal::from_str_canonical("150").unwrap(),
        previous_close: Decimal::from_str_canonical("145").unwrap(),
        as_of: NaiveDate::from_ymd_opt(2023, 7, 14).unwrap(),
    })
    .await
    .unwrap();

    let app = api::create_router(api::AppState::new(repo.clone()));

    TestApp {
        app,
        repo,
        user_id: user.id.as_i64(),
        ars_id: ars.id.as_i64(),
        stock_id: stock.id.as_i64(),
        _temp: temp_dir,
    }
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn cash_in(test_app: &TestApp, amount: i64) -> serde_json::Value {
    let (status, body) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.ars_id,
            "side": "CASH_IN",
            "type": "MARKET",
            "size": amount,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_cash_in_fills_immediately() {
    let test_app = setup_test_app().await;

    let body = cash_in(&test_app, 100000).await;
    assert_eq!(body["status"], "FILLED");
    assert_eq!(body["side"], "CASH_IN");
    assert_eq!(body["size"], 100000);
    assert_eq!(body["price"], 1.0);
}

#[tokio::test]
async fn test_market_buy_uses_latest_close() {
    let test_app = setup_test_app().await;
    cash_in(&test_app, 100000).await;

    let (status, body) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "BUY",
            "type": "MARKET",
            "size": 100,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "FILLED");
    assert_eq!(body["price"], 150.0);
}

#[tokio::test]
async fn test_unaffordable_order_created_as_rejected() {
    let test_app = setup_test_app().await;
    cash_in(&test_app, 1000).await;

    let (status, body) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "BUY",
            "type": "MARKET",
            "size": 100,
        })),
    )
    .await;

    // Rejection is a created order, not an HTTP failure.
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "REJECTED");

    // And it shows up in the user's order history.
    let (status, orders) = send(
        &test_app.app,
        "GET",
        &format!("/api/orders/{}", test_app.user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    // Newest first.
    assert_eq!(orders[0]["status"], "REJECTED");
    assert_eq!(orders[1]["side"], "CASH_IN");
}

#[tokio::test]
async fn test_limit_buy_rests_then_cancels() {
    let test_app = setup_test_app().await;
    cash_in(&test_app, 100000).await;

    let (status, body) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "BUY",
            "type": "LIMIT",
            "size": 10,
            "price": 140,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "NEW");
    let order_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &test_app.app,
        "PATCH",
        &format!("/api/orders/{}/cancel", order_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
async fn test_cancel_non_new_order_conflicts() {
    let test_app = setup_test_app().await;
    let body = cash_in(&test_app, 1000).await;
    let order_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &test_app.app,
        "PATCH",
        &format!("/api/orders/{}/cancel", order_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("NEW"));
}

#[tokio::test]
async fn test_cancel_unknown_order_is_404() {
    let test_app = setup_test_app().await;
    let (status, _) = send(&test_app.app, "PATCH", "/api/orders/9999/cancel", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_limit_without_price_is_400() {
    let test_app = setup_test_app().await;
    cash_in(&test_app, 100000).await;

    let (status, body) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "BUY",
            "type": "LIMIT",
            "size": 10,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("price"));
}

#[tokio::test]
async fn test_market_order_without_quote_is_400() {
    let test_app = setup_test_app().await;
    cash_in(&test_app, 100000).await;
    let unquoted = test_app
        .repo
        .insert_instrument("MIRG", "Mirgor", "ACCIONES")
        .await
        .unwrap();

    let (status, _) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": unquoted.id.as_i64(),
            "side": "BUY",
            "type": "MARKET",
            "size": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_amount_order_floors_size() {
    let test_app = setup_test_app().await;
    cash_in(&test_app, 100000).await;

    let (status, body) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "BUY",
            "type": "MARKET",
            "amount": 15500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // floor(15500 / 150) = 103
    assert_eq!(body["size"], 103);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let test_app = setup_test_app().await;

    let (status, _) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": 999,
            "instrumentId": test_app.stock_id,
            "side": "BUY",
            "type": "MARKET",
            "size": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sell_reduces_then_rejects_oversell() {
    let test_app = setup_test_app().await;
    cash_in(&test_app, 100000).await;

    let (_, buy) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "BUY",
            "type": "MARKET",
            "size": 50,
        })),
    )
    .await;
    assert_eq!(buy["status"], "FILLED");

    let (status, sell) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "SELL",
            "type": "MARKET",
            "size": 30,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sell["status"], "FILLED");

    let (_, oversell) = send(
        &test_app.app,
        "POST",
        "/api/orders",
        Some(serde_json::json!({
            "userId": test_app.user_id,
            "instrumentId": test_app.stock_id,
            "side": "SELL",
            "type": "MARKET",
            "size": 30,
        })),
    )
    .await;
    assert_eq!(oversell["status"], "REJECTED");
}
