mod common;

use common::{admin_login, build_app, fresh_token_body, FRESH_TOKEN, STALE_TOKEN};
use futures::future::join_all;
use http::StatusCode;
use mockito::{Matcher, Server};
use shopadmin::client::{DEFAULT_REFRESH_ERROR_MESSAGE, LOGIN_PATH, REFRESH_PATH};
use shopadmin::services::orders;
use std::io::Write;
use std::time::Duration;

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let mut server = Server::new_async().await;
    let rejected = server
        .mock("GET", "/orders")
        .match_header("authorization", bearer(STALE_TOKEN).as_str())
        .with_status(401)
        .with_body(r#"{"message": "jwt expired"}"#)
        .expect_at_least(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/orders")
        .match_header("authorization", bearer(FRESH_TOKEN).as_str())
        .with_status(200)
        .with_body(r#"{"data": [{"_id": "o1", "status": "pending"}]}"#)
        .expect(5)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", REFRESH_PATH)
        .with_status(200)
        .with_body(fresh_token_body())
        .expect(1)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();

    let calls = (0..5).map(|_| {
        let client = app.client.clone();
        tokio::spawn(async move { orders::list(&client).await })
    });
    for result in join_all(calls).await {
        let orders = result.expect("task panicked").expect("request should succeed");
        assert_eq!(orders[0]["_id"], "o1");
    }

    rejected.assert_async().await;
    accepted.assert_async().await;
    refresh.assert_async().await;
    assert_eq!(app.session.access_token().as_deref(), Some(FRESH_TOKEN));
    assert!(!app.client.is_refreshing());
}

#[tokio::test]
async fn two_components_both_succeed_after_single_refresh() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/orders/totals")
        .match_header("authorization", bearer(STALE_TOKEN).as_str())
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("GET", "/products")
        .match_header("authorization", bearer(STALE_TOKEN).as_str())
        .with_status(401)
        .create_async()
        .await;
    let totals = server
        .mock("GET", "/orders/totals")
        .match_header("authorization", bearer(FRESH_TOKEN).as_str())
        .with_status(200)
        .with_body(r#"{"data": {"revenue": 1500000}}"#)
        .expect(1)
        .create_async()
        .await;
    let products = server
        .mock("GET", "/products")
        .match_header("authorization", bearer(FRESH_TOKEN).as_str())
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", REFRESH_PATH)
        .with_status(200)
        .with_body(fresh_token_body())
        .expect(1)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();

    let (revenue, catalog) = tokio::join!(
        orders::totals(&app.client),
        shopadmin::services::products::list(&app.client)
    );

    assert_eq!(revenue.unwrap()["revenue"], 1500000);
    assert_eq!(catalog.unwrap(), serde_json::json!([]));
    totals.assert_async().await;
    products.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn concurrent_requests_fail_alike_when_no_token_comes_back() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/orders")
        .with_status(401)
        .with_body(r#"{"message": "jwt expired"}"#)
        .create_async()
        .await;
    // slow enough for every 401 of the wave to land while it is in flight
    let refresh = server
        .mock("GET", REFRESH_PATH)
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(100));
            w.write_all(br#"{"data": {}}"#)
        })
        .expect(1)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();

    let calls = (0..8).map(|_| {
        let client = app.client.clone();
        tokio::spawn(async move { orders::list(&client).await })
    });
    for result in join_all(calls).await {
        let err = result.expect("task panicked").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.message(), Some("jwt expired"));
    }
    refresh.assert_async().await;
    assert_eq!(app.session.access_token().as_deref(), Some(STALE_TOKEN));
}

#[tokio::test]
async fn login_unauthorized_is_never_retried() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", LOGIN_PATH)
        .with_status(401)
        .with_body(r#"{"message": "Sai email hoặc mật khẩu"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", REFRESH_PATH)
        .expect(0)
        .create_async()
        .await;

    let app = build_app(&server.url());
    let err = app
        .auth
        .sign_in("admin@shop.vn", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.message(), Some("Sai email hoặc mật khẩu"));
    assert!(!app.auth.state().is_authenticated);
    login.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn retried_request_is_not_retried_again() {
    let mut server = Server::new_async().await;
    let orders_mock = server
        .mock("GET", "/orders")
        .with_status(401)
        .expect(2)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", REFRESH_PATH)
        .with_status(200)
        .with_body(fresh_token_body())
        .expect(1)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();

    let err = orders::list(&app.client).await.unwrap_err();

    assert!(err.is_unauthorized());
    orders_mock.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn logout_removes_authorization_header() {
    let mut server = Server::new_async().await;
    let anonymous = server
        .mock("GET", "/products")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .expect(1)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();
    app.auth.logout();

    shopadmin::services::products::list(&app.client)
        .await
        .unwrap();
    anonymous.assert_async().await;
}

#[tokio::test]
async fn refresh_rejection_reports_server_message() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/orders")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", REFRESH_PATH)
        .with_status(400)
        .with_body(r#"{"message": "session expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();
    let mut changes = app.session.subscribe();

    let err = orders::list(&app.client).await.unwrap_err();
    assert!(err.is_unauthorized());

    changes.changed().await.unwrap();
    let state = app.auth.state();
    assert_eq!(state.refresh_error.as_tuple(), (true, "session expired"));
    assert!(!state.is_authenticated);
    assert_eq!(app.session.access_token(), None);
}

#[tokio::test]
async fn refresh_rejection_without_body_uses_default_message() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/orders")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("GET", REFRESH_PATH)
        .with_status(400)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();

    orders::list(&app.client).await.unwrap_err();

    assert_eq!(
        app.auth.state().refresh_error.as_tuple(),
        (true, DEFAULT_REFRESH_ERROR_MESSAGE)
    );
    assert_eq!(DEFAULT_REFRESH_ERROR_MESSAGE, "Có lỗi xảy ra, vui lòng login.");
}

#[tokio::test]
async fn refresh_server_error_leaves_session_alone() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/orders")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("GET", REFRESH_PATH)
        .with_status(503)
        .create_async()
        .await;

    let app = build_app(&server.url());
    app.auth.login(admin_login(STALE_TOKEN)).unwrap();

    let err = orders::list(&app.client).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(app.auth.state().refresh_error.as_tuple(), (false, ""));
    assert_eq!(app.session.access_token().as_deref(), Some(STALE_TOKEN));
}
