mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chatdesk_backend::auth::JwtHandler;
use chrono::Duration;
use common::{get_with_token, TestContext, TEST_SECRET};

#[tokio::test]
async fn test_register_then_login_by_username_or_email() {
    let ctx = TestContext::new();

    let registered = ctx.register("alice", "alice@x.com", "pw1").await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["message"], "User created");
    assert_eq!(registered.body["user"]["username"], "alice");
    assert_eq!(registered.body["user"]["email"], "alice@x.com");
    assert_eq!(registered.body["token_type"], "bearer");
    assert!(registered.body["user"].get("password_hash").is_none());

    let by_name = ctx.login("alice", "pw1").await;
    assert_eq!(by_name.status, StatusCode::OK);
    let by_email = ctx.login("alice@x.com", "pw1").await;
    assert_eq!(by_email.status, StatusCode::OK);
    assert_eq!(by_name.body["user"], by_email.body["user"]);

    let wrong = ctx.login("alice", "nope").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn test_duplicate_registration_leaves_store_unchanged() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.register("alice", "alice@x.com", "pw1").await.status,
        StatusCode::CREATED
    );
    let before = ctx.state.account_store.count_accounts().unwrap();

    let same_name = ctx.register("alice", "other@x.com", "pw2").await;
    assert_eq!(same_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(same_name.body["detail"], "Username or email already registered");

    let same_email = ctx.register("bob", "alice@x.com", "pw2").await;
    assert_eq!(same_email.status, StatusCode::BAD_REQUEST);

    assert_eq!(ctx.state.account_store.count_accounts().unwrap(), before);

    // The original password still works; the rejected ones never took effect.
    assert_eq!(ctx.login("alice", "pw1").await.status, StatusCode::OK);
    assert_eq!(
        ctx.login("alice", "pw2").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_username_cannot_take_over_an_email_login() {
    let ctx = TestContext::new();
    ctx.register("alice", "alice@x.com", "pw1").await;

    let shadow = ctx.register("alice@x.com", "mallory@x.com", "evil").await;
    assert_eq!(shadow.status, StatusCode::BAD_REQUEST);
    assert_eq!(shadow.body["detail"], "Username or email already registered");

    let by_email = ctx.login("alice@x.com", "pw1").await;
    assert_eq!(by_email.status, StatusCode::OK);
    assert_eq!(by_email.body["user"]["username"], "alice");
    assert_eq!(
        ctx.login("alice@x.com", "evil").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_register_trims_identifiers() {
    let ctx = TestContext::new();
    let response = ctx.register("  alice ", " alice@x.com ", "pw1").await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["username"], "alice");
    assert_eq!(ctx.login("alice", "pw1").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_blank_fields() {
    let ctx = TestContext::new();
    let response = ctx.register("   ", "blank@x.com", "pw").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.state.account_store.count_accounts().unwrap(), 0);
}

#[tokio::test]
async fn test_issued_token_names_the_username() {
    let ctx = TestContext::new();
    ctx.register("alice", "alice@x.com", "pw1").await;

    let login = ctx.login("alice@x.com", "pw1").await;
    let token = login.body["access_token"].as_str().unwrap();

    let subject = ctx.state.jwt_handler.validate(token).unwrap();
    assert_eq!(subject, "alice");
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.register("alice", "alice@x.com", "pw1").await;

    let wrong_password = ctx.login("alice", "bad").await;
    let unknown_user = ctx.login("mallory", "bad").await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_me_with_valid_token() {
    let ctx = TestContext::new();
    let token = ctx.token_for("alice", "alice@x.com", "pw1").await;

    let me = ctx.send(get_with_token("/api/auth/me", &token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "alice");
    assert_eq!(me.body["email"], "alice@x.com");
    assert!(me.body["id"].as_i64().is_some());
}

#[tokio::test]
async fn test_me_rejects_missing_token() {
    let ctx = TestContext::new();
    let request = Request::get("/api/auth/me").body(Body::empty()).unwrap();

    let response = ctx.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers.get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    assert_eq!(response.body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_me_rejects_expired_and_foreign_tokens() {
    let ctx = TestContext::new();
    ctx.register("alice", "alice@x.com", "pw1").await;

    let expired = ctx
        .state
        .jwt_handler
        .issue("alice", Duration::seconds(-5))
        .unwrap();
    let foreign = JwtHandler::new("some-other-secret-entirely".to_string())
        .issue_default("alice")
        .unwrap();

    for token in [expired.as_str(), foreign.as_str(), "not.a.jwt"] {
        let response = ctx.send(get_with_token("/api/auth/me", token)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers.get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}

#[tokio::test]
async fn test_me_rejects_token_for_missing_account() {
    let ctx = TestContext::new();
    let ghost = JwtHandler::new(TEST_SECRET.to_string())
        .issue_default("ghost")
        .unwrap();

    let response = ctx.send(get_with_token("/api/auth/me", &ghost)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();
    let request = Request::get("/api/health").body(Body::empty()).unwrap();

    let response = ctx.send(request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
}
