//! Auth module tests: login, gate, logout and the session probe.

use anyhow::{Context, Result};
use axum::http::{Method, StatusCode};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::{Value, json};

use super::{password::hash_password, seed_admin};
use crate::{
    api::test_support::{
        TestApp, TestResponse, admin_cookie, cookie_token, request, send, session_cookie,
        test_app,
    },
    store::{Role, User},
};

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin-password";

async fn app_with_accounts() -> Result<TestApp> {
    let app = test_app()?;
    seed_admin(
        &*app.store,
        ADMIN_EMAIL,
        &SecretString::from(ADMIN_PASSWORD),
    )
    .await?;

    let mut fan = User::new("fan@example.com".to_string(), Role::User, Utc::now());
    fan.password_hash = Some(hash_password("fan-password")?);
    app.store.insert_user(&fan).await?;

    let contact_only = User::new("+4712345678".to_string(), Role::User, Utc::now());
    app.store.insert_user(&contact_only).await?;
    Ok(app)
}

async fn login(app: &TestApp, body: &Value) -> Result<TestResponse> {
    send(
        &app.router,
        request(Method::POST, "/api/admin/login", Some(body), None)?,
    )
    .await
}

#[tokio::test]
async fn login_requires_both_fields() -> Result<()> {
    let app = test_app()?;
    for body in [
        json!({}),
        json!({ "email": ADMIN_EMAIL }),
        json!({ "password": ADMIN_PASSWORD }),
        json!({ "email": "   ", "password": ADMIN_PASSWORD }),
    ] {
        let response = login(&app, &body).await?;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json["error"], "Email and password are required");
        assert!(response.set_cookie().is_none());
    }
    Ok(())
}

#[tokio::test]
async fn credential_failures_are_indistinguishable() -> Result<()> {
    let app = app_with_accounts().await?;
    let unknown = login(
        &app,
        &json!({ "email": "nobody@example.com", "password": "x" }),
    )
    .await?;
    let wrong_password = login(
        &app,
        &json!({ "email": ADMIN_EMAIL, "password": "not-the-password" }),
    )
    .await?;
    let no_hash = login(&app, &json!({ "email": "+4712345678", "password": "x" })).await?;

    for response in [&unknown, &wrong_password, &no_hash] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.set_cookie().is_none());
    }
    assert_eq!(unknown.text, wrong_password.text);
    assert_eq!(unknown.text, no_hash.text);
    assert_eq!(unknown.json["message"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn non_admin_with_correct_password_is_unauthorized() -> Result<()> {
    let app = app_with_accounts().await?;
    let response = login(
        &app,
        &json!({ "email": "fan@example.com", "password": "fan-password" }),
    )
    .await?;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json["message"], "Unauthorized");
    assert!(response.set_cookie().is_none());
    Ok(())
}

#[tokio::test]
async fn admin_login_sets_day_long_cookie() -> Result<()> {
    let app = app_with_accounts().await?;
    let before = Utc::now().timestamp();
    let response = login(
        &app,
        &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["message"], "Login successful");

    let cookie = response.set_cookie().context("login sets a cookie")?;
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=86400"));

    let token = cookie_token(cookie).context("cookie carries a token")?;
    let claims = app.auth_state.codec().decode(token, before)?;
    assert_eq!(claims.user.email, ADMIN_EMAIL);
    assert_eq!(claims.user.role, Role::Admin);
    assert_eq!(claims.user.name.as_deref(), Some("Admin User"));
    assert!(claims.exp >= before + 86_400);
    Ok(())
}

#[tokio::test]
async fn gate_lets_login_page_through() -> Result<()> {
    let app = test_app()?;
    let response = send(
        &app.router,
        request(Method::GET, "/admin/login", None, None)?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("Sign in"));
    assert!(response.set_cookie().is_none());

    let response = send(
        &app.router,
        request(Method::GET, "/admin/login", None, Some("session=garbage"))?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn gate_redirects_without_valid_session() -> Result<()> {
    let app = test_app()?;
    let expired = session_cookie(&app.auth_state, Role::Admin, -10)?;
    let non_admin = session_cookie(&app.auth_state, Role::User, 3600)?;

    let edit_page = format!("/admin/events/{}/edit", uuid::Uuid::now_v7());
    for path in [
        "/admin",
        "/admin/",
        "/admin/events",
        "/admin/enquiries",
        edit_page.as_str(),
        "/admin/settings",
        "/admin/events/unknown/deeper",
    ] {
        for cookie in [None, Some("session=garbage"), Some(expired.as_str()), Some(non_admin.as_str())] {
            let response = send(&app.router, request(Method::GET, path, None, cookie)?).await?;
            assert_eq!(response.status, StatusCode::SEE_OTHER, "{path} {cookie:?}");
            assert_eq!(response.location(), Some("/admin/login"));
            // The rejected cookie is left alone.
            assert!(response.set_cookie().is_none());
        }
    }
    Ok(())
}

#[tokio::test]
async fn gate_slides_session_expiry() -> Result<()> {
    let app = test_app()?;
    let now = Utc::now().timestamp();
    let cookie = session_cookie(&app.auth_state, Role::Admin, 60)?;

    let response = send(
        &app.router,
        request(Method::GET, "/admin/events", None, Some(&cookie))?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("Events"));

    let reissued = response.set_cookie().context("gate re-issues the cookie")?;
    assert!(reissued.contains("Max-Age=86400"));
    let token = cookie_token(reissued).context("cookie carries a token")?;
    let claims = app.auth_state.codec().decode(token, now)?;
    assert!(claims.exp > now + 60);
    assert!(claims.exp >= now + 86_400);
    assert_eq!(claims.user.role, Role::Admin);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let app = test_app()?;
    let cookie = admin_cookie(&app.auth_state)?;
    let response = send(
        &app.router,
        request(Method::POST, "/api/admin/logout", None, Some(&cookie))?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let cleared = response.set_cookie().context("logout sets a cookie")?;
    assert!(cleared.starts_with("session=;"));
    assert!(cleared.contains("Max-Age=0"));

    // Without a cookie logout still answers 204.
    let response = send(
        &app.router,
        request(Method::POST, "/api/admin/logout", None, None)?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn session_probe_reports_admin_only() -> Result<()> {
    let app = test_app()?;
    let response = send(
        &app.router,
        request(Method::GET, "/api/admin/session", None, None)?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let user_cookie = session_cookie(&app.auth_state, Role::User, 3600)?;
    let response = send(
        &app.router,
        request(Method::GET, "/api/admin/session", None, Some(&user_cookie))?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let cookie = admin_cookie(&app.auth_state)?;
    let response = send(
        &app.router,
        request(Method::GET, "/api/admin/session", None, Some(&cookie))?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["role"], "admin");
    assert_eq!(response.json["email"], "admin@example.com");
    Ok(())
}

#[tokio::test]
async fn gate_serves_edit_page_and_unknown_admin_paths() -> Result<()> {
    let app = test_app()?;
    let cookie = admin_cookie(&app.auth_state)?;
    let id = uuid::Uuid::now_v7();

    let response = send(
        &app.router,
        request(
            Method::GET,
            &format!("/admin/events/{id}/edit"),
            None,
            Some(&cookie),
        )?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains(&format!(r#"data-event-id="{id}""#)));
    assert!(response.set_cookie().is_some());

    let response = send(
        &app.router,
        request(Method::GET, "/admin/settings", None, Some(&cookie))?,
    )
    .await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.set_cookie().is_some());
    Ok(())
}
