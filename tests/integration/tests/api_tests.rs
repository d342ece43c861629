//! Live API tests against PostgreSQL
//!
//! Run with `DATABASE_URL`, `JWT_SECRET` and `JWT_REFRESH_SECRET` set and the
//! migrations applied. Skipped otherwise.
//!
//! The server uses the process-wide pool, which is bound to the runtime that
//! first opens it, so the whole flow lives in one test.

use integration_tests::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_live_admin_flow() -> anyhow::Result<()> {
    if !check_test_env() {
        return Ok(());
    }

    let server = TestServer::start().await?;

    // Health
    let health = server.client.get(server.url("/health")).send().await?;
    assert_eq!(health.status(), StatusCode::OK);
    let ready = server.client.get(server.url("/health/ready")).send().await?;
    assert_eq!(ready.status(), StatusCode::OK);

    let email = unique_email("live-admin");
    let admin_id = seed_db_user(&email, true).await?;

    // Wrong password is recorded and rejected
    let wrong = server
        .client
        .post(server.url("/api/admin/login"))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    // Login stores both cookies in the client's jar
    let login = server
        .client
        .post(server.url("/api/admin/login"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await?;
    assert_eq!(login.status(), StatusCode::OK);
    let body: Value = login.json().await?;
    let session_id = body["sessionId"].as_str().unwrap_or_default().to_string();
    assert!(!session_id.starts_with("fallback_"), "session was not persisted");

    // Cookie-authenticated calls
    let sessions: Value = server
        .client
        .get(server.url("/api/sessions"))
        .send()
        .await?
        .json()
        .await?;
    assert!(sessions["sessions"]
        .as_array()
        .is_some_and(|s| s.iter().any(|s| s["id"] == session_id.as_str())));

    let report = server
        .client
        .get(server.url("/api/admin/security/report"))
        .send()
        .await?;
    assert_eq!(report.status(), StatusCode::OK);

    let audit: Value = server
        .client
        .get(server.url(&format!("/api/admin/audit-logs?userId={admin_id}")))
        .send()
        .await?
        .json()
        .await?;
    assert!(audit["logs"]
        .as_array()
        .is_some_and(|logs| logs.iter().any(|l| l["action"] == "LOGIN_SUCCESS")));

    // Refresh rotates the session and replaces the cookies
    let refresh = server
        .client
        .post(server.url("/api/auth/refresh"))
        .send()
        .await?;
    assert_eq!(refresh.status(), StatusCode::OK);

    let sessions: Value = server
        .client
        .get(server.url("/api/sessions"))
        .send()
        .await?
        .json()
        .await?;
    assert!(sessions["sessions"]
        .as_array()
        .is_some_and(|s| s.iter().all(|s| s["id"] != session_id.as_str())));

    // Logout clears the cookies; the jar no longer authenticates
    let logout = server
        .client
        .post(server.url("/api/admin/logout"))
        .send()
        .await?;
    assert_eq!(logout.status(), StatusCode::OK);

    let after = server.client.get(server.url("/api/sessions")).send().await?;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);

    delete_db_user(&admin_id).await?;
    Ok(())
}
