//! Service-layer behavior over in-memory repositories

use std::collections::HashSet;

use chrono::{Duration, Utc};
use integration_tests::*;
use stakehub_core::entities::{
    actions, AuditSeverity, LoginFailureReason, NewAuditLog, NewLoginAttempt, NewSession, Session,
    USER_REFERRAL_COUNTER,
};
use stakehub_core::traits::ReferralCounterRepository;
use stakehub_service::{
    spawn_audit_log, ClientContext, LoginSecurityService, ReferralService, ServiceError,
    SessionService,
};

fn new_session(user_id: &str, token: &str) -> NewSession {
    NewSession {
        session_id: SessionService::generate_session_id(),
        user_id: user_id.to_string(),
        token_hash: stakehub_common::hash_token(token),
        refresh_token_hash: None,
        ip_address: Some("10.1.1.1".to_string()),
        user_agent: None,
        expires_at: Utc::now() + Duration::days(7),
    }
}

#[tokio::test]
async fn test_check_blocking_fails_open() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();
    let security = LoginSecurityService::new(&ctx);

    for _ in 0..6 {
        security
            .record_attempt(&NewLoginAttempt::failure(
                "victim@stakehub.test",
                "10.0.0.9",
                None,
                LoginFailureReason::InvalidPassword,
            ))
            .await
            .unwrap();
    }
    assert!(security.check_blocking("victim@stakehub.test", "10.0.0.9").await.is_blocked);

    repos.attempts.fail.set(true);
    let status = security.check_blocking("victim@stakehub.test", "10.0.0.9").await;
    assert!(!status.is_blocked);
    assert_eq!(status.failed_attempts, 0);

    // Recording surfaces the error to the caller
    let recorded = security
        .record_attempt(&NewLoginAttempt::success("victim@stakehub.test", "10.0.0.9", None))
        .await;
    assert!(recorded.is_err());
}

#[tokio::test]
async fn test_block_until_follows_last_failure() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();

    let last = Utc::now() - Duration::minutes(3);
    for offset in [12, 10, 8, 6, 4, 3] {
        repos.attempts.push_at(
            NewLoginAttempt::failure(
                "target@stakehub.test",
                "10.0.0.2",
                None,
                LoginFailureReason::InvalidPassword,
            ),
            Utc::now() - Duration::minutes(offset),
        );
    }

    let status = LoginSecurityService::new(&ctx)
        .check_blocking("TARGET@stakehub.test", "10.9.9.9")
        .await;
    assert!(status.is_blocked);
    assert_eq!(status.failed_attempts, 6);

    let until = status.block_until.unwrap();
    let expected = last + Duration::minutes(15);
    assert!((until - expected).num_seconds().abs() < 5);
}

#[tokio::test]
async fn test_create_session_falls_back_to_ephemeral() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();
    let sessions = SessionService::new(&ctx);

    let persisted = sessions.create_session(new_session("u1", "t1")).await;
    assert!(persisted.is_persisted());

    repos.sessions.fail.set(true);
    let fallback = sessions.create_session(new_session("u1", "t2")).await;
    assert!(!fallback.is_persisted());
    assert!(fallback.session().id.starts_with("fallback_"));
    assert!(fallback.session().is_ephemeral());
    assert_eq!(repos.sessions.all().len(), 1);
}

#[tokio::test]
async fn test_session_validation_fails_closed() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();
    let sessions = SessionService::new(&ctx);

    sessions.create_session(new_session("u1", "live-token")).await;
    let hash = stakehub_common::hash_token("live-token");
    assert!(sessions.validate_session(&hash).await.is_some());

    repos.sessions.fail.set(true);
    assert!(sessions.validate_session(&hash).await.is_none());

    // Bookkeeping fails soft
    assert!(sessions.get_user_sessions("u1").await.is_empty());
    assert_eq!(sessions.revoke_all_user_sessions("u1").await, 0);
    assert_eq!(sessions.cleanup_expired_sessions().await, 0);
    assert_eq!(sessions.get_session_stats().await.total_sessions, 0);
}

fn stored_session(id: &str, active: bool, expires_in: Duration) -> Session {
    let now = Utc::now();
    Session {
        id: id.to_string(),
        user_id: "u1".to_string(),
        token_hash: stakehub_common::hash_token(id),
        refresh_token_hash: None,
        ip_address: None,
        user_agent: None,
        is_active: active,
        created_at: now - Duration::days(2),
        last_used_at: now - Duration::days(1),
        expires_at: now + expires_in,
    }
}

#[tokio::test]
async fn test_maintenance_keeps_session_history() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();

    repos.sessions.insert(stored_session("live", true, Duration::days(1)));
    repos.sessions.insert(stored_session("revoked", false, Duration::days(1)));
    repos.sessions.insert(stored_session("stale", true, -Duration::hours(1)));

    let result = stakehub_service::AdminService::new(&ctx)
        .run_maintenance(30, "admin-1", &ClientContext::default())
        .await
        .unwrap();
    assert_eq!(result.expired_sessions, 1);

    // Nothing is deleted; only the stale session changed state
    assert_eq!(repos.sessions.all().len(), 3);
    assert!(repos.sessions.get("live").unwrap().is_active);
    assert!(!repos.sessions.get("revoked").unwrap().is_active);
    assert!(!repos.sessions.get("stale").unwrap().is_active);

    let stats = SessionService::new(&ctx).get_session_stats().await;
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.expired_sessions, 1);
    assert_eq!(stats.active_sessions, 1);

    // A second sweep finds nothing new
    assert_eq!(SessionService::new(&ctx).cleanup_expired_sessions().await, 0);
}

#[tokio::test]
async fn test_request_session_checks_token_binding() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();
    let sessions = SessionService::new(&ctx);

    sessions.create_session(new_session("u1", "opaque-token")).await;

    let by_header = sessions
        .validate_request_session(Some("Bearer opaque-token"), None)
        .await;
    assert!(by_header.is_valid);
    assert_eq!(by_header.user_id.as_deref(), Some("u1"));

    let by_cookie = sessions
        .validate_request_session(Some("Bearer other"), Some("opaque-token"))
        .await;
    assert!(by_cookie.is_valid);

    let missing = sessions.validate_request_session(None, Some("")).await;
    assert!(!missing.is_valid);

    let not_bearer = sessions
        .validate_request_session(Some("Basic opaque-token"), None)
        .await;
    assert!(!not_bearer.is_valid);
}

#[tokio::test]
async fn test_concurrent_referral_codes_are_distinct() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let ctx = ctx.clone();
            tokio::spawn(async move { ReferralService::new(&ctx).get_next_referral_code().await })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        let code = handle.await.unwrap().unwrap();
        assert!(code.starts_with("SH"));
        codes.insert(code);
    }
    assert_eq!(codes.len(), 20);
    assert!(codes.contains("SH000001"));
    assert!(codes.contains("SH000020"));

    // One increment per allocation, none lost
    let current = repos.referrals.current_value(USER_REFERRAL_COUNTER).await.unwrap();
    assert_eq!(current, Some(20));
}

#[tokio::test]
async fn test_referral_collision_gets_suffix() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();

    let mut taken = regular_user(&unique_email("taken"));
    taken.referral_code = Some("SH000001".to_string());
    repos.users.insert(taken, None);

    let code = ReferralService::new(&ctx).get_next_referral_code().await.unwrap();
    assert_eq!(code.len(), "SH000001".len() + 3);
    assert!(code.starts_with("SH000001"));
    assert!(code[8..].chars().all(|c| c.is_ascii_hexdigit()));

    repos.referrals.fail.set(true);
    let err = ReferralService::new(&ctx).get_next_referral_code().await.unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_spawned_audit_write() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();

    let entry = NewAuditLog::new(actions::SESSIONS_REVOKED, AuditSeverity::Medium)
        .user("admin-1")
        .details(serde_json::json!({ "targetUserId": "u9" }))
        .client(Some("10.0.0.1".to_string()), None);
    let id = spawn_audit_log(ctx.clone(), entry).await.unwrap();
    assert!(id.is_some());

    let stored = repos.audit.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].details["targetUserId"], "u9");

    repos.audit.fail.set(true);
    let failed = spawn_audit_log(
        ctx,
        NewAuditLog::new(actions::LOGOUT, AuditSeverity::Low),
    )
    .await
    .unwrap();
    assert!(failed.is_none());
}

#[tokio::test]
async fn test_maintenance_propagates_attempt_cleanup_failure() {
    let repos = MemoryRepos::new();
    let ctx = repos.context(test_jwt()).unwrap();
    let client = ClientContext::default();

    repos.attempts.fail.set(true);
    let result = stakehub_service::AdminService::new(&ctx)
        .run_maintenance(30, "admin-1", &client)
        .await;
    assert!(matches!(result, Err(ServiceError::Domain(_))));
}
