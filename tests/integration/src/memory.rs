//! In-memory repository implementations
//!
//! Each repository can be switched into a failing mode to exercise the
//! failure policies of the services (fail-open, fail-soft, fallback).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use stakehub_common::JwtService;
use stakehub_core::entities::{
    AuditLog, AuditLogFilter, BlockingCounts, BotActivation, BotType, DailyLoginStats,
    NewAuditLog, NewLoginAttempt, NewSession, Session, SessionStats, User,
};
use stakehub_core::traits::{
    AuditLogRepository, BotActivationRepository, LoginAttemptRepository,
    ReferralCounterRepository, RepoResult, SessionRepository, UserRepository,
};
use stakehub_core::DomainError;
use stakehub_db::AdmissionGate;
use stakehub_service::{ServiceContext, ServiceContextBuilder};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Switch that makes a repository return database errors
#[derive(Debug, Default)]
pub struct FailSwitch(AtomicBool);

impl FailSwitch {
    pub fn set(&self, failing: bool) {
        self.0.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.0.load(Ordering::SeqCst) {
            Err(DomainError::DatabaseError("connection refused (injected)".into()))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<String, (User, Option<String>)>>,
    pub fail: FailSwitch,
}

impl MemoryUserRepository {
    pub fn insert(&self, user: User, password_hash: Option<String>) {
        lock(&self.users).insert(user.id.clone(), (user, password_hash));
    }

    pub fn set_active(&self, id: &str, active: bool) {
        if let Some((user, _)) = lock(&self.users).get_mut(id) {
            user.is_active = active;
        }
    }

    pub fn get(&self, id: &str) -> Option<User> {
        lock(&self.users).get(id).map(|(u, _)| u.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        self.fail.check()?;
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.fail.check()?;
        Ok(lock(&self.users)
            .values()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email))
            .map(|(u, _)| u.clone()))
    }

    async fn get_password_hash(&self, id: &str) -> RepoResult<Option<String>> {
        self.fail.check()?;
        Ok(lock(&self.users).get(id).and_then(|(_, h)| h.clone()))
    }

    async fn is_active(&self, id: &str) -> RepoResult<Option<bool>> {
        self.fail.check()?;
        Ok(lock(&self.users).get(id).map(|(u, _)| u.is_active))
    }

    async fn referral_code_exists(&self, code: &str) -> RepoResult<bool> {
        self.fail.check()?;
        Ok(lock(&self.users)
            .values()
            .any(|(u, _)| u.referral_code.as_deref() == Some(code)))
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> RepoResult<()> {
        self.fail.check()?;
        if let Some((user, _)) = lock(&self.users).get_mut(id) {
            user.last_login_at = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }
}

// ============================================================================
// Login attempts
// ============================================================================

#[derive(Debug, Clone)]
pub struct StoredAttempt {
    pub attempt: NewLoginAttempt,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryLoginAttemptRepository {
    attempts: Mutex<Vec<StoredAttempt>>,
    pub fail: FailSwitch,
}

impl MemoryLoginAttemptRepository {
    pub fn all(&self) -> Vec<StoredAttempt> {
        lock(&self.attempts).clone()
    }

    /// Insert an attempt with an explicit timestamp
    pub fn push_at(&self, attempt: NewLoginAttempt, created_at: DateTime<Utc>) {
        lock(&self.attempts).push(StoredAttempt {
            attempt,
            created_at,
        });
    }
}

#[async_trait]
impl LoginAttemptRepository for MemoryLoginAttemptRepository {
    async fn record(&self, attempt: &NewLoginAttempt) -> RepoResult<i64> {
        self.fail.check()?;
        let mut attempt = attempt.clone();
        attempt.email = attempt.email.to_lowercase();
        let mut attempts = lock(&self.attempts);
        attempts.push(StoredAttempt {
            attempt,
            created_at: Utc::now(),
        });
        Ok(attempts.len() as i64)
    }

    async fn blocking_counts(
        &self,
        email: &str,
        ip_address: &str,
        window_minutes: i64,
    ) -> RepoResult<BlockingCounts> {
        self.fail.check()?;
        let since = Utc::now() - Duration::minutes(window_minutes);
        let email = email.to_lowercase();

        let attempts = lock(&self.attempts);
        let failed: Vec<_> = attempts
            .iter()
            .filter(|a| !a.attempt.success && a.created_at > since)
            .collect();

        let by_email = |a: &&&StoredAttempt| a.attempt.email == email;
        let by_ip = |a: &&&StoredAttempt| a.attempt.ip_address == ip_address;

        Ok(BlockingCounts {
            email_failures: failed.iter().filter(by_email).count() as i64,
            ip_failures: failed.iter().filter(by_ip).count() as i64,
            last_attempt_at: failed
                .iter()
                .filter(|a| by_email(a) || by_ip(a))
                .map(|a| a.created_at)
                .max(),
        })
    }

    async fn daily_stats(&self, days_back: i32) -> RepoResult<Vec<DailyLoginStats>> {
        self.fail.check()?;
        let since = Utc::now() - Duration::days(i64::from(days_back));

        let attempts = lock(&self.attempts);
        let mut days: HashMap<NaiveDate, Vec<&StoredAttempt>> = HashMap::new();
        for a in attempts.iter().filter(|a| a.created_at >= since) {
            days.entry(a.created_at.date_naive()).or_default().push(a);
        }

        let mut stats: Vec<DailyLoginStats> = days
            .into_iter()
            .map(|(date, rows)| {
                let total = rows.len() as i64;
                let ok = rows.iter().filter(|a| a.attempt.success).count() as i64;
                let ips: HashSet<_> = rows.iter().map(|a| &a.attempt.ip_address).collect();
                let emails: HashSet<_> = rows.iter().map(|a| &a.attempt.email).collect();
                DailyLoginStats {
                    date,
                    total_attempts: total,
                    successful_attempts: ok,
                    failed_attempts: total - ok,
                    unique_ips: ips.len() as i64,
                    unique_emails: emails.len() as i64,
                    success_rate: (ok as f64 * 10_000.0 / total as f64).round() / 100.0,
                }
            })
            .collect();
        stats.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(stats)
    }

    async fn cleanup(&self, days_to_keep: i32) -> RepoResult<u64> {
        self.fail.check()?;
        let cutoff = Utc::now() - Duration::days(i64::from(days_to_keep));
        let mut attempts = lock(&self.attempts);
        let before = attempts.len();
        attempts.retain(|a| a.created_at >= cutoff);
        Ok((before - attempts.len()) as u64)
    }
}

// ============================================================================
// Sessions
// ============================================================================

#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    sessions: Mutex<HashMap<String, Session>>,
    pub fail: FailSwitch,
}

impl MemorySessionRepository {
    pub fn get(&self, id: &str) -> Option<Session> {
        lock(&self.sessions).get(id).cloned()
    }

    pub fn all(&self) -> Vec<Session> {
        lock(&self.sessions).values().cloned().collect()
    }

    pub fn insert(&self, session: Session) {
        lock(&self.sessions).insert(session.id.clone(), session);
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, new: &NewSession) -> RepoResult<Session> {
        self.fail.check()?;
        let now = Utc::now();
        let session = Session {
            id: new.session_id.clone(),
            user_id: new.user_id.clone(),
            token_hash: new.token_hash.clone(),
            refresh_token_hash: new.refresh_token_hash.clone(),
            ip_address: new.ip_address.clone(),
            user_agent: new.user_agent.clone(),
            is_active: true,
            created_at: now,
            last_used_at: now,
            expires_at: new.expires_at,
        };
        self.insert(session.clone());
        Ok(session)
    }

    async fn validate(&self, token_hash: &str) -> RepoResult<Option<Session>> {
        self.fail.check()?;
        let now = Utc::now();
        Ok(lock(&self.sessions)
            .values_mut()
            .find(|s| s.token_hash == token_hash && s.is_active && !s.is_expired_at(now))
            .map(|s| {
                s.last_used_at = now;
                s.clone()
            }))
    }

    async fn revoke(&self, session_id: &str) -> RepoResult<bool> {
        self.fail.check()?;
        Ok(lock(&self.sessions)
            .get_mut(session_id)
            .map(|s| s.is_active = false)
            .is_some())
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> RepoResult<u64> {
        self.fail.check()?;
        let mut count = 0;
        for s in lock(&self.sessions)
            .values_mut()
            .filter(|s| s.user_id == user_id && s.is_active)
        {
            s.is_active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn revoke_others(&self, user_id: &str, except_session_id: &str) -> RepoResult<u64> {
        self.fail.check()?;
        let mut count = 0;
        for s in lock(&self.sessions)
            .values_mut()
            .filter(|s| s.user_id == user_id && s.is_active && s.id != except_session_id)
        {
            s.is_active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Session>> {
        self.fail.check()?;
        let now = Utc::now();
        let mut sessions: Vec<_> = lock(&self.sessions)
            .values()
            .filter(|s| s.user_id == user_id && s.is_active && !s.is_expired_at(now))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(sessions)
    }

    async fn cleanup_expired(&self) -> RepoResult<u64> {
        self.fail.check()?;
        let now = Utc::now();
        let mut count = 0;
        for s in lock(&self.sessions)
            .values_mut()
            .filter(|s| s.is_active && s.is_expired_at(now))
        {
            s.is_active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn stats(&self) -> RepoResult<SessionStats> {
        self.fail.check()?;
        let now = Utc::now();
        let sessions = lock(&self.sessions);
        let active: Vec<_> = sessions
            .values()
            .filter(|s| s.is_active && !s.is_expired_at(now))
            .collect();
        Ok(SessionStats {
            total_sessions: sessions.len() as i64,
            active_sessions: active.len() as i64,
            expired_sessions: sessions.values().filter(|s| s.is_expired_at(now)).count() as i64,
            unique_users: active.iter().map(|s| &s.user_id).collect::<HashSet<_>>().len() as i64,
        })
    }
}

// ============================================================================
// Audit log
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryAuditLogRepository {
    entries: Mutex<Vec<AuditLog>>,
    next_id: AtomicI64,
    pub fail: FailSwitch,
}

impl MemoryAuditLogRepository {
    pub fn all(&self) -> Vec<AuditLog> {
        lock(&self.entries).clone()
    }

    pub fn actions(&self) -> Vec<String> {
        lock(&self.entries).iter().map(|e| e.action.clone()).collect()
    }
}

#[async_trait]
impl AuditLogRepository for MemoryAuditLogRepository {
    async fn insert(&self, entry: &NewAuditLog) -> RepoResult<i64> {
        self.fail.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.entries).push(AuditLog {
            id,
            user_id: entry.user_id.clone(),
            action: entry.action.clone(),
            details: entry.details.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            severity: entry.severity,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find(&self, filter: &AuditLogFilter) -> RepoResult<Vec<AuditLog>> {
        self.fail.check()?;
        let mut rows: Vec<_> = lock(&self.entries)
            .iter()
            .filter(|e| filter.user_id.as_ref().map_or(true, |u| e.user_id.as_ref() == Some(u)))
            .filter(|e| filter.action.as_ref().map_or(true, |a| &e.action == a))
            .filter(|e| filter.severity.map_or(true, |s| e.severity == s))
            .filter(|e| filter.from.map_or(true, |f| e.created_at >= f))
            .filter(|e| filter.to.map_or(true, |t| e.created_at <= t))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(rows
            .into_iter()
            .skip(filter.effective_offset() as usize)
            .take(filter.effective_limit() as usize)
            .collect())
    }

    async fn ensure_schema(&self) -> RepoResult<()> {
        self.fail.check()
    }
}

// ============================================================================
// Bots and referrals
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryBotActivationRepository {
    activations: Mutex<Vec<BotActivation>>,
    pub fail: FailSwitch,
}

impl MemoryBotActivationRepository {
    pub fn insert(&self, activation: BotActivation) {
        lock(&self.activations).push(activation);
    }
}

#[async_trait]
impl BotActivationRepository for MemoryBotActivationRepository {
    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<BotActivation>> {
        self.fail.check()?;
        let mut rows: Vec<_> = lock(&self.activations)
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.activated_at.cmp(&a.activated_at));
        Ok(rows)
    }

    async fn find_active(
        &self,
        user_id: &str,
        bot_type: BotType,
    ) -> RepoResult<Option<BotActivation>> {
        self.fail.check()?;
        let now = Utc::now();
        Ok(lock(&self.activations)
            .iter()
            .find(|a| a.user_id == user_id && a.bot_type == bot_type && a.is_current(now))
            .cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryReferralCounterRepository {
    counters: Mutex<HashMap<String, i64>>,
    pub fail: FailSwitch,
}

#[async_trait]
impl ReferralCounterRepository for MemoryReferralCounterRepository {
    async fn next_value(&self, counter_type: &str) -> RepoResult<i64> {
        self.fail.check()?;
        let mut counters = lock(&self.counters);
        let value = counters.entry(counter_type.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn current_value(&self, counter_type: &str) -> RepoResult<Option<i64>> {
        self.fail.check()?;
        Ok(lock(&self.counters).get(counter_type).copied())
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// One of each in-memory repository, shared with the context built from it
#[derive(Debug, Clone, Default)]
pub struct MemoryRepos {
    pub users: Arc<MemoryUserRepository>,
    pub attempts: Arc<MemoryLoginAttemptRepository>,
    pub sessions: Arc<MemorySessionRepository>,
    pub audit: Arc<MemoryAuditLogRepository>,
    pub bots: Arc<MemoryBotActivationRepository>,
    pub referrals: Arc<MemoryReferralCounterRepository>,
}

impl MemoryRepos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-wired with these repositories
    pub fn builder(&self, jwt: JwtService) -> ServiceContextBuilder {
        ServiceContextBuilder::new()
            .user_repo(self.users.clone())
            .login_attempt_repo(self.attempts.clone())
            .session_repo(self.sessions.clone())
            .audit_log_repo(self.audit.clone())
            .bot_repo(self.bots.clone())
            .referral_repo(self.referrals.clone())
            .jwt_service(Arc::new(jwt))
            .admission(AdmissionGate::new(4, std::time::Duration::from_secs(5)))
    }

    /// Service context over these repositories
    ///
    /// # Errors
    /// Never in practice; every dependency is supplied
    pub fn context(&self, jwt: JwtService) -> anyhow::Result<ServiceContext> {
        Ok(self.builder(jwt).build()?)
    }
}
