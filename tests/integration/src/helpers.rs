//! Test helpers
//!
//! `TestApp` drives the router in-process over in-memory repositories.
//! `TestServer` runs the real server against the database named by
//! `DATABASE_URL`.

use std::time::Duration;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use reqwest::Client;
use serde_json::Value;
use stakehub_api::{create_app, create_app_state, AppState};
use stakehub_common::{generate_session_id, hash_token, AppConfig, TokenPayload};
use stakehub_core::entities::{Session, User};
use stakehub_service::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use crate::fixtures::{memory_config, test_jwt, test_password_hash, TEST_PASSWORD};
use crate::memory::MemoryRepos;

// ============================================================================
// In-process app
// ============================================================================

/// Router over in-memory repositories
pub struct TestApp {
    pub repos: MemoryRepos,
    pub state: AppState,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_builder(|b| b)
    }

    /// Customize the service context before the app is built
    pub fn with_builder(customize: impl FnOnce(ServiceContextBuilder) -> ServiceContextBuilder) -> Self {
        let repos = MemoryRepos::new();
        let ctx = customize(repos.builder(test_jwt()))
            .build()
            .expect("service context");
        let state = AppState::new(ctx, memory_config());
        let router = create_app(state.clone()).expect("router");
        Self {
            repos,
            state,
            router,
        }
    }

    pub fn context(&self) -> &ServiceContext {
        self.state.service_context()
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            builder: Request::builder().method(method).uri(path),
            body: Body::empty(),
        }
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Store a user whose password is [`TEST_PASSWORD`]
    pub fn seed_user(&self, user: User) -> User {
        self.repos
            .users
            .insert(user.clone(), Some(test_password_hash()));
        user
    }

    /// Log in through the API and return the issued credentials
    pub async fn login(&self, email: &str) -> LoginOutcome {
        let response = self
            .post("/api/admin/login")
            .json(&serde_json::json!({ "email": email, "password": TEST_PASSWORD }))
            .send()
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

        LoginOutcome {
            token: response.body["token"].as_str().unwrap_or_default().to_string(),
            refresh_token: response.cookie("refreshToken").unwrap_or_default(),
            session_id: response.body["sessionId"].as_str().unwrap_or_default().to_string(),
        }
    }

    /// Store a live session for `user` directly and return a matching token
    pub fn issue_session(&self, user: &User) -> String {
        let session_id = generate_session_id();
        let token = self
            .state
            .jwt_service()
            .generate_token(&TokenPayload {
                user_id: user.id.clone(),
                email: user.email.clone(),
                is_admin: user.is_admin,
                session_id: Some(session_id.clone()),
            })
            .expect("token");

        let now = chrono::Utc::now();
        self.repos.sessions.insert(Session {
            id: session_id,
            user_id: user.id.clone(),
            token_hash: hash_token(&token),
            refresh_token_hash: None,
            ip_address: None,
            user_agent: None,
            is_active: true,
            created_at: now,
            last_used_at: now,
            expires_at: now + chrono::Duration::days(1),
        });
        token
    }
}

/// Credentials returned by a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub refresh_token: String,
    pub session_id: String,
}

/// Request under construction against a [`TestApp`]
pub struct TestRequest<'a> {
    app: &'a TestApp,
    builder: axum::http::request::Builder,
    body: Body,
}

impl TestRequest<'_> {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {token}"))
    }

    pub fn cookie(self, name: &str, value: &str) -> Self {
        self.header("cookie", &format!("{name}={value}"))
    }

    pub fn json(mut self, value: &Value) -> Self {
        let body = value.to_string();
        self.builder = self
            .builder
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len());
        self.body = Body::from(body);
        self
    }

    pub async fn send(self) -> TestResponse {
        let request = self.builder.body(self.body).expect("request");
        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Collected response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Raw `Set-Cookie` values
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// Value of a cookie set by this response
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.set_cookies().into_iter().find_map(|c| {
            c.split(';')
                .next()
                .and_then(|pair| pair.strip_prefix(&prefix))
                .map(str::to_string)
        })
    }
}

// ============================================================================
// Live server
// ============================================================================

/// Real server on an ephemeral port
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with_config(AppConfig::from_env()?).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: format!("http://{addr}"),
            client,
            _handle: handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Live tests need a database and signing secrets
pub fn check_test_env() -> bool {
    for key in ["DATABASE_URL", "JWT_SECRET", "JWT_REFRESH_SECRET"] {
        if std::env::var(key).is_err() {
            eprintln!("Skipping test: {key} not set");
            return false;
        }
    }
    true
}

/// Insert a user straight into the database, returning its id
pub async fn seed_db_user(email: &str, is_admin: bool) -> Result<String> {
    let pool = sqlx::PgPool::connect(&std::env::var("DATABASE_URL")?).await?;
    let id = format!("it-{}", uuid::Uuid::new_v4().simple());

    sqlx::query(
        "INSERT INTO users (id, email, username, password, is_admin) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&id)
    .bind(email)
    .bind(&id)
    .bind(test_password_hash())
    .bind(is_admin)
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(id)
}

/// Remove a seeded user; sessions cascade
pub async fn delete_db_user(id: &str) -> Result<()> {
    let pool = sqlx::PgPool::connect(&std::env::var("DATABASE_URL")?).await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    pool.close().await;
    Ok(())
}
