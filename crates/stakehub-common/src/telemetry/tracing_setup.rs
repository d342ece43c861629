//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.
//! `RUST_LOG` wins when set; otherwise the configured level applies to the
//! workspace crates and the noisier dependencies are held at `warn`.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::Environment;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level for the workspace crates
    pub level: Level,
    /// Enable JSON output format
    pub json: bool,
    /// Include span events (new, close)
    pub span_events: bool,
    /// Include file and line numbers
    pub file_line: bool,
    /// Include thread names
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    /// Create a development configuration with debug logging
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json: false,
            span_events: true,
            file_line: true,
            thread_names: true,
        }
    }

    /// Create a production configuration with JSON logging
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json: true,
            span_events: false,
            file_line: false,
            thread_names: false,
        }
    }

    /// Pick the preset matching the deployment environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{level},sqlx=warn,hyper=warn,tower_http=info",
                level = self.level
            ))
        })
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn try_install(&self) -> Result<(), TryInitError> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        if self.json {
            // JSON format for production/structured logging
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_file(self.file_line)
                        .with_line_number(self.file_line)
                        .with_thread_names(self.thread_names)
                        .with_span_events(self.span_events()),
                )
                .try_init()
        } else {
            // Pretty format for development
            registry
                .with(
                    fmt::layer()
                        .with_file(self.file_line)
                        .with_line_number(self.file_line)
                        .with_thread_names(self.thread_names)
                        .with_span_events(self.span_events()),
                )
                .try_init()
        }
    }
}

/// Initialize the tracing subscriber with default configuration
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init_tracing() {
    init_tracing_with_config(&TracingConfig::default());
}

/// Initialize the tracing subscriber with custom configuration
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init_tracing_with_config(config: &TracingConfig) {
    if let Err(e) = config.try_install() {
        panic!("failed to install tracing subscriber: {e}");
    }
}

/// Try to initialize tracing, returning an error if already initialized
///
/// Unlike `init_tracing`, this function will not panic if called multiple times.
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(&TracingConfig::default())
}

/// Try to initialize tracing with custom configuration
pub fn try_init_tracing_with_config(config: &TracingConfig) -> Result<(), TracingError> {
    config
        .try_install()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
