//! TLS policy derived from the database host

use sqlx::postgres::PgSslMode;

/// Host fragments of managed Postgres providers. Their certificates are
/// issued by private CAs, so the connection is encrypted but not verified.
const MANAGED_HOST_MARKERS: &[&str] = &[
    "supabase.co",
    "supabase.com",
    "neon.tech",
    "amazonaws.com",
    "render.com",
    "railway.app",
    "rlwy.net",
    "ondigitalocean.com",
    "azure.com",
    "aivencloud.com",
];

/// How the pool negotiates TLS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslPolicy {
    /// Try TLS, fall back to plaintext (local development)
    Prefer,
    /// Encrypt without verifying the certificate chain
    Require,
    /// Encrypt and verify both chain and host name
    VerifyFull,
}

impl SslPolicy {
    /// Pick a policy for `host`.
    ///
    /// `reject_unauthorized` only affects self-hosted databases; managed
    /// providers always get `Require`.
    pub fn for_host(host: &str, reject_unauthorized: bool) -> Self {
        let host = host.to_ascii_lowercase();

        if MANAGED_HOST_MARKERS.iter().any(|m| host.contains(m)) {
            Self::Require
        } else if is_local(&host) {
            Self::Prefer
        } else if reject_unauthorized {
            Self::VerifyFull
        } else {
            Self::Require
        }
    }

    pub fn mode(self) -> PgSslMode {
        match self {
            Self::Prefer => PgSslMode::Prefer,
            Self::Require => PgSslMode::Require,
            Self::VerifyFull => PgSslMode::VerifyFull,
        }
    }
}

fn is_local(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]" | "")
        || host.starts_with('/')
        || host.ends_with(".localhost")
}
