//! Caller address and user agent

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};
use stakehub_service::ClientContext;

/// Proxy headers consulted for the caller address, most trusted first
const IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Resolve the caller address from proxy headers. For `x-forwarded-for`
/// only the first hop counts.
pub fn client_ip(headers: &HeaderMap) -> String {
    IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name)?.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|ip| !ip.is_empty())
        .map_or_else(|| ClientContext::UNKNOWN_IP.to_string(), str::to_string)
}

/// Request metadata for login history and audit entries
#[derive(Debug, Clone)]
pub struct ClientInfo(pub ClientContext);

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Self(ClientContext::new(client_ip(&parts.headers), user_agent)))
    }
}
