use axum::{extract::FromRequestParts, http::{request::Parts, HeaderMap}};
use std::convert::Infallible;

/// Best-effort client address for rate limiting: first `X-Forwarded-For`
/// hop, then `X-Real-IP`, then `"unknown"`.
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = header(&parts.headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| header(&parts.headers, "x-real-ip"))
            .unwrap_or("unknown")
            .to_string();

        Ok(ClientAddr(addr))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
