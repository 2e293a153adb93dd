//! Best-effort client IP extraction.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

/// Extracts the client IP for the visit log.
///
/// When the service runs behind a trusted reverse proxy (`behind_proxy`), the
/// leftmost parseable entry of `X-Forwarded-For` wins, then `X-Real-IP`.
/// Otherwise, and as the fallback, the socket peer address is used. Headers
/// that do not parse as an IP are ignored rather than recorded verbatim.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> Option<String> {
    if behind_proxy {
        if let Some(ip) = forwarded_for(headers).or_else(|| real_ip(headers)) {
            return Some(ip.to_string());
        }
    }

    Some(peer.ip().to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|entry| entry.trim().parse::<IpAddr>().ok())
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-real-ip")?
        .to_str()
        .ok()?
        .trim()
        .parse::<IpAddr>()
        .ok()
}
