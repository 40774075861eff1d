//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

/// Number of reverse proxies in front of the server
///
/// Each trusted proxy appends the address it received the request from to
/// `X-Forwarded-For`, so only the rightmost `n` entries are genuine. Read
/// from request extensions; when absent no entry is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustedProxies(pub usize);

/// Extract client IP address from headers
///
/// With `n` trusted proxies the client is the `n`th `X-Forwarded-For`
/// entry counted from the right (the leftmost one if the header is
/// shorter). Entries further left are written by the client and ignored.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
/// * `trusted` - Proxy hops whose entries may be believed
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trusted: TrustedProxies,
) -> Option<IpAddr> {
    if trusted.0 == 0 {
        return direct_ip;
    }

    let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) else {
        return direct_ip;
    };

    let entries: Vec<&str> = xff
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    if entries.is_empty() {
        return direct_ip;
    }

    let index = entries.len().saturating_sub(trusted.0);
    entries[index].parse::<IpAddr>().ok().or(direct_ip)
}

/// Client IP as seen by the application
///
/// Extractor that never rejects. When the server is started without
/// `into_make_service_with_connect_info` and no trusted proxy header is
/// present, the address is simply unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    /// Resolve from raw request parts
    pub fn from_parts(parts: &Parts) -> Self {
        let direct = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        let trusted = parts
            .extensions
            .get::<TrustedProxies>()
            .copied()
            .unwrap_or_default();
        Self(extract_client_ip(&parts.headers, direct, trusted))
    }

    /// IP as string (for database storage)
    pub fn to_db_string(&self) -> Option<String> {
        self.0.map(|ip| ip.to_string())
    }

    /// Key used for per-client bookkeeping such as rate limits
    pub fn key(&self) -> String {
        match self.0 {
            Some(ip) => ip.to_string(),
            None => "unknown".to_string(),
        }
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    const ONE_HOP: TrustedProxies = TrustedProxies(1);

    fn xff(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_one_hop_uses_rightmost_entry() {
        let headers = xff("192.168.1.1, 10.0.0.1");
        assert_eq!(extract_client_ip(&headers, None, ONE_HOP), Some(ip("10.0.0.1")));
    }

    #[test]
    fn test_forged_prefix_is_ignored() {
        let peer = ip("172.16.0.2");
        let first = extract_client_ip(&xff("1.1.1.1, 203.0.113.9"), Some(peer), ONE_HOP);
        let second = extract_client_ip(&xff("2.2.2.2, 203.0.113.9"), Some(peer), ONE_HOP);

        assert_eq!(first, Some(ip("203.0.113.9")));
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_hops() {
        let headers = xff("198.51.100.1, 203.0.113.9, 10.0.0.1");
        assert_eq!(
            extract_client_ip(&headers, None, TrustedProxies(2)),
            Some(ip("203.0.113.9"))
        );
        // Shorter header than the hop count: leftmost entry
        assert_eq!(
            extract_client_ip(&xff("203.0.113.9"), None, TrustedProxies(3)),
            Some(ip("203.0.113.9"))
        );
    }

    #[test]
    fn test_no_trusted_proxy_uses_peer() {
        let peer = ip("127.0.0.1");
        let headers = xff("203.0.113.9");
        assert_eq!(
            extract_client_ip(&headers, Some(peer), TrustedProxies::default()),
            Some(peer)
        );
    }

    #[test]
    fn test_invalid_entry_falls_back_to_peer() {
        let peer = ip("10.1.2.3");
        assert_eq!(extract_client_ip(&xff("garbage"), Some(peer), ONE_HOP), Some(peer));
        assert_eq!(extract_client_ip(&xff(" , "), Some(peer), ONE_HOP), Some(peer));
        assert_eq!(extract_client_ip(&HeaderMap::new(), Some(peer), ONE_HOP), Some(peer));
    }

    #[test]
    fn test_client_ip_from_connect_info() {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("203.0.113.7:5555".parse().unwrap()));
        let (parts, _) = req.into_parts();

        let client = ClientIp::from_parts(&parts);
        assert_eq!(client.to_db_string(), Some("203.0.113.7".to_string()));
        assert_eq!(client.key(), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_ignores_header_without_trusted_proxies() {
        let mut req = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "198.51.100.4")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("203.0.113.7:5555".parse().unwrap()));
        let (parts, _) = req.into_parts();
        assert_eq!(ClientIp::from_parts(&parts).key(), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_reads_trusted_proxies_extension() {
        let mut req = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "6.6.6.6, 198.51.100.4")
            .body(())
            .unwrap();
        req.extensions_mut().insert(ONE_HOP);
        let (parts, _) = req.into_parts();
        assert_eq!(ClientIp::from_parts(&parts).key(), "198.51.100.4");
    }

    #[test]
    fn test_client_ip_unknown() {
        let req = Request::builder().uri("/").body(()).unwrap();
        let (parts, _) = req.into_parts();

        let client = ClientIp::from_parts(&parts);
        assert_eq!(client, ClientIp(None));
        assert_eq!(client.key(), "unknown");
    }
}
