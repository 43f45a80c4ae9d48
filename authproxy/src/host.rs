//! Host/port parsing from the inbound `Host` header, with configured
//! fallbacks (`spec.md` §4.5 "Host/port parsing").

/// Split a `Host` header value into `(host, port)`.
///
/// Splits on the first `:`. If the header is absent or empty, falls back to
/// `fallback_host`/`fallback_port` entirely. If the header has no `:` (the
/// common case for a plain `Host: example.com` on the default port), the
/// host half is kept and only the port falls back — a client that signs
/// over its real, portless host must not see that host silently replaced
/// by `fallback_host` server-side. A `:`-split whose port half doesn't
/// parse as a `u16`, or whose host half is empty, falls back entirely. The
/// host half is never validated beyond being non-empty text — it's opaque
/// input to the normalized request string, not a DNS name the proxy
/// resolves itself (forwarding uses the configured `appserver` address,
/// not this header).
pub fn parse_host_header(
    header: Option<&str>,
    fallback_host: &str,
    fallback_port: u16,
) -> (String, u16) {
    let Some(header) = header else {
        return (fallback_host.to_string(), fallback_port);
    };
    if header.is_empty() {
        return (fallback_host.to_string(), fallback_port);
    }

    match header.split_once(':') {
        Some((host, port)) if !host.is_empty() => match port.parse::<u16>() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (fallback_host.to_string(), fallback_port),
        },
        Some(_) => (fallback_host.to_string(), fallback_port),
        None => (header.to_string(), fallback_port),
    }
}
