//! Lightweight URI well-formedness checks for `url` fields.

use regex::Regex;
use std::net::Ipv6Addr;
use std::sync::OnceLock;

/// Longest textual IPv6 address (IPv4-mapped form), without zone.
const MAX_IPV6_LEN: usize = 45;

/// Schemes that are meaningless without a host.
const HOST_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "ws", "wss"];

static URI_RE: OnceLock<Regex> = OnceLock::new();
static HOST_RE: OnceLock<Regex> = OnceLock::new();

fn uri_re() -> &'static Regex {
    URI_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
            .unwrap()
    })
}

fn host_re() -> &'static Regex {
    HOST_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9\-._~%!$&'()*+,;=]+$").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url<'a> {
    pub scheme: &'a str,
    pub host: Option<&'a str>,
}

impl Url<'_> {
    pub fn scheme_lower(&self) -> String {
        self.scheme.to_ascii_lowercase()
    }
}

pub fn parse_url(s: &str) -> Result<Url<'_>, String> {
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("contains whitespace or control characters".into());
    }
    check_percent_encoding(s)?;
    let caps = uri_re().captures(s).ok_or("missing scheme")?;
    let scheme = caps.get(1).map_or("", |m| m.as_str());
    let path = caps.get(3).map_or("", |m| m.as_str());

    let host = match caps.get(2).map(|m| m.as_str()) {
        Some("") | None => None,
        Some(authority) => Some(parse_authority(authority)?),
    };
    if host.is_none() && HOST_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        return Err(format!("'{scheme}' URL has no host"));
    }
    if host.is_none() && path.is_empty() {
        return Err("missing host and path".into());
    }
    Ok(Url { scheme, host })
}

fn check_percent_encoding(s: &str) -> Result<(), String> {
    let bytes = s.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'%' {
            let ok = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !ok {
                return Err("invalid percent-encoding".into());
            }
        }
    }
    Ok(())
}

fn parse_authority(authority: &str) -> Result<&str, String> {
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let (host, port) = if let Some(rest) = host_port.strip_prefix('[') {
        let (inner, after) = rest.split_once(']').ok_or("unterminated IPv6 host")?;
        check_ipv6(inner)?;
        let port = match after {
            "" => None,
            p => Some(p.strip_prefix(':').ok_or("unexpected text after IPv6 host")?),
        };
        (&host_port[..inner.len() + 2], port)
    } else {
        match host_port.split_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (host_port, None),
        }
    };
    if host.is_empty() {
        return Err("empty host".into());
    }
    if !host.starts_with('[') && !host_re().is_match(host) {
        return Err(format!("invalid host '{host}'"));
    }
    if let Some(port) = port {
        if !port.is_empty() && port.parse::<u16>().is_err() {
            return Err(format!("invalid port '{port}'"));
        }
    }
    Ok(host)
}

/// Validate the inside of a bracketed IPv6 host before trusting it.
fn check_ipv6(inner: &str) -> Result<(), String> {
    let (addr, zone) = match inner.split_once('%') {
        Some((a, z)) => (a, Some(z)),
        None => (inner, None),
    };
    if addr.is_empty() || addr.len() > MAX_IPV6_LEN {
        return Err("IPv6 host has invalid length".into());
    }
    if !addr
        .chars()
        .all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.')
    {
        return Err("IPv6 host contains invalid characters".into());
    }
    if zone.is_some_and(|z| z.is_empty() || z == "25") {
        return Err("IPv6 host has an empty zone".into());
    }
    addr.parse::<Ipv6Addr>()
        .map(|_| ())
        .map_err(|_| format!("invalid IPv6 address '{addr}'"))
}
