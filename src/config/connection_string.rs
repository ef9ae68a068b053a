//! Connection string parsing
//!
//! Turns a `couchbase://` or `couchbases://` connection string into the
//! base URL of the query service on the first seed host.

use crate::error::CouchbaseError;

/// Default query service port for plain connections
pub const QUERY_PORT: u16 = 8093;

/// Default query service port for TLS connections
pub const QUERY_TLS_PORT: u16 = 18093;

/// A parsed connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    tls: bool,
    /// Seed hosts, each with an optional explicit port. Never empty.
    hosts: Vec<(String, Option<u16>)>,
}

impl ConnectionString {
    /// Parse a connection string
    ///
    /// Query parameters (`?key=value`) are accepted and ignored.
    pub fn parse(input: &str) -> Result<Self, CouchbaseError> {
        let input = input.trim();
        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| invalid(input, "missing scheme"))?;

        let tls = match scheme {
            "couchbase" => false,
            "couchbases" => true,
            other => return Err(invalid(input, &format!("unsupported scheme '{}'", other))),
        };

        let rest = rest.split(['?', '/']).next().unwrap_or_default();

        let hosts = rest
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(|h| parse_host(input, h))
            .collect::<Result<Vec<_>, _>>()?;

        if hosts.is_empty() {
            return Err(invalid(input, "no hosts given"));
        }

        Ok(Self { tls, hosts })
    }

    /// Whether the `couchbases://` scheme was used
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Base URL of the query service on the first seed host
    pub fn query_endpoint(&self) -> String {
        let (host, port) = &self.hosts[0];
        let (scheme, default_port) = if self.tls {
            ("https", QUERY_TLS_PORT)
        } else {
            ("http", QUERY_PORT)
        };
        format!("{}://{}:{}", scheme, host, port.unwrap_or(default_port))
    }
}

fn parse_host(input: &str, host: &str) -> Result<(String, Option<u16>), CouchbaseError> {
    // Bracketed IPv6 literal, e.g. [::1]:8093
    if let Some(stripped) = host.strip_prefix('[') {
        let (addr, tail) = stripped
            .split_once(']')
            .ok_or_else(|| invalid(input, "unterminated IPv6 address"))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(parse_port(input, port)?),
            None if tail.is_empty() => None,
            None => return Err(invalid(input, "unexpected text after IPv6 address")),
        };
        if addr.is_empty() {
            return Err(invalid(input, "empty host name"));
        }
        return Ok((format!("[{}]", addr), port));
    }

    let (name, port) = match host.split_once(':') {
        Some((name, port)) => (name, Some(parse_port(input, port)?)),
        None => (host, None),
    };
    if name.is_empty() {
        return Err(invalid(input, "empty host name"));
    }
    Ok((name.to_string(), port))
}

fn parse_port(input: &str, port: &str) -> Result<u16, CouchbaseError> {
    port.parse::<u16>()
        .map_err(|_| invalid(input, &format!("invalid port '{}'", port)))
}

fn invalid(input: &str, reason: &str) -> CouchbaseError {
    CouchbaseError::InvalidConnectionString(format!("{}: {}", input, reason))
}
