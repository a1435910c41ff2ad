//! Sentry DSN parsing
//!
//! A DSN has the shape `<scheme>://<public_key>@<host>[:port][/prefix]/<project_id>`.

use std::fmt;
use std::str::FromStr;

use crate::core::{CrashProbeError, Result};

/// Protocol version sent in the auth header
pub const API_VERSION: u8 = 7;

/// Client identifier sent with every request
pub const USER_AGENT: &str = concat!("crashprobe/", env!("CARGO_PKG_VERSION"));

/// Parsed telemetry DSN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    scheme: String,
    public_key: String,
    host: String,
    port: Option<u16>,
    path_prefix: String,
    project_id: String,
}

impl Dsn {
    pub fn parse(dsn: &str) -> Result<Self> {
        let invalid = |why: &str| CrashProbeError::telemetry(format!("Invalid DSN '{}': {}", dsn, why));

        let url = url::Url::parse(dsn).map_err(|e| invalid(&e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        if url.username().is_empty() {
            return Err(invalid("missing public key"));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?;

        let path = url.path().trim_end_matches('/');
        let (prefix, project_id) = match path.rfind('/') {
            Some(idx) => (&path[..idx], &path[idx + 1..]),
            None => ("", path),
        };
        if project_id.is_empty() {
            return Err(invalid("missing project id"));
        }

        Ok(Self {
            scheme: url.scheme().to_string(),
            public_key: url.username().to_string(),
            host: host.to_string(),
            port: url.port(),
            path_prefix: prefix.to_string(),
            project_id: project_id.to_string(),
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn origin(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// Endpoint that accepts envelopes for this project
    pub fn envelope_url(&self) -> String {
        format!(
            "{}{}/api/{}/envelope/",
            self.origin(),
            self.path_prefix,
            self.project_id
        )
    }

    /// Value of the `X-Sentry-Auth` header
    pub fn auth_header(&self) -> String {
        format!(
            "Sentry sentry_key={}, sentry_version={}, sentry_client={}",
            self.public_key, API_VERSION, USER_AGENT
        )
    }
}

impl FromStr for Dsn {
    type Err = CrashProbeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}@{}", self.scheme, self.public_key, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write!(f, "{}/{}", self.path_prefix, self.project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_dsn() {
        let dsn: Dsn = "https://a0b1c2d3e4f5678910abcdeffedcba12@o209016.ingest.sentry.io/0123456"
            .parse()
            .unwrap();

        assert_eq!(
            dsn.envelope_url(),
            "https://o209016.ingest.sentry.io/api/0123456/envelope/"
        );
        assert_eq!(
            dsn.auth_header(),
            format!(
                "Sentry sentry_key=a0b1c2d3e4f5678910abcdeffedcba12, sentry_version=7, sentry_client={}",
                USER_AGENT
            )
        );
        assert_eq!(
            dsn.to_string(),
            "https://a0b1c2d3e4f5678910abcdeffedcba12@o209016.ingest.sentry.io/0123456"
        );
    }

    #[test]
    fn test_private_dsn_with_port_and_prefix() {
        let dsn = Dsn::parse("http://key@192.168.1.1:9000/sentry/42").unwrap();
        assert_eq!(dsn.public_key(), "key");
        assert_eq!(dsn.project_id(), "42");
        assert_eq!(
            dsn.envelope_url(),
            "http://192.168.1.1:9000/sentry/api/42/envelope/"
        );
        assert_eq!(dsn.to_string(), "http://key@192.168.1.1:9000/sentry/42");
    }

    #[test]
    fn test_rejects_invalid_dsn() {
        assert!(Dsn::parse("not a dsn").is_err());
        assert!(Dsn::parse("ftp://key@host/1").is_err());
        assert!(Dsn::parse("https://host/1").is_err());
        assert!(Dsn::parse("https://key@host/").is_err());
        assert!(Dsn::parse("https://key@host").is_err());
    }
}
