use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

/// A UDP endpoint taking part in a relay directive.
///
/// The canonical `address:port` rendering is what the relay table is keyed
/// by and what receiver deduplication compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    ip: IpAddr,
    port: u16,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointParseError {
    #[error("missing port in endpoint {0:?}")]
    MissingPort(String),

    #[error("invalid port in endpoint {0:?}")]
    InvalidPort(String),

    #[error("invalid address in endpoint {0:?}")]
    InvalidAddress(String),
}

impl Endpoint {
    /// Returns `None` for port 0, which the relay can never send to.
    pub fn new(ip: IpAddr, port: u16) -> Option<Self> {
        (port > 0).then_some(Self { ip, port })
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.socket_addr().fmt(f)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| EndpointParseError::MissingPort(s.to_string()))?;

        if port.is_empty() {
            return Err(EndpointParseError::MissingPort(s.to_string()));
        }

        // Parse as i64 first so "-1" and "0" are reported as bad ports rather
        // than as garbage.
        let port = port
            .parse::<i64>()
            .ok()
            .and_then(|p| u16::try_from(p).ok())
            .filter(|p| *p > 0)
            .ok_or_else(|| EndpointParseError::InvalidPort(s.to_string()))?;

        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip = host
            .parse::<IpAddr>()
            .map_err(|_| EndpointParseError::InvalidAddress(s.to_string()))?;

        Ok(Self { ip, port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_ipv4() {
        let ep: Endpoint = "10.0.0.5:5000".parse().unwrap();
        assert_eq!(ep.port(), 5000);
        assert_eq!(ep.to_string(), "10.0.0.5:5000");
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let ep: Endpoint = "[::1]:6000".parse().unwrap();
        assert_eq!(ep.ip(), "::1".parse::<IpAddr>().unwrap());
        assert_eq!(ep.to_string(), "[::1]:6000");
    }

    #[test]
    fn rejects_bad_ports() {
        for s in ["10.0.0.1:abc", "10.0.0.1:-1", "10.0.0.1:0", "10.0.0.1:70000"] {
            assert_eq!(
                s.parse::<Endpoint>(),
                Err(EndpointParseError::InvalidPort(s.to_string())),
                "{s}"
            );
        }
    }

    #[test]
    fn rejects_missing_port() {
        assert!(matches!(
            "10.0.0.1".parse::<Endpoint>(),
            Err(EndpointParseError::MissingPort(_))
        ));
        assert!(matches!(
            "10.0.0.1:".parse::<Endpoint>(),
            Err(EndpointParseError::MissingPort(_))
        ));
    }

    #[test]
    fn rejects_bad_address() {
        assert!(matches!(
            "camera.local:5000".parse::<Endpoint>(),
            Err(EndpointParseError::InvalidAddress(_))
        ));
    }

    #[test]
    fn new_rejects_port_zero() {
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(Endpoint::new(ip, 0).is_none());
        assert!(Endpoint::new(ip, 1).is_some());
    }
}
