//! Socket addresses.
//!
//! topokit speaks two transports: `tcp://ip:port` between processes and
//! `inproc://name` between sockets of the same process. Anything else is
//! rejected before a socket touches the network.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::str::FromStr;

const TCP: &str = "tcp://";
const INPROC: &str = "inproc://";

/// A parsed listen or dial address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Numeric IPv4 or bracketed IPv6 address with port; port 0 asks the OS
    Tcp(SocketAddr),
    /// Name in the process-wide inproc registry
    Inproc(String),
}

impl Endpoint {
    /// Parse a `tcp://` or `inproc://` URL.
    ///
    /// ```
    /// use topokit_core::endpoint::Endpoint;
    ///
    /// assert!(Endpoint::parse("tcp://[::1]:40899").unwrap().is_tcp());
    /// assert!(Endpoint::parse("inproc://survey").unwrap().is_inproc());
    /// assert!(Endpoint::parse("tcp://localhost:40899").is_err());
    /// ```
    pub fn parse(url: &str) -> Result<Self, EndpointError> {
        url.parse()
    }

    pub fn is_tcp(&self) -> bool {
        matches!(self, Endpoint::Tcp(_))
    }

    pub fn is_inproc(&self) -> bool {
        matches!(self, Endpoint::Inproc(_))
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = url.strip_prefix(TCP) {
            return rest
                .parse()
                .map(Endpoint::Tcp)
                .map_err(|_| EndpointError::BadTcpAddress(rest.to_string()));
        }
        if let Some(name) = url.strip_prefix(INPROC) {
            if name.is_empty() {
                return Err(EndpointError::EmptyInprocName);
            }
            return Ok(Endpoint::Inproc(name.to_string()));
        }

        match url.split_once("://") {
            Some((scheme, _)) => Err(EndpointError::UnsupportedScheme(scheme.to_string())),
            None => Err(EndpointError::MissingScheme(url.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "{TCP}{addr}"),
            Endpoint::Inproc(name) => write!(f, "{INPROC}{name}"),
        }
    }
}

/// Why an address was refused.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("'{0}' has no scheme; use tcp://ip:port or inproc://name")]
    MissingScheme(String),

    #[error("{0}:// is not a topokit transport")]
    UnsupportedScheme(String),

    #[error("'{0}' is not a numeric ip:port")]
    BadTcpAddress(String),

    #[error("inproc endpoint needs a name")]
    EmptyInprocName,
}

/// Listen and dial report address problems through `io::Error` sources.
impl From<EndpointError> for io::Error {
    fn from(err: EndpointError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_round_trips_through_display() {
        for url in ["tcp://127.0.0.1:40899", "tcp://[::1]:0"] {
            let endpoint = Endpoint::parse(url).unwrap();
            assert!(endpoint.is_tcp());
            assert_eq!(endpoint.to_string(), url);
        }
    }

    #[test]
    fn test_inproc_name() {
        let endpoint = Endpoint::parse("inproc://bus-node0").unwrap();
        assert_eq!(endpoint, Endpoint::Inproc("bus-node0".into()));
        assert!(matches!(
            Endpoint::parse("inproc://"),
            Err(EndpointError::EmptyInprocName)
        ));
    }

    #[test]
    fn test_rejected_urls() {
        assert!(matches!(
            Endpoint::parse("ipc:///tmp/topokit.sock"),
            Err(EndpointError::UnsupportedScheme(s)) if s == "ipc"
        ));
        assert!(matches!(
            Endpoint::parse("ws://127.0.0.1:80"),
            Err(EndpointError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            Endpoint::parse("127.0.0.1:40899"),
            Err(EndpointError::MissingScheme(_))
        ));
        assert!(matches!(
            Endpoint::parse("tcp://localhost:40899"),
            Err(EndpointError::BadTcpAddress(_))
        ));
    }

    #[test]
    fn test_into_io_error() {
        let err: io::Error = EndpointError::EmptyInprocName.into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
