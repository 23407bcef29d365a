//! Error types for connecting, configuring, and bootstrapping a session.

use std::io;
use std::path::PathBuf;

use codec::ProtocolError;
use thiserror::Error;

/// Result type for client setup operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures outside the per-frame protocol path.
///
/// Frame reads and bootstrap replies report [`ProtocolError`] directly; this
/// type wraps it for the operations that also touch sockets or files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Protocol failure during bootstrap.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Login credentials cannot be encoded.
    #[error("invalid login: {0}")]
    Login(#[from] wire::EncodeError),

    /// Server address lookup failed.
    #[error("could not resolve address {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Server address resolved to nothing.
    #[error("address {addr} resolved to no socket addresses")]
    NoAddress { addr: String },

    /// TCP connect or socket setup failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for [`crate::ClientConfig`].
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl ClientError {
    /// Returns the protocol error, if this is one.
    #[must_use]
    pub const fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_is_transparent() {
        let err = ClientError::from(ProtocolError::StartRejected { code: 1 });
        assert_eq!(err.to_string(), "server rejected game start: status 1");
        assert_eq!(
            err.as_protocol(),
            Some(&ProtocolError::StartRejected { code: 1 })
        );
    }

    #[test]
    fn connect_error_names_address() {
        let err = ClientError::Connect {
            addr: "127.0.0.1:1".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert!(err.to_string().contains("127.0.0.1:1"));
        assert!(err.as_protocol().is_none());
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ClientError>();
    }
}
