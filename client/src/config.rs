//! Client configuration, loadable from TOML.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use codec::{BoardState, DeltaPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Port the reference arena server listens on.
pub const DEFAULT_PORT: u16 = 8082;

/// Connection and session settings.
///
/// Timeouts are written in milliseconds in TOML (`read_timeout_ms` and so
/// on); `0` or an absent key means no deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Server address, `host:port`.
    pub addr: String,

    /// Room type sent in the room request.
    pub room_type: u8,

    /// Per-read deadline on the socket.
    ///
    /// The listener polls its stop flag at this interval while the stream is idle.
    #[serde(
        rename = "read_timeout_ms",
        with = "millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub read_timeout: Option<Duration>,

    #[serde(
        rename = "write_timeout_ms",
        with = "millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub write_timeout: Option<Duration>,

    #[serde(
        rename = "connect_timeout_ms",
        with = "millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub connect_timeout: Option<Duration>,

    /// Handling of deltas that arrive before any snapshot.
    pub delta_policy: DeltaPolicy,

    /// Sent right after connecting when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<Credentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: format!("127.0.0.1:{DEFAULT_PORT}"),
            room_type: 0,
            read_timeout: Some(Duration::from_secs(2)),
            write_timeout: Some(Duration::from_secs(2)),
            connect_timeout: Some(Duration::from_secs(5)),
            delta_policy: DeltaPolicy::default(),
            login: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config with short deadlines for loopback tests.
    #[must_use]
    pub fn for_testing(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            read_timeout: Some(Duration::from_millis(50)),
            write_timeout: Some(Duration::from_millis(500)),
            connect_timeout: Some(Duration::from_millis(500)),
            ..Self::default()
        }
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> ClientResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ClientError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Creates an empty board that follows this config's delta policy.
    #[must_use]
    pub fn board(&self) -> BoardState {
        BoardState::new().with_policy(self.delta_policy)
    }
}

/// Login username and password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parses `user:pass`. The password may itself contain `:`.
    #[must_use]
    pub fn parse(pair: &str) -> Option<Self> {
        let (username, password) = pair.split_once(':')?;
        Some(Self::new(username, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                serializer.serialize_some(&ms)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let ms = Option::<u64>::deserialize(deserializer)?;
        Ok(ms.filter(|&ms| ms > 0).map(Duration::from_millis))
    }
}
