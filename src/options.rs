use std::fmt;

use url::Url;

use crate::RetryPolicy;

/// Carpenter build API version.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ApiVersion {
    /// Legacy unversioned API (`/build`).
    V1,
    /// Versioned API (`/v2/build`).
    #[default]
    V2,
}

impl ApiVersion {
    /// Path segment prefixed to versioned routes; empty for the legacy API.
    pub fn segment(self) -> &'static str {
        match self {
            Self::V1 => "",
            Self::V2 => "v2",
        }
    }

    /// Maps a loosely written version: `"1"` and `"v1"` select the legacy
    /// API, anything else selects v2.
    pub fn parse(value: &str) -> Self {
        match value {
            "1" | "v1" => Self::V1,
            _ => Self::V2,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

impl From<&str> for ApiVersion {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for ApiVersion {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<u32> for ApiVersion {
    fn from(value: u32) -> Self {
        if value == 1 {
            Self::V1
        } else {
            Self::V2
        }
    }
}

/// Configures the service URL, API version, timeout and retry behavior.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    /// Root URL of the carpenter service.
    pub url: Option<String>,
    /// Alias of `url`, consulted when `url` is unset.
    pub uri: Option<String>,
    /// Build API version. Defaults to v2.
    pub version: Option<ApiVersion>,
    /// Per-attempt timeout in milliseconds. `0` disables the timeout.
    pub timeout_ms: u64,
    /// Shared, connection-pooling transport to reuse across clients.
    pub agent: Option<reqwest::Client>,
    /// Retry bounds. Defaults to [`RetryPolicy::default`].
    pub retry: Option<RetryPolicy>,
}

impl ClientOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<ApiVersion>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_agent(mut self, agent: reqwest::Client) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }
}

/// Anything a [`crate::CarpenterClient`] can be constructed from.
#[derive(Clone, Debug)]
pub enum Target {
    /// A base URL string, e.g. `"http://localhost:8999/"`.
    Url(String),
    /// An already parsed URL.
    Parsed(Url),
    /// Full options with `url` or `uri` set.
    Options(ClientOptions),
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::Url(value.to_owned())
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self::Url(value)
    }
}

impl From<Url> for Target {
    fn from(value: Url) -> Self {
        Self::Parsed(value)
    }
}

impl From<&Url> for Target {
    fn from(value: &Url) -> Self {
        Self::Parsed(value.clone())
    }
}

impl From<ClientOptions> for Target {
    fn from(value: ClientOptions) -> Self {
        Self::Options(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ApiVersion;

    #[test]
    fn legacy_version_spellings_map_to_v1() {
        assert_eq!(ApiVersion::from(1u32), ApiVersion::V1);
        assert_eq!(ApiVersion::from("1"), ApiVersion::V1);
        assert_eq!(ApiVersion::from("v1"), ApiVersion::V1);
        assert_eq!(ApiVersion::V1.segment(), "");
    }

    #[test]
    fn other_versions_map_to_v2() {
        assert_eq!(ApiVersion::from(2u32), ApiVersion::V2);
        assert_eq!(ApiVersion::from("v2"), ApiVersion::V2);
        assert_eq!(ApiVersion::from("V1"), ApiVersion::V2);
        assert_eq!(ApiVersion::from(" v1 "), ApiVersion::V2);
        assert_eq!(ApiVersion::from(String::new()), ApiVersion::V2);
        assert_eq!(ApiVersion::default().segment(), "v2");
    }
}
