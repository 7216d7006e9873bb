use std::fmt;
use std::time::Duration;

use reqwest::Response;
use url::Url;

use crate::{
    dispatch::Dispatcher,
    endpoint,
    handle::RequestHandle,
    options::Target,
    ApiVersion, BuildOptions, CancelOptions, CarpenterError, ClientOptions, RequestSpec, Result,
    RetryPolicy,
};

/// Normalized, immutable client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub version: ApiVersion,
    /// Per-attempt timeout. `Duration::ZERO` means no explicit timeout.
    pub timeout: Duration,
    pub agent: Option<reqwest::Client>,
    pub retry: RetryPolicy,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .field("agent", &self.agent.as_ref().map(|_| "<custom>"))
            .field("retry", &self.retry)
            .finish()
    }
}

impl ClientConfig {
    fn from_target(target: Target) -> Result<Self> {
        match target {
            Target::Url(raw) => Self::from_options(ClientOptions::new(raw)),
            Target::Parsed(url) => Ok(Self {
                base_url: ensure_base(url)?,
                version: ApiVersion::default(),
                timeout: Duration::ZERO,
                agent: None,
                retry: RetryPolicy::default(),
            }),
            Target::Options(options) => Self::from_options(options),
        }
    }

    fn from_options(options: ClientOptions) -> Result<Self> {
        let raw = options
            .url
            .or(options.uri)
            .filter(|raw| !raw.trim().is_empty())
            .ok_or_else(|| CarpenterError::Configuration("carpenter URL required".to_owned()))?;
        Ok(Self {
            base_url: parse_base_url(&raw)?,
            version: options.version.unwrap_or_default(),
            timeout: Duration::from_millis(options.timeout_ms),
            agent: options.agent,
            retry: options.retry.unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
/// HTTP client for the carpenter build service.
pub struct CarpenterClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl fmt::Debug for CarpenterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarpenterClient")
            .field("config", &self.config)
            .finish()
    }
}

impl CarpenterClient {
    /// Creates a client from a base URL string, a parsed [`Url`] or
    /// [`ClientOptions`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use carpenter_client::{CarpenterClient, ClientOptions};
    ///
    /// let carpenter = CarpenterClient::new("http://localhost:8999/")?;
    /// let legacy = CarpenterClient::new(
    ///     ClientOptions::new("http://localhost:8999/").with_version("v1"),
    /// )?;
    /// # Ok::<(), carpenter_client::CarpenterError>(())
    /// ```
    pub fn new(target: impl Into<Target>) -> Result<Self> {
        let config = ClientConfig::from_target(target.into())?;
        let http = config.agent.clone().unwrap_or_default();
        Ok(Self { http, config })
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `CARPENTER_URL`: root URL of the service (required)
    /// - `CARPENTER_API_VERSION`: `v1` selects the legacy API (optional)
    /// - `CARPENTER_TIMEOUT_MS`: per-attempt timeout (optional)
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("CARPENTER_URL").map_err(|_| {
            CarpenterError::Configuration("missing CARPENTER_URL environment variable".to_owned())
        })?;
        let mut options = ClientOptions::new(url);
        if let Ok(version) = std::env::var("CARPENTER_API_VERSION") {
            options = options.with_version(version);
        }
        if let Ok(timeout) = std::env::var("CARPENTER_TIMEOUT_MS") {
            let timeout_ms = timeout.trim().parse::<u64>().map_err(|err| {
                CarpenterError::Configuration(format!(
                    "CARPENTER_TIMEOUT_MS must be milliseconds: {err}"
                ))
            })?;
            options = options.with_timeout_ms(timeout_ms);
        }
        Self::new(options)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Canonical base URL string.
    pub fn base(&self) -> &str {
        self.config.base_url.as_str()
    }

    pub fn version(&self) -> ApiVersion {
        self.config.version
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.config.retry
    }

    /// The transport supplied through [`ClientOptions::agent`], if any.
    pub fn agent(&self) -> Option<&reqwest::Client> {
        self.config.agent.as_ref()
    }

    /// Triggers a new build: `POST /v2/build` (or `/build` on the legacy API).
    pub async fn build(&self, options: BuildOptions) -> Result<Response> {
        self.send(RequestSpec::build(self.config.version, options))
            .await
    }

    /// Cancels a build: `GET /cancel/{pkg}/{version}[/{env}]`.
    pub async fn cancel(&self, options: CancelOptions) -> Result<Response> {
        self.send(RequestSpec::cancel(options)).await
    }

    /// Like [`CarpenterClient::build`], running on a spawned task.
    pub fn spawn_build(&self, options: BuildOptions) -> RequestHandle {
        let client = self.clone();
        RequestHandle::spawn(async move { client.build(options).await })
    }

    /// Like [`CarpenterClient::cancel`], running on a spawned task.
    pub fn spawn_cancel(&self, options: CancelOptions) -> RequestHandle {
        let client = self.clone();
        RequestHandle::spawn(async move { client.cancel(options).await })
    }

    /// Sends an arbitrary request to the service with retries.
    ///
    /// HTTP error statuses are returned as responses; only transport
    /// failures are retried.
    pub async fn send(&self, spec: RequestSpec) -> Result<Response> {
        let url = endpoint::resolve(&self.config.base_url, &spec.path());
        let dispatcher = Dispatcher {
            http: &self.http,
            timeout: self.config.timeout,
            policy: &self.config.retry,
        };
        dispatcher.dispatch(url, spec).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|err| {
        CarpenterError::Configuration(format!("invalid carpenter URL '{raw}': {err}"))
    })?;
    ensure_base(url)
}

fn ensure_base(url: Url) -> Result<Url> {
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(CarpenterError::Configuration(format!(
            "carpenter URL must have a host: '{url}'"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::CarpenterClient;
    use crate::{ApiVersion, CarpenterError, ClientOptions, RetryPolicy};
    use std::time::Duration;
    use url::Url;

    const URI: &str = "http://localhost:8999/";

    #[test]
    fn configured_with_string() {
        let client = CarpenterClient::new(URI).unwrap();
        assert_eq!(client.base(), URI);
        assert_eq!(client.version(), ApiVersion::V2);
    }

    #[test]
    fn string_is_canonicalized() {
        let client = CarpenterClient::new("http://localhost:8999").unwrap();
        assert_eq!(client.base(), URI);
    }

    #[test]
    fn configured_with_url_object() {
        let client = CarpenterClient::new(Url::parse(URI).unwrap()).unwrap();
        assert_eq!(client.base(), URI);
    }

    #[test]
    fn configured_with_url_or_uri_option() {
        let by_url = CarpenterClient::new(ClientOptions::new(URI)).unwrap();
        let by_uri = CarpenterClient::new(ClientOptions {
            uri: Some(URI.to_owned()),
            ..ClientOptions::default()
        })
        .unwrap();
        assert_eq!(by_url.base(), URI);
        assert_eq!(by_uri.base(), URI);
    }

    #[test]
    fn configured_with_agent() {
        let client =
            CarpenterClient::new(ClientOptions::new(URI).with_agent(reqwest::Client::new()))
                .unwrap();
        assert!(client.agent().is_some());
        assert!(CarpenterClient::new(URI).unwrap().agent().is_none());
    }

    #[test]
    fn timeout_defaults_to_zero() {
        assert_eq!(CarpenterClient::new(URI).unwrap().timeout(), Duration::ZERO);

        let client =
            CarpenterClient::new(ClientOptions::new(URI).with_timeout_ms(2 * 60 * 1000)).unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(120_000));
    }

    #[test]
    fn legacy_version_option() {
        let client = CarpenterClient::new(ClientOptions::new(URI).with_version(1u32)).unwrap();
        assert_eq!(client.version(), ApiVersion::V1);
    }

    #[test]
    fn retry_policy_defaults_and_overrides() {
        assert_eq!(
            CarpenterClient::new(URI).unwrap().retry_policy(),
            &RetryPolicy::default()
        );
        let policy = RetryPolicy::new(3, 10, 100);
        let client =
            CarpenterClient::new(ClientOptions::new(URI).with_retry(policy.clone())).unwrap();
        assert_eq!(client.retry_policy(), &policy);
    }

    #[test]
    fn identical_inputs_yield_identical_config() {
        let options = ClientOptions::new(URI)
            .with_version("v1")
            .with_timeout_ms(500)
            .with_retry(RetryPolicy::new(2, 1, 2));
        let first = CarpenterClient::new(options.clone()).unwrap();
        let second = CarpenterClient::new(options).unwrap();
        assert_eq!(first.base(), second.base());
        assert_eq!(first.version(), second.version());
        assert_eq!(first.timeout(), second.timeout());
        assert_eq!(first.retry_policy(), second.retry_policy());
    }

    #[test]
    fn missing_url_is_configuration_error() {
        let err = CarpenterClient::new(ClientOptions::default()).unwrap_err();
        assert!(matches!(err, CarpenterError::Configuration(_)));
    }

    #[test]
    fn unusable_urls_are_configuration_errors() {
        for raw in ["", "not a url", "mailto:builds@example.com"] {
            let err = CarpenterClient::new(raw).unwrap_err();
            assert!(
                matches!(err, CarpenterError::Configuration(_)),
                "{raw:?} must be rejected"
            );
        }
    }

    #[test]
    fn debug_lists_config() {
        let client = CarpenterClient::new(URI).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("localhost:8999"));
        assert!(debug.contains("V2"));
    }
}
