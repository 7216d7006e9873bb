use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Method,
};
use serde::Serialize;

use crate::{endpoint::join_segments, ApiVersion, CarpenterError, Result};

/// Request body supplied by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Already serialized JSON text, sent verbatim.
    Text(String),
    /// Structured value, serialized to JSON when the request is sent.
    Json(serde_json::Value),
}

impl Payload {
    /// Converts any serializable value into a JSON payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(CarpenterError::Serialization)
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Text(text) => Ok(text.as_bytes().to_vec()),
            Self::Json(value) => serde_json::to_vec(value).map_err(CarpenterError::Serialization),
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Options for [`crate::CarpenterClient::build`].
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    /// Build description sent as the JSON body.
    pub data: Option<Payload>,
    /// HTTP method. Defaults to `POST`.
    pub method: Option<Method>,
    pub headers: HeaderMap,
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the body from a serializable value.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        Ok(self.data(Payload::json(value)?))
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Options for [`crate::CarpenterClient::cancel`].
#[derive(Clone, Debug, Default)]
pub struct CancelOptions {
    /// Package name.
    pub pkg: String,
    /// Package version.
    pub version: String,
    /// Target environment. Omitted from the path when unset.
    pub env: Option<String>,
    pub headers: HeaderMap,
    /// Overrides the client-wide timeout for this call.
    pub timeout: Option<Duration>,
}

impl CancelOptions {
    pub fn new(pkg: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            pkg: pkg.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A single logical request: method, path, headers and optional body.
#[derive(Clone, Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub path_segments: Vec<String>,
    pub headers: HeaderMap,
    pub body: Option<Payload>,
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new<I, S>(method: Method, path_segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path_segments: path_segments.into_iter().map(Into::into).collect(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// `POST {version}/build`, or the caller's method.
    pub fn build(version: ApiVersion, options: BuildOptions) -> Self {
        let method = options.method.unwrap_or(Method::POST);
        Self {
            headers: options.headers,
            body: options.data,
            timeout: options.timeout,
            ..Self::new(method, [version.segment(), "build"])
        }
    }

    /// `GET cancel/{pkg}/{version}[/{env}]`.
    pub fn cancel(options: CancelOptions) -> Self {
        let segments = [
            "cancel".to_owned(),
            options.pkg,
            options.version,
            options.env.unwrap_or_default(),
        ];
        Self {
            headers: options.headers,
            timeout: options.timeout,
            ..Self::new(Method::GET, segments)
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Joined request path without a leading slash.
    pub fn path(&self) -> String {
        join_segments(&self.path_segments)
    }

    /// Whether the method terminates the request with a payload.
    pub fn carries_body(&self) -> bool {
        is_body_method(&self.method)
    }

    /// Encodes the body to send. Methods outside `POST`/`PUT` never send
    /// one; body-bearing methods without data send an empty body.
    pub(crate) fn encode_body(&self) -> Result<Option<Vec<u8>>> {
        if !self.carries_body() {
            return Ok(None);
        }
        match &self.body {
            Some(payload) => payload.to_bytes().map(Some),
            None => Ok(Some(Vec::new())),
        }
    }

    /// Headers as sent on the wire: the caller's headers plus
    /// `Content-Type: application/json` when there is data or the method
    /// is `POST`/`PUT`.
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if self.body.is_some() || self.carries_body() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers
    }
}

fn is_body_method(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT
}
