//! `carpenter-client` is an async HTTP client for the carpenter build service.
//!
//! The crate triggers and cancels builds with automatic retry of transient
//! transport failures:
//! - [`CarpenterClient::build`]: `POST /v2/build` (or `/build` on the v1 API)
//! - [`CarpenterClient::cancel`]: `GET /cancel/{pkg}/{version}[/{env}]`
//!
//! HTTP error statuses are returned as ordinary responses. Only transport
//! failures (connect errors, timeouts) are retried, bounded by a
//! [`RetryPolicy`]; when retries run out the error carries one diagnostic per
//! attempt.

mod client;
mod dispatch;
pub mod endpoint;
mod error;
mod handle;
mod options;
mod request;
mod retry;

pub use client::{CarpenterClient, ClientConfig};
pub use error::{AttemptError, AttemptRecord, CarpenterError, DispatchError};
pub use handle::RequestHandle;
pub use options::{ApiVersion, ClientOptions, Target};
pub use request::{BuildOptions, CancelOptions, Payload, RequestSpec};
pub use retry::RetryPolicy;

pub use reqwest::{header, Method, Response, StatusCode};

pub type Result<T> = std::result::Result<T, CarpenterError>;
