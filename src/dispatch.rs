use std::time::Duration;

use reqwest::Response;
use tokio::time::sleep;
use url::Url;

use crate::{
    error::{AttemptError, AttemptRecord, DispatchError},
    RequestSpec, Result, RetryPolicy,
};

/// Sends one logical request, retrying transport failures.
///
/// Attempts are strictly sequential: the next one starts only after the
/// previous failure was observed and the backoff delay elapsed. Any HTTP
/// response, whatever its status, ends the call successfully.
pub(crate) struct Dispatcher<'a> {
    pub http: &'a reqwest::Client,
    pub timeout: Duration,
    pub policy: &'a RetryPolicy,
}

impl Dispatcher<'_> {
    pub async fn dispatch(&self, endpoint: Url, spec: RequestSpec) -> Result<Response> {
        let body = spec.encode_body()?;
        let timeout = spec.timeout.unwrap_or(self.timeout);
        let headers = spec.request_headers();
        let mut attempts = Vec::new();
        let mut attempt = 0usize;

        loop {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, method = %spec.method, url = %endpoint, "dispatching request");

            let mut request = self
                .http
                .request(spec.method.clone(), endpoint.clone())
                .headers(headers.clone());
            if !timeout.is_zero() {
                request = request.timeout(timeout);
            }
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            let err = match request.send().await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            attempts.push(AttemptRecord {
                index: attempt,
                error: AttemptError::from(&err),
            });

            if err.is_builder() || !self.policy.allows_retry(attempt) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    attempts = attempts.len(),
                    url = %endpoint,
                    "request failed permanently: {}",
                    err
                );
                return Err(DispatchError::new(attempts, err).into());
            }

            self.wait_before_retry(attempt).await;
            attempt += 1;
        }
    }

    async fn wait_before_retry(&self, attempt: usize) {
        let delay = self.policy.delay(attempt);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request after {} ms", delay.as_millis());

        sleep(delay).await;
    }
}
