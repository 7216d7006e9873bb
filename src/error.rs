/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum CarpenterError {
    /// Missing or unusable base URL at construction.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Request body could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),
    /// Every attempt failed at the transport level.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// A spawned request was aborted before it completed.
    #[error("request aborted")]
    Aborted,
}

/// Terminal failure after the retry policy was exhausted.
#[derive(Debug, thiserror::Error)]
#[error("request failed after {} attempt(s): {source}", .attempts.len())]
pub struct DispatchError {
    attempts: Vec<AttemptRecord>,
    source: reqwest::Error,
}

impl DispatchError {
    pub(crate) fn new(attempts: Vec<AttemptRecord>, source: reqwest::Error) -> Self {
        Self { attempts, source }
    }

    /// Failed attempts in the order they were made.
    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    /// The final failed attempt.
    pub fn last(&self) -> Option<&AttemptRecord> {
        self.attempts.last()
    }

    /// HTTP status of the last attempt, if the transport reported one.
    pub fn status(&self) -> Option<u16> {
        self.last().and_then(|record| record.error.status)
    }

    /// Message of the last attempt.
    pub fn message(&self) -> &str {
        self.last()
            .map(|record| record.error.message.as_str())
            .unwrap_or_default()
    }

    pub fn is_timeout(&self) -> bool {
        self.source.is_timeout()
    }

    /// `("attempt#<index>", message)` pairs for every failed attempt.
    pub fn diagnostics(&self) -> Vec<(String, String)> {
        self.attempts
            .iter()
            .map(|record| (record.label(), record.error.message.clone()))
            .collect()
    }

    /// Looks up the diagnostic for a label such as `attempt#2`.
    pub fn diagnostic(&self, label: &str) -> Option<&AttemptError> {
        self.attempts
            .iter()
            .find(|record| record.label() == label)
            .map(|record| &record.error)
    }
}

/// One failed attempt of a dispatched request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Zero-based attempt index.
    pub index: usize,
    pub error: AttemptError,
}

impl AttemptRecord {
    pub fn label(&self) -> String {
        format!("attempt#{}", self.index)
    }
}

/// Transport failure of a single attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptError {
    pub message: String,
    pub status: Option<u16>,
    pub timeout: bool,
    pub connect: bool,
}

impl From<&reqwest::Error> for AttemptError {
    fn from(err: &reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: err.status().map(|status| status.as_u16()),
            timeout: err.is_timeout(),
            connect: err.is_connect(),
        }
    }
}
