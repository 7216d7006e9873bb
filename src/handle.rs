use std::{
    future::Future,
    panic,
    pin::Pin,
    task::{Context, Poll},
};

use reqwest::Response;
use tokio::task::JoinHandle;

use crate::{CarpenterError, Result};

/// A request running on its own tokio task.
///
/// Await the handle to receive the result exactly once, or call
/// [`RequestHandle::abort`] to abandon the request early. Dropping the handle
/// detaches the task without cancelling it.
#[derive(Debug)]
pub struct RequestHandle {
    task: JoinHandle<Result<Response>>,
}

impl RequestHandle {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<Response>> + Send + 'static,
    {
        Self {
            task: tokio::spawn(future),
        }
    }

    /// Cancels the in-flight attempt or backoff wait.
    ///
    /// Awaiting an aborted handle yields [`CarpenterError::Aborted`] unless
    /// the request had already completed.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for RequestHandle {
    type Output = Result<Response>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(err)) if err.is_cancelled() => Poll::Ready(Err(CarpenterError::Aborted)),
            Poll::Ready(Err(err)) => panic::resume_unwind(err.into_panic()),
        }
    }
}
