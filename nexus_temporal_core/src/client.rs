//! Caller-side seams used by generated `*NexusClient` types.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::OperationError;
use crate::payload::Payload;

/// Per-call options for starting an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationOptions {
    /// Upper bound for the whole operation, including retries and the
    /// backing workflow run
    pub schedule_to_close_timeout: Option<Duration>,
    /// Human readable summary shown in the caller's history
    pub summary: Option<String>,
}

impl OperationOptions {
    pub fn with_schedule_to_close_timeout(mut self, timeout: Duration) -> Self {
        self.schedule_to_close_timeout = Some(timeout);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// A fully addressed request to start one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest<I> {
    pub endpoint: String,
    pub service: &'static str,
    pub operation: &'static str,
    pub input: I,
    pub options: OperationOptions,
}

/// A context able to schedule operations, typically a workflow context.
///
/// Starting never blocks: the returned [`OperationHandle`] resolves once the
/// operation completes, whether it was handled synchronously or by a
/// workflow run.
pub trait CallerContext {
    fn start_operation<I, O>(&self, request: OperationRequest<I>) -> OperationHandle<O>
    where
        I: Payload,
        O: Payload;
}

/// Deferred result of a started operation.
///
/// Await the handle itself, or call [`OperationHandle::result`].
pub struct OperationHandle<O> {
    operation: String,
    inner: BoxFuture<'static, Result<O, OperationError>>,
}

impl<O: Send + 'static> OperationHandle<O> {
    pub fn new<F>(operation: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<O, OperationError>> + Send + 'static,
    {
        Self {
            operation: operation.into(),
            inner: future.boxed(),
        }
    }

    /// A handle that is already resolved.
    pub fn ready(operation: impl Into<String>, result: Result<O, OperationError>) -> Self {
        Self::new(operation, futures::future::ready(result))
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub async fn result(self) -> Result<O, OperationError> {
        self.await
    }
}

impl<O> Future for OperationHandle<O> {
    type Output = Result<O, OperationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<O> fmt::Debug for OperationHandle<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationHandle")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}
