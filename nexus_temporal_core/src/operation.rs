//! Handler-side operation descriptors returned by generated handler traits.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use nexus_temporal_types::ExecutionStyle;

use crate::error::{HandlerError, OperationError};
use crate::payload::{decode_payload, encode_payload, Payload};

/// Information about an incoming start request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartContext {
    pub service: String,
    pub operation: String,
    /// Caller supplied idempotency key
    pub request_id: String,
    pub headers: BTreeMap<String, String>,
}

impl StartContext {
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
            ..Default::default()
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Options used to start the workflow backing a [`WorkflowRunOperation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowStartOptions {
    pub workflow_id: String,
    pub task_queue: Option<String>,
    pub execution_timeout: Option<Duration>,
}

impl WorkflowStartOptions {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            ..Default::default()
        }
    }
}

/// What the worker must do after an operation accepted a start request.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStart {
    /// The operation completed synchronously with this encoded output.
    Completed(Bytes),
    /// A workflow run must be started; its result is the operation output.
    WorkflowRun(WorkflowRunStart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRunStart {
    pub workflow_type: String,
    pub options: WorkflowStartOptions,
    /// Encoded operation input, passed through as the workflow argument
    pub input: Bytes,
}

/// Type-erased operation descriptor stored in a [`Service`](crate::Service).
pub trait Operation: Send + Sync {
    fn name(&self) -> &str;

    fn style(&self) -> ExecutionStyle;

    fn start(
        &self,
        ctx: StartContext,
        input: Bytes,
    ) -> BoxFuture<'static, Result<OperationStart, HandlerError>>;
}

type SyncHandler<I, O> =
    Arc<dyn Fn(StartContext, I) -> BoxFuture<'static, Result<O, HandlerError>> + Send + Sync>;

/// Descriptor of an operation resolved directly inside the start request.
pub struct SyncOperation<I, O> {
    name: String,
    handler: SyncHandler<I, O>,
}

impl<I: Payload, O: Payload> SyncOperation<I, O> {
    pub fn new<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(StartContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(move |ctx, input| handler(ctx, input).boxed()),
        }
    }

    /// Invokes the resolver with an already decoded input.
    pub async fn call(&self, ctx: StartContext, input: I) -> Result<O, HandlerError> {
        (self.handler)(ctx, input).await
    }
}

impl<I: Payload, O: Payload> Operation for SyncOperation<I, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn style(&self) -> ExecutionStyle {
        ExecutionStyle::Direct
    }

    fn start(
        &self,
        ctx: StartContext,
        input: Bytes,
    ) -> BoxFuture<'static, Result<OperationStart, HandlerError>> {
        let handler = self.handler.clone();
        async move {
            let input: I = decode_payload(&input)?;
            let output = handler(ctx, input).await?;
            Ok(OperationStart::Completed(encode_payload(&output)))
        }
        .boxed()
    }
}

impl<I, O> fmt::Debug for SyncOperation<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type StartOptionsFn<I> =
    Arc<dyn Fn(&StartContext, &I) -> Result<WorkflowStartOptions, HandlerError> + Send + Sync>;

/// Descriptor of an operation backed by a durable workflow run.
///
/// Pairs the workflow to start with the function deciding its start options.
/// The workflow's result, once available, is surfaced as the operation output
/// through [`WorkflowRunOperation::complete`].
pub struct WorkflowRunOperation<I, O> {
    name: String,
    workflow_type: String,
    start_options: StartOptionsFn<I>,
    _output: PhantomData<fn() -> O>,
}

impl<I: Payload, O: Payload> WorkflowRunOperation<I, O> {
    pub fn new<F>(name: impl Into<String>, workflow_type: impl Into<String>, start_options: F) -> Self
    where
        F: Fn(&StartContext, &I) -> Result<WorkflowStartOptions, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            workflow_type: workflow_type.into(),
            start_options: Arc::new(start_options),
            _output: PhantomData,
        }
    }

    pub fn workflow_type(&self) -> &str {
        &self.workflow_type
    }

    pub fn start_options(
        &self,
        ctx: &StartContext,
        input: &I,
    ) -> Result<WorkflowStartOptions, HandlerError> {
        (self.start_options)(ctx, input)
    }

    /// Decodes the completed workflow's result into the operation output.
    pub fn complete(&self, result: &[u8]) -> Result<O, OperationError> {
        Ok(decode_payload(result)?)
    }
}

impl<I: Payload, O: Payload> Operation for WorkflowRunOperation<I, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn style(&self) -> ExecutionStyle {
        ExecutionStyle::WorkflowRun
    }

    fn start(
        &self,
        ctx: StartContext,
        input: Bytes,
    ) -> BoxFuture<'static, Result<OperationStart, HandlerError>> {
        let start_options = self.start_options.clone();
        let workflow_type = self.workflow_type.clone();
        async move {
            let decoded: I = decode_payload(&input)?;
            let options = start_options(&ctx, &decoded)?;
            log::debug!(
                "starting workflow {} ({}) for {}/{}",
                workflow_type,
                options.workflow_id,
                ctx.service,
                ctx.operation
            );
            Ok(OperationStart::WorkflowRun(WorkflowRunStart {
                workflow_type,
                options,
                input,
            }))
        }
        .boxed()
    }
}

impl<I, O> fmt::Debug for WorkflowRunOperation<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRunOperation")
            .field("name", &self.name)
            .field("workflow_type", &self.workflow_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::NoValue;

    #[derive(Clone, PartialEq, ::prost::Message)]
    struct Text {
        #[prost(string, tag = "1")]
        value: String,
    }

    fn upper() -> SyncOperation<Text, Text> {
        SyncOperation::new("Upper", |_ctx, input: Text| async move {
            if input.value.is_empty() {
                return Err(HandlerError::bad_request("empty input"));
            }
            Ok(Text {
                value: input.value.to_uppercase(),
            })
        })
    }

    #[tokio::test]
    async fn test_sync_operation_call() {
        let op = upper();
        let out = op
            .call(StartContext::new("svc", "Upper"), Text { value: "abc".into() })
            .await
            .unwrap();
        assert_eq!(out.value, "ABC");
        assert_eq!(op.style(), ExecutionStyle::Direct);
    }

    #[tokio::test]
    async fn test_sync_operation_start_encodes_output() {
        let op = upper();
        let input = encode_payload(&Text { value: "abc".into() });
        let started = op.start(StartContext::new("svc", "Upper"), input).await.unwrap();

        let OperationStart::Completed(bytes) = started else {
            panic!("sync operations complete inline");
        };
        assert_eq!(decode_payload::<Text>(&bytes).unwrap().value, "ABC");
    }

    #[tokio::test]
    async fn test_sync_operation_handler_error() {
        let op = upper();
        let input = encode_payload(&Text::default());
        let err = op
            .start(StartContext::new("svc", "Upper"), input)
            .await
            .unwrap_err();
        assert_eq!(err, HandlerError::bad_request("empty input"));
    }

    #[tokio::test]
    async fn test_sync_operation_rejects_garbage() {
        let op = upper();
        let err = op
            .start(
                StartContext::new("svc", "Upper"),
                Bytes::from_static(&[0x0a, 0x05, b'a']),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::HandlerErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_workflow_run_operation_start() {
        let op: WorkflowRunOperation<Text, NoValue> =
            WorkflowRunOperation::new("Archive", "ArchiveWorkflow", |ctx, input: &Text| {
                Ok(WorkflowStartOptions::new(format!("{}-{}", ctx.request_id, input.value)))
            });
        assert_eq!(op.style(), ExecutionStyle::WorkflowRun);
        assert_eq!(op.workflow_type(), "ArchiveWorkflow");

        let ctx = StartContext::new("svc", "Archive").with_request_id("req-1");
        let input = encode_payload(&Text { value: "doc".into() });
        let started = op.start(ctx, input.clone()).await.unwrap();

        assert_eq!(
            started,
            OperationStart::WorkflowRun(WorkflowRunStart {
                workflow_type: "ArchiveWorkflow".to_string(),
                options: WorkflowStartOptions::new("req-1-doc"),
                input,
            })
        );
    }

    #[test]
    fn test_workflow_run_operation_complete() {
        let op: WorkflowRunOperation<NoValue, Text> =
            WorkflowRunOperation::new("Fetch", "FetchWorkflow", |_ctx, _input: &NoValue| {
                Ok(WorkflowStartOptions::new("fetch"))
            });
        let result = encode_payload(&Text { value: "done".into() });
        assert_eq!(op.complete(&result).unwrap().value, "done");
    }
}
