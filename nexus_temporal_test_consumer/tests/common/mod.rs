//! In-process caller context shared by the consumer tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use nexus_temporal_core::{
    decode_payload, encode_payload, CallerContext, OperationError, OperationHandle,
    OperationRequest, OperationStart, Payload, Registry, StartContext,
};

type Workflow = Arc<dyn Fn(Bytes) -> Result<Bytes, String> + Send + Sync>;

/// Caller context resolving operations against an in-process registry and
/// running workflows inline.
#[derive(Clone)]
pub struct LocalContext {
    pub registry: Arc<Registry>,
    workflows: Arc<HashMap<String, Workflow>>,
}

impl LocalContext {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
            workflows: Arc::new(HashMap::new()),
        }
    }

    pub fn with_workflow(
        mut self,
        workflow_type: &str,
        run: impl Fn(Bytes) -> Result<Bytes, String> + Send + Sync + 'static,
    ) -> Self {
        Arc::make_mut(&mut self.workflows).insert(workflow_type.to_string(), Arc::new(run));
        self
    }
}

impl CallerContext for LocalContext {
    fn start_operation<I, O>(&self, request: OperationRequest<I>) -> OperationHandle<O>
    where
        I: Payload,
        O: Payload,
    {
        let registry = self.registry.clone();
        let workflows = self.workflows.clone();
        let operation = request.operation;

        OperationHandle::new(operation, async move {
            let ctx = StartContext::new(request.service, request.operation)
                .with_header("endpoint", request.endpoint);
            let started = registry
                .start(ctx, encode_payload(&request.input))
                .await
                .map_err(|source| OperationError::Handler {
                    operation: operation.to_string(),
                    source,
                })?;

            let output = match started {
                OperationStart::Completed(output) => output,
                OperationStart::WorkflowRun(run) => {
                    let workflow = workflows.get(&run.workflow_type).ok_or_else(|| {
                        OperationError::Failed {
                            operation: operation.to_string(),
                            message: format!("no worker for workflow {}", run.workflow_type),
                        }
                    })?;
                    workflow(run.input).map_err(|message| OperationError::Failed {
                        operation: operation.to_string(),
                        message,
                    })?
                }
            };
            Ok(decode_payload::<O>(&output)?)
        })
    }
}
