//! Drives the generated `example.v1.Example` bindings (split layout) against
//! the runtime: a client talks to a registry through an in-process caller
//! context.

mod common;

use bytes::Bytes;
use common::LocalContext;
use nexus_temporal_core::{
    decode_payload, encode_payload, ExecutionStyle, HandlerError, NoValue, OperationError,
    OperationOptions, Registry, RegistrationError, ServiceRegistry, StartContext, SyncOperation,
    WorkflowRunOperation, WorkflowStartOptions,
};
use nexus_temporal_test_consumer::example::v1::example_nexus_temporal::{
    ExampleNexusClient, ExampleNexusServiceHandler, EXAMPLE_SERVICE_NAME,
};
use nexus_temporal_test_consumer::example::v1::example_nexus_temporal_register::register_example_nexus_service_handler;
use nexus_temporal_test_consumer::example::v1::{ExampleInput, ExampleOutput};

struct ExampleHandler;

impl ExampleNexusServiceHandler for ExampleHandler {
    fn no_input(&self, name: &str) -> SyncOperation<NoValue, ExampleOutput> {
        SyncOperation::new(name, |_ctx, _input: NoValue| async move {
            Ok::<_, HandlerError>(ExampleOutput {
                foo: "bar".to_string(),
            })
        })
    }

    fn echo(&self, name: &str) -> WorkflowRunOperation<ExampleInput, ExampleOutput> {
        WorkflowRunOperation::new(
            name,
            "EchoWorkflow",
            |_ctx: &StartContext, input: &ExampleInput| {
                Ok(WorkflowStartOptions::new(format!("echo-{}", input.foo)))
            },
        )
    }
}

/// Handler whose direct operation is always unavailable.
struct UnavailableHandler;

impl ExampleNexusServiceHandler for UnavailableHandler {
    fn no_input(&self, name: &str) -> SyncOperation<NoValue, ExampleOutput> {
        SyncOperation::new(name, |_ctx, _input: NoValue| async move {
            Err::<ExampleOutput, _>(HandlerError::unavailable("try again later"))
        })
    }

    fn echo(&self, name: &str) -> WorkflowRunOperation<ExampleInput, ExampleOutput> {
        WorkflowRunOperation::new(
            name,
            "EchoWorkflow",
            |_ctx: &StartContext, _input: &ExampleInput| {
                Err(HandlerError::bad_request("echo is disabled"))
            },
        )
    }
}

fn echo_workflow(input: Bytes) -> Result<Bytes, String> {
    let input: ExampleInput = decode_payload(&input).map_err(|err| err.to_string())?;
    Ok(encode_payload(&ExampleOutput { foo: input.foo }))
}

fn context_for<H: ExampleNexusServiceHandler>(handler: &H) -> LocalContext {
    let mut registry = Registry::new();
    register_example_nexus_service_handler(&mut registry, handler).unwrap();
    LocalContext::new(registry).with_workflow("EchoWorkflow", echo_workflow)
}

/// Test 1: Registration adds operations under their declared names, in order
#[test]
fn test_registration_order_and_styles() {
    let ctx = context_for(&ExampleHandler);
    let service = ctx.registry.service(EXAMPLE_SERVICE_NAME).unwrap();

    assert_eq!(service.operation_names().collect::<Vec<_>>(), ["NoInput", "Echo"]);
    assert_eq!(
        service.operation("NoInput").unwrap().style(),
        ExecutionStyle::Direct
    );
    assert_eq!(
        service.operation("Echo").unwrap().style(),
        ExecutionStyle::WorkflowRun
    );
}

/// Test 2: Direct call of a synchronous operation without input
#[tokio::test]
async fn test_direct_call() {
    let ctx = context_for(&ExampleHandler);
    let client = ExampleNexusClient::new("example-endpoint");
    assert_eq!(client.endpoint(), "example-endpoint");

    let output = client
        .no_input(&ctx, OperationOptions::default())
        .await
        .unwrap();
    assert_eq!(output.foo, "bar");
}

/// Test 3: Deferred call of a workflow-backed operation
#[tokio::test]
async fn test_deferred_workflow_call() {
    let ctx = context_for(&ExampleHandler);
    let client = ExampleNexusClient::new("example-endpoint");

    let handle = client.echo_async(
        &ctx,
        ExampleInput {
            foo: "hello".to_string(),
        },
        OperationOptions::default().with_summary("echo hello"),
    );
    assert_eq!(handle.operation(), "Echo");

    let output = handle.result().await.unwrap();
    assert_eq!(output.foo, "hello");

    let direct = client
        .echo(
            &ctx,
            ExampleInput {
                foo: "again".to_string(),
            },
            OperationOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(direct.foo, "again");
}

/// Test 4: Registering the same service twice is rejected by the registry
#[test]
fn test_duplicate_registration() {
    let mut registry = Registry::new();
    register_example_nexus_service_handler(&mut registry, &ExampleHandler).unwrap();

    let err = register_example_nexus_service_handler(&mut registry, &ExampleHandler).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateService {
            service: "example.v1.Example".to_string()
        }
    );
}

/// Test 5: Registration works through trait objects
#[test]
fn test_register_through_dyn() {
    let mut registry = Registry::new();
    let handler: Box<dyn ExampleNexusServiceHandler> = Box::new(ExampleHandler);
    {
        let dyn_registry: &mut dyn ServiceRegistry = &mut registry;
        register_example_nexus_service_handler(dyn_registry, handler.as_ref()).unwrap();
    }
    assert_eq!(registry.service_names().collect::<Vec<_>>(), [EXAMPLE_SERVICE_NAME]);
}

/// Test 6: Handler errors reach the caller with their kind intact
#[tokio::test]
async fn test_handler_errors_propagate() {
    let ctx = context_for(&UnavailableHandler);
    let client = ExampleNexusClient::new("example-endpoint");

    let err = client
        .no_input(&ctx, OperationOptions::default())
        .await
        .unwrap_err();
    match err {
        OperationError::Handler { operation, source } => {
            assert_eq!(operation, "NoInput");
            assert!(source.is_retryable());
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = client
        .echo(&ctx, ExampleInput::default(), OperationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Handler { source, .. } if source == HandlerError::bad_request("echo is disabled")
    ));
}

/// Test 7: A workflow run nobody executes fails the operation
#[tokio::test]
async fn test_missing_workflow_worker() {
    let mut registry = Registry::new();
    register_example_nexus_service_handler(&mut registry, &ExampleHandler).unwrap();
    let ctx = LocalContext::new(registry);

    let err = ExampleNexusClient::new("example-endpoint")
        .echo(&ctx, ExampleInput::default(), OperationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Failed { operation, message }
            if operation == "Echo" && message == "no worker for workflow EchoWorkflow"
    ));
}
