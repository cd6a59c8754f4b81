//! Runtime seams for bindings generated by `protoc-gen-nexus-temporal`.
//!
//! Generated code only ever talks to the types re-exported here. The crate
//! carries no transport: a caller supplies a [`CallerContext`] (usually backed
//! by a workflow context) and a worker supplies a [`ServiceRegistry`].
//!
//! # Key Types
//!
//! - [`CallerContext`] / [`OperationHandle`] - start operations and await their results
//! - [`SyncOperation`] - descriptor for operations that complete inside the start request
//! - [`WorkflowRunOperation`] - descriptor for operations backed by a workflow run
//! - [`Service`] / [`ServiceRegistry`] - named operation sets handed to a worker
//! - [`Registry`] - in-memory registry, useful for tests and local dispatch
//!
//! # Handler Example
//!
//! ```rust,ignore
//! struct Handler;
//!
//! impl ExampleNexusServiceHandler for Handler {
//!     fn no_input(&self, name: &str) -> SyncOperation<NoValue, ExampleOutput> {
//!         SyncOperation::new(name, |_ctx, _input| async move {
//!             Ok(ExampleOutput { foo: "bar".into() })
//!         })
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! register_example_nexus_service_handler(&mut registry, &Handler)?;
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod payload;
pub mod service;

pub use client::{CallerContext, OperationHandle, OperationOptions, OperationRequest};
pub use error::{HandlerError, HandlerErrorKind, OperationError, PayloadError, RegistrationError};
pub use operation::{
    Operation, OperationStart, StartContext, SyncOperation, WorkflowRunOperation,
    WorkflowRunStart, WorkflowStartOptions,
};
pub use payload::{decode_payload, encode_payload, NoValue, Payload};
pub use service::{Registry, Service, ServiceRegistry};

pub use nexus_temporal_types::ExecutionStyle;
