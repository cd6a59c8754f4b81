use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{HandlerError, RegistrationError};
use crate::operation::{Operation, OperationStart, StartContext};

/// A named, ordered set of operations, built by generated `register_*` functions.
pub struct Service {
    name: String,
    operations: Vec<Box<dyn Operation>>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds an operation descriptor, rejecting a second operation with the same name.
    pub fn add_operation<O>(&mut self, operation: O) -> Result<(), RegistrationError>
    where
        O: Operation + 'static,
    {
        if self.operation(operation.name()).is_some() {
            return Err(RegistrationError::DuplicateOperation {
                service: self.name.clone(),
                operation: operation.name().to_string(),
            });
        }
        self.operations.push(Box::new(operation));
        Ok(())
    }

    pub fn operation(&self, name: &str) -> Option<&dyn Operation> {
        self.operations
            .iter()
            .find(|op| op.name() == name)
            .map(|op| &**op)
    }

    /// Operation names in the order they were added.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|op| op.name())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("operations", &self.operation_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Destination of generated registration functions, usually a worker.
///
/// Whether registering the same service twice is an error is up to the
/// implementation.
pub trait ServiceRegistry {
    fn register_service(&mut self, service: Service) -> Result<(), RegistrationError>;
}

/// In-memory [`ServiceRegistry`] that rejects duplicate and empty services.
#[derive(Debug, Default)]
pub struct Registry {
    services: BTreeMap<String, Service>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(|name| name.as_str())
    }

    /// Dispatches a start request to the operation named by `ctx`.
    pub fn start(
        &self,
        ctx: StartContext,
        input: Bytes,
    ) -> BoxFuture<'static, Result<OperationStart, HandlerError>> {
        let Some(service) = self.services.get(&ctx.service) else {
            let err = HandlerError::not_found(format!("service '{}' not found", ctx.service));
            return futures::future::ready(Err(err)).boxed();
        };
        let Some(operation) = service.operation(&ctx.operation) else {
            let err = HandlerError::not_found(format!(
                "operation '{}' not found in service '{}'",
                ctx.operation, ctx.service
            ));
            return futures::future::ready(Err(err)).boxed();
        };

        log::trace!("dispatching {}/{}", ctx.service, ctx.operation);
        operation.start(ctx, input)
    }
}

impl ServiceRegistry for Registry {
    fn register_service(&mut self, service: Service) -> Result<(), RegistrationError> {
        if service.is_empty() {
            return Err(RegistrationError::EmptyService {
                service: service.name,
            });
        }
        if self.services.contains_key(&service.name) {
            log::warn!("service {} registered twice", service.name);
            return Err(RegistrationError::DuplicateService {
                service: service.name,
            });
        }

        log::debug!(
            "registered service {} with {} operations",
            service.name,
            service.len()
        );
        self.services.insert(service.name.clone(), service);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::SyncOperation;
    use crate::payload::NoValue;

    fn noop(name: &str) -> SyncOperation<NoValue, NoValue> {
        SyncOperation::new(name, |_ctx, _input: NoValue| async move {
            Ok::<_, HandlerError>(())
        })
    }

    #[test]
    fn test_service_preserves_order() {
        let mut service = Service::new("example.v1.Example");
        service.add_operation(noop("B")).unwrap();
        service.add_operation(noop("A")).unwrap();
        assert_eq!(service.operation_names().collect::<Vec<_>>(), ["B", "A"]);
    }

    #[test]
    fn test_service_rejects_duplicate_operation() {
        let mut service = Service::new("example.v1.Example");
        service.add_operation(noop("Echo")).unwrap();
        let err = service.add_operation(noop("Echo")).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateOperation {
                service: "example.v1.Example".to_string(),
                operation: "Echo".to_string(),
            }
        );
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = Registry::new();
        let mut first = Service::new("svc");
        first.add_operation(noop("Op")).unwrap();
        registry.register_service(first).unwrap();

        let mut second = Service::new("svc");
        second.add_operation(noop("Op")).unwrap();
        assert_eq!(
            registry.register_service(second).unwrap_err(),
            RegistrationError::DuplicateService {
                service: "svc".to_string()
            }
        );
        assert_eq!(registry.service_names().collect::<Vec<_>>(), ["svc"]);
    }

    #[test]
    fn test_registry_rejects_empty_service() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register_service(Service::new("svc")),
            Err(RegistrationError::EmptyService { .. })
        ));
    }

    #[tokio::test]
    async fn test_start_unknown_operation() {
        let mut registry = Registry::new();
        let mut service = Service::new("svc");
        service.add_operation(noop("Op")).unwrap();
        registry.register_service(service).unwrap();

        let err = registry
            .start(StartContext::new("svc", "Missing"), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::HandlerErrorKind::NotFound);

        let err = registry
            .start(StartContext::new("other", "Op"), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::HandlerErrorKind::NotFound);

        let ok = registry
            .start(StartContext::new("svc", "Op"), Bytes::new())
            .await
            .unwrap();
        assert_eq!(ok, OperationStart::Completed(Bytes::new()));
    }
}
