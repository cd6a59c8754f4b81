//! Reads the `nexustemporal.v1` options off service and method descriptors.

use prost_reflect::{DescriptorPool, ExtensionDescriptor, MethodDescriptor, ServiceDescriptor, Value};
use thiserror::Error;

use nexus_temporal_types::options::{EXECUTION_STYLE, NEXUS_SERVICE};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("expects {expected}, found {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: String,
    },
}

/// The custom option extensions, when the request declares them.
///
/// A request that never imports `nexustemporal/v1/options.proto` has no
/// exposed services.
#[derive(Debug, Clone, Default)]
pub struct OptionExtensions {
    nexus_service: Option<ExtensionDescriptor>,
    execution_style: Option<ExtensionDescriptor>,
}

impl OptionExtensions {
    pub fn from_pool(pool: &DescriptorPool) -> Self {
        Self {
            nexus_service: pool.get_extension_by_name(&NEXUS_SERVICE.full_name()),
            execution_style: pool.get_extension_by_name(&EXECUTION_STYLE.full_name()),
        }
    }

    /// Whether the service carries the `nexus_service` marker set to `true`.
    pub fn is_exposed(&self, service: &ServiceDescriptor) -> Result<bool, OptionError> {
        let Some(ext) = &self.nexus_service else {
            return Ok(false);
        };
        let options = service.options();
        if !options.has_extension(ext) {
            return Ok(false);
        }
        match options.get_extension(ext).as_ref() {
            Value::Bool(exposed) => Ok(*exposed),
            other => Err(unexpected("true or false", other)),
        }
    }

    /// Raw `execution_style` enum number of a method, if set.
    pub fn execution_style(&self, method: &MethodDescriptor) -> Result<Option<i32>, OptionError> {
        let Some(ext) = &self.execution_style else {
            return Ok(None);
        };
        let options = method.options();
        if !options.has_extension(ext) {
            return Ok(None);
        }
        match options.get_extension(ext).as_ref() {
            Value::EnumNumber(tag) | Value::I32(tag) => Ok(Some(*tag)),
            other => Err(unexpected("an ExecutionStyle value", other)),
        }
    }
}

fn unexpected(expected: &'static str, found: &Value) -> OptionError {
    OptionError::UnexpectedValue {
        expected,
        found: format!("{found:?}"),
    }
}
