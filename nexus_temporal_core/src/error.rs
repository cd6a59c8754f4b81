use thiserror::Error;

/// Raised when a payload cannot be decoded into the expected message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("failed to decode payload: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// Classification of handler failures, mirroring Nexus handler error types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerErrorKind {
    /// The request was malformed, retrying will not help
    BadRequest,
    /// The service or operation is not known to this worker
    NotFound,
    /// Unexpected failure inside the handler
    Internal,
    /// Temporary condition, the caller may retry
    Unavailable,
}

/// Error returned by operation handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct HandlerError {
    pub kind: HandlerErrorKind,
    pub message: String,
}

impl HandlerError {
    pub fn new(kind: HandlerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Unavailable, message)
    }

    /// Whether the caller may retry the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            HandlerErrorKind::Internal | HandlerErrorKind::Unavailable
        )
    }
}

impl From<PayloadError> for HandlerError {
    fn from(err: PayloadError) -> Self {
        HandlerError::bad_request(err.to_string())
    }
}

/// Error surfaced to callers awaiting an operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("operation '{operation}' failed: {message}")]
    Failed { operation: String, message: String },

    #[error("operation '{operation}' was canceled")]
    Canceled { operation: String },

    #[error("operation '{operation}' was rejected by its handler: {source}")]
    Handler {
        operation: String,
        #[source]
        source: HandlerError,
    },

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Errors raised while assembling or registering services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("service '{service}' is already registered")]
    DuplicateService { service: String },

    #[error("operation '{operation}' is already registered on service '{service}'")]
    DuplicateOperation { service: String, operation: String },

    #[error("service '{service}' has no operations")]
    EmptyService { service: String },
}
