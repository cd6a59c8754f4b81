use std::fmt;

use thiserror::Error;

/// Which payload of an operation a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Fatal generation failures. The first one aborts the whole batch.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(
        "{file}: {service}.{operation}: {direction} type '{type_name}' is not defined in the file or its imports"
    )]
    UnresolvedTypeReference {
        file: String,
        service: String,
        operation: String,
        direction: Direction,
        type_name: String,
    },

    #[error(
        "{file}: {service}.{operation}: {direction} type '{type_name}' is {found}, operations take a single message or google.protobuf.Empty"
    )]
    InvalidPayloadShape {
        file: String,
        service: String,
        operation: String,
        direction: Direction,
        type_name: String,
        found: String,
    },

    #[error("{file}: identifier '{ident}' for {owner} collides with {existing} in {scope}")]
    NamingCollision {
        file: String,
        scope: String,
        ident: String,
        owner: String,
        existing: String,
    },

    #[error("{file}: {location}: option ({option}) {detail}")]
    MalformedOption {
        file: String,
        location: String,
        option: String,
        detail: String,
    },

    #[error("{file}: invalid descriptor: {source}")]
    InvalidDescriptor {
        file: String,
        #[source]
        source: prost_reflect::DescriptorError,
    },

    #[error("{file}: requested for generation but missing from the request")]
    UnknownFile { file: String },

    #[error("invalid plugin parameter '{parameter}': {detail}")]
    InvalidParameter { parameter: String, detail: String },

    #[error("{file}: generated code failed to parse: {source}")]
    Render {
        file: String,
        #[source]
        source: syn::Error,
    },
}
