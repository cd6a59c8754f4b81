//! Descriptor pool built from the files handed over by `protoc`.
//!
//! The request keeps every `FileDescriptorProto` as encoded bytes so that the
//! custom options survive until the pool decodes them with the extensions
//! declared in `nexustemporal/v1/options.proto`.

use prost::Message;
use prost_reflect::{DescriptorPool, FileDescriptor};

use crate::error::{Direction, GenerateError};

/// `google/protobuf/compiler/plugin.proto` request, with `proto_file` left
/// encoded.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CodeGeneratorRequest {
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: Vec<String>,
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    #[prost(bytes = "vec", repeated, tag = "15")]
    pub proto_file: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes = "vec", repeated, tag = "1")]
    file: Vec<Vec<u8>>,
}

/// Field numbers used to build source location paths.
pub(crate) mod path {
    pub const FILE_SERVICE: i32 = 6;
    pub const SERVICE_METHOD: i32 = 2;
}

/// Loads every file of a request into one pool.
///
/// When the pool rejects the request, method payload types are looked up
/// again in a pool built without services, so that a dangling or non-message
/// payload is reported against the operation that names it.
pub fn load_pool(proto_files: &[Vec<u8>]) -> Result<DescriptorPool, GenerateError> {
    let set = RawFileDescriptorSet {
        file: proto_files.to_vec(),
    };
    match DescriptorPool::decode(set.encode_to_vec().as_slice()) {
        Ok(pool) => {
            log::trace!("loaded {} files into the descriptor pool", pool.files().len());
            Ok(pool)
        }
        Err(source) => Err(diagnose(proto_files).unwrap_or_else(|| GenerateError::InvalidDescriptor {
            file: source.file().unwrap_or("<request>").to_string(),
            source,
        })),
    }
}

fn diagnose(proto_files: &[Vec<u8>]) -> Option<GenerateError> {
    let files: Vec<prost_types::FileDescriptorProto> = proto_files
        .iter()
        .map(|bytes| prost_types::FileDescriptorProto::decode(bytes.as_slice()))
        .collect::<Result<_, _>>()
        .ok()?;

    let stripped = prost_types::FileDescriptorSet {
        file: files
            .iter()
            .cloned()
            .map(|mut file| {
                file.service.clear();
                file
            })
            .collect(),
    };
    let pool = DescriptorPool::from_file_descriptor_set(stripped).ok()?;

    for file in &files {
        for service in &file.service {
            for method in &service.method {
                for (direction, type_name) in [
                    (Direction::Input, method.input_type()),
                    (Direction::Output, method.output_type()),
                ] {
                    if let Some(found) = check_payload(&pool, file, type_name) {
                        return Some(payload_error(
                            file,
                            service.name(),
                            method.name(),
                            direction,
                            type_name,
                            found,
                        ));
                    }
                }
            }
        }
    }
    None
}

/// `None` when `type_name` names a message, otherwise what it names instead.
fn check_payload(
    pool: &DescriptorPool,
    file: &prost_types::FileDescriptorProto,
    type_name: &str,
) -> Option<Option<&'static str>> {
    let candidates: Vec<String> = match type_name.strip_prefix('.') {
        Some(full) => vec![full.to_string()],
        None => scopes(file.package()).map(|scope| qualify(scope, type_name)).collect(),
    };
    for candidate in &candidates {
        if pool.get_message_by_name(candidate).is_some() {
            return None;
        }
        if pool.get_enum_by_name(candidate).is_some() {
            return Some(Some("an enum"));
        }
    }
    Some(None)
}

/// `a.b.c`, `a.b`, `a`, then the root package.
fn scopes(package: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(package);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current.is_empty() {
            None
        } else {
            Some(current.rsplit_once('.').map_or("", |(parent, _)| parent))
        };
        Some(current)
    })
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

fn payload_error(
    file: &prost_types::FileDescriptorProto,
    service: &str,
    operation: &str,
    direction: Direction,
    type_name: &str,
    found: Option<&'static str>,
) -> GenerateError {
    let (file, service, operation, type_name) = (
        file.name().to_string(),
        service.to_string(),
        operation.to_string(),
        type_name.to_string(),
    );
    match found {
        Some(found) => GenerateError::InvalidPayloadShape {
            file,
            service,
            operation,
            direction,
            type_name,
            found: found.to_string(),
        },
        None => GenerateError::UnresolvedTypeReference {
            file,
            service,
            operation,
            direction,
            type_name,
        },
    }
}

/// Leading comment attached to the element at `path` of `file`, if any.
pub fn leading_comments<'a>(file: &'a FileDescriptor, path: &[i32]) -> Option<&'a str> {
    file.file_descriptor_proto()
        .source_code_info
        .as_ref()?
        .location
        .iter()
        .find(|loc| loc.path == path)
        .and_then(|loc| loc.leading_comments.as_deref())
}
