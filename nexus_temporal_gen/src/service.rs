//! Normalized view of the exposed services of one input file.

use prost_reflect::{DescriptorPool, FileDescriptor, MessageDescriptor};

use nexus_temporal_types::options::{EXECUTION_STYLE, NEXUS_SERVICE};
use nexus_temporal_types::ExecutionStyle;

use crate::descriptor::{leading_comments, path};
use crate::error::GenerateError;
use crate::options::{OptionError, OptionExtensions};

const EMPTY: &str = "google.protobuf.Empty";

/// What a payload type points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Message,
    /// Synthetic entry message generated by `protoc` for a `map<K, V>` field
    MapEntry,
}

impl TypeKind {
    pub fn describe(self) -> &'static str {
        match self {
            TypeKind::Message => "a message",
            TypeKind::MapEntry => "a map entry message",
        }
    }
}

/// A resolved protobuf type, split so a Rust path can be built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub package: String,
    /// Message nesting chain, outermost first, ending with the type itself
    pub path: Vec<String>,
    pub kind: TypeKind,
}

impl TypeRef {
    /// `None` for `google.protobuf.Empty`, which maps to no payload.
    pub fn from_message(message: &MessageDescriptor) -> Option<Self> {
        if message.full_name() == EMPTY {
            return None;
        }

        let mut path = vec![message.name().to_string()];
        let mut parent = message.parent_message();
        while let Some(current) = parent {
            path.insert(0, current.name().to_string());
            parent = current.parent_message();
        }

        Some(Self {
            package: message.package_name().to_string(),
            path,
            kind: if message.is_map_entry() {
                TypeKind::MapEntry
            } else {
                TypeKind::Message
            },
        })
    }

    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.path.join(".")
        } else {
            format!("{}.{}", self.package, self.path.join("."))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationModel {
    /// Declared method name, also the operation name on the wire
    pub name: String,
    /// `None` when the method takes `google.protobuf.Empty`
    pub input: Option<TypeRef>,
    pub output: Option<TypeRef>,
    pub input_type_name: String,
    pub output_type_name: String,
    /// Raw `execution_style` option value, if set
    pub style_tag: Option<i32>,
    /// Filled in by [`crate::classify`]
    pub execution_style: ExecutionStyle,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub deprecated: bool,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceModel {
    pub name: String,
    pub package: String,
    pub operations: Vec<OperationModel>,
    pub docs: Vec<String>,
}

impl ServiceModel {
    /// Fully qualified name, used as the service name on the wire.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Exposed services of one input file, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileModel {
    pub path: String,
    pub package: String,
    pub services: Vec<ServiceModel>,
}

/// Builds the model of every service carrying the `nexus_service` marker.
///
/// Unmarked services are skipped. Payload types were resolved by the pool;
/// their shape is checked in [`crate::classify`].
pub fn build_file_model(pool: &DescriptorPool, file: &FileDescriptor) -> Result<FileModel, GenerateError> {
    let path = file.name().to_string();
    let package = file.package_name().to_string();
    let extensions = OptionExtensions::from_pool(pool);

    let mut services = Vec::new();
    for (service_idx, service) in file.services().enumerate() {
        let service_name = service.name().to_string();
        let service_path = [path::FILE_SERVICE, service_idx as i32];

        let exposed = extensions.is_exposed(&service).map_err(|err| {
            malformed(
                &path,
                format!("service {service_name}"),
                NEXUS_SERVICE.full_name(),
                err,
            )
        })?;
        if !exposed {
            log::debug!("{path}: skipping service {service_name} without the nexus_service marker");
            continue;
        }

        let mut operations = Vec::new();
        for (method_idx, method) in service.methods().enumerate() {
            let name = method.name().to_string();
            let style_tag = extensions.execution_style(&method).map_err(|err| {
                malformed(
                    &path,
                    format!("{service_name}.{name}"),
                    EXECUTION_STYLE.full_name(),
                    err,
                )
            })?;

            let proto = method.method_descriptor_proto();
            let method_path = [
                service_path[0],
                service_path[1],
                path::SERVICE_METHOD,
                method_idx as i32,
            ];
            operations.push(OperationModel {
                input: TypeRef::from_message(&method.input()),
                output: TypeRef::from_message(&method.output()),
                input_type_name: proto.input_type().to_string(),
                output_type_name: proto.output_type().to_string(),
                style_tag,
                execution_style: ExecutionStyle::default(),
                client_streaming: method.is_client_streaming(),
                server_streaming: method.is_server_streaming(),
                deprecated: proto.options.as_ref().is_some_and(|options| options.deprecated()),
                docs: doc_lines(leading_comments(file, &method_path)),
                name,
            });
        }

        log::debug!(
            "{path}: exposing service {service_name} with {} operations",
            operations.len()
        );
        services.push(ServiceModel {
            name: service_name,
            package: package.clone(),
            operations,
            docs: doc_lines(leading_comments(file, &service_path)),
        });
    }

    Ok(FileModel {
        path,
        package,
        services,
    })
}

fn malformed(file: &str, location: String, option: String, err: OptionError) -> GenerateError {
    GenerateError::MalformedOption {
        file: file.to_string(),
        location,
        option,
        detail: err.to_string(),
    }
}

/// Splits a protobuf leading comment into doc lines.
///
/// The single space `protoc` keeps after `//` is dropped; blank lines at
/// either end are removed.
pub fn doc_lines(comment: Option<&str>) -> Vec<String> {
    let Some(comment) = comment else {
        return Vec::new();
    };
    let mut lines: Vec<String> = comment
        .lines()
        .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end().to_string())
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|line| line.is_empty()).count();
    lines.drain(..leading);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::load_pool;
    use nexus_temporal_test_proto::descriptor::{field_type, FileDescriptorProto};
    use nexus_temporal_test_proto::{
        comment, deprecated, encode, example_file, exposed, file, map_field, message, method,
        options_file, proto_files, service_with_marker, shapes_file, standard_files, workflow,
        EMPTY as EMPTY_TYPE,
    };

    fn build(files: &[FileDescriptorProto], name: &str) -> Result<FileModel, GenerateError> {
        let pool = load_pool(&proto_files(files)).unwrap();
        let file = pool.get_file_by_name(name).unwrap();
        build_file_model(&pool, &file)
    }

    fn example() -> FileDescriptorProto {
        let mut input = example_file();
        input.service.push(service_with_marker(
            "Internal",
            None,
            vec![method("Ping", EMPTY_TYPE, EMPTY_TYPE)],
        ));
        comment(&mut input, vec![6, 0], " Example service.\n");
        comment(&mut input, vec![6, 0, 2, 1], " Echoes.\n\n More text.\n");
        input
    }

    #[test]
    fn test_build_skips_unmarked_services() {
        let model = build(&[example()], "example/v1/example.proto").unwrap();

        assert_eq!(model.package, "example.v1");
        assert_eq!(model.services.len(), 1);
        let service = &model.services[0];
        assert_eq!(service.full_name(), "example.v1.Example");
        assert_eq!(service.docs, ["Example service."]);

        let names: Vec<_> = service.operations.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, ["NoInput", "Echo"]);
    }

    #[test]
    fn test_empty_is_no_value() {
        let model = build(&[example()], "example/v1/example.proto").unwrap();
        let no_input = &model.services[0].operations[0];

        assert_eq!(no_input.input, None);
        assert_eq!(
            no_input.output.as_ref().map(TypeRef::full_name).as_deref(),
            Some("example.v1.ExampleOutput")
        );
        assert_eq!(no_input.input_type_name, ".google.protobuf.Empty");
    }

    #[test]
    fn test_operation_docs() {
        let model = build(&[example()], "example/v1/example.proto").unwrap();
        assert_eq!(model.services[0].operations[1].docs, ["Echoes.", "", "More text."]);
        assert!(model.services[0].operations[0].docs.is_empty());
    }

    #[test]
    fn test_nested_and_map_entry_types() {
        let mut holder = message("Holder");
        map_field(&mut holder, ".kinds.Holder", "labels", "LabelsEntry", 1);
        let input = file(
            "kinds.proto",
            "kinds",
            vec![holder],
            vec![exposed("Kinds", vec![method("Tags", EMPTY_TYPE, ".kinds.Holder.LabelsEntry")])],
        );
        let model = build(&[input], "kinds.proto").unwrap();
        let output = model.services[0].operations[0].output.clone().unwrap();
        assert_eq!(output.path, ["Holder", "LabelsEntry"]);
        assert_eq!(output.kind, TypeKind::MapEntry);
        assert_eq!(output.full_name(), "kinds.Holder.LabelsEntry");

        let model = build(&[shapes_file()], "shapes/v1/shapes.proto").unwrap();
        let nested = model.services[0]
            .operations
            .iter()
            .find(|op| op.name == "Nested")
            .and_then(|op| op.output.clone())
            .unwrap();
        assert_eq!(nested.package, "shapes.v1");
        assert_eq!(nested.path, ["Outer", "Inner"]);
        assert_eq!(nested.kind, TypeKind::Message);
    }

    #[test]
    fn test_method_options_are_carried() {
        let mut input = example();
        input.service[0].method[1] = deprecated(workflow(method(
            "Echo",
            ".example.v1.ExampleInput",
            ".example.v1.ExampleOutput",
        )));
        let model = build(&[input], "example/v1/example.proto").unwrap();
        let echo = &model.services[0].operations[1];

        assert!(echo.deprecated);
        assert_eq!(echo.style_tag, Some(2));
        assert!(!model.services[0].operations[0].deprecated);
    }

    #[test]
    fn test_malformed_marker() {
        let mut options = options_file();
        options.extension[0].r#type = Some(field_type::INT32);
        let mut files = standard_files();
        files[2] = options;
        files.push(example_file());

        let pool = load_pool(&encode(&files)).unwrap();
        let file = pool.get_file_by_name("example/v1/example.proto").unwrap();
        assert!(matches!(
            build_file_model(&pool, &file),
            Err(GenerateError::MalformedOption { location, option, .. })
                if location == "service Example" && option == "nexustemporal.v1.nexus_service"
        ));
    }

    #[test]
    fn test_doc_lines() {
        assert!(doc_lines(None).is_empty());
        assert_eq!(doc_lines(Some("\n one\n  two\n\n")), ["one", " two"]);
    }
}
