//! Descriptor fixtures for the generator.
//!
//! Builds the `FileDescriptorProto`s `protoc` would hand to the plugin,
//! including the well-known files they import, and encodes them the way they
//! travel inside a `CodeGeneratorRequest`.

pub mod descriptor;

use nexus_temporal_types::options::{EXECUTION_STYLE, NEXUS_SERVICE, OPTIONS_PACKAGE, OPTIONS_PROTO_PATH};
use nexus_temporal_types::ExecutionStyle;
use prost::Message;

use descriptor::{
    field_type, label, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    ExtensionRange, FieldDescriptorProto, FileDescriptorProto, Location, MessageOptions,
    MethodDescriptorProto, MethodOptions, ServiceDescriptorProto, ServiceOptions, SourceCodeInfo,
};

pub const EMPTY: &str = ".google.protobuf.Empty";
pub const DESCRIPTOR_PROTO_PATH: &str = "google/protobuf/descriptor.proto";
pub const EMPTY_PROTO_PATH: &str = "google/protobuf/empty.proto";

/// Upper bound of the extension ranges declared by `descriptor.proto`.
const MAX_FIELD_NUMBER: i32 = 536_870_912;

pub fn message(name: &str) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn field(name: &str, number: i32, ty: i32, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label::OPTIONAL),
        r#type: Some(ty),
        type_name: type_name.map(str::to_string),
        json_name: Some(json_name(name)),
        ..Default::default()
    }
}

pub fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
    field(name, number, field_type::STRING, None)
}

/// A message with a single `string value = 1;` field.
pub fn value_message(name: &str) -> DescriptorProto {
    let mut message = message(name);
    message.field.push(string_field("value", 1));
    message
}

/// Adds `map<string, string> <field_name> = <number>;` to `parent`, with the
/// synthetic entry message `protoc` generates for it. `parent_name` is the
/// fully qualified name of `parent`, leading dot included.
pub fn map_field(
    parent: &mut DescriptorProto,
    parent_name: &str,
    field_name: &str,
    entry: &str,
    number: i32,
) {
    let mut entry_message = message(entry);
    entry_message.field = vec![string_field("key", 1), string_field("value", 2)];
    entry_message.options = Some(
        MessageOptions {
            map_entry: Some(true),
        }
        .encode_to_vec(),
    );
    parent.nested_type.push(entry_message);

    let type_name = format!("{parent_name}.{entry}");
    let mut map = field(field_name, number, field_type::MESSAGE, Some(&type_name));
    map.label = Some(label::REPEATED);
    parent.field.push(map);
}

/// An enum with a single zero value.
pub fn enumeration(name: &str) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: vec![EnumValueDescriptorProto {
            name: Some(format!("{}_UNSPECIFIED", name.to_uppercase())),
            number: Some(0),
        }],
    }
}

pub fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        ..Default::default()
    }
}

fn method_options(method: &MethodDescriptorProto) -> MethodOptions {
    method
        .options
        .as_deref()
        .map(|raw| MethodOptions::decode(raw).expect("fixture method options decode"))
        .unwrap_or_default()
}

/// Sets the raw `execution_style` option of a method.
pub fn with_style(mut method: MethodDescriptorProto, tag: i32) -> MethodDescriptorProto {
    let mut options = method_options(&method);
    options.execution_style = Some(tag);
    method.options = Some(options.encode_to_vec());
    method
}

pub fn workflow(method: MethodDescriptorProto) -> MethodDescriptorProto {
    with_style(method, ExecutionStyle::WorkflowRun.tag())
}

pub fn deprecated(mut method: MethodDescriptorProto) -> MethodDescriptorProto {
    let mut options = method_options(&method);
    options.deprecated = Some(true);
    method.options = Some(options.encode_to_vec());
    method
}

pub fn service_with_marker(
    name: &str,
    marker: Option<bool>,
    methods: Vec<MethodDescriptorProto>,
) -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some(name.to_string()),
        method: methods,
        options: marker.map(|marker| {
            ServiceOptions {
                nexus_service: Some(marker),
                ..Default::default()
            }
            .encode_to_vec()
        }),
    }
}

pub fn exposed(name: &str, methods: Vec<MethodDescriptorProto>) -> ServiceDescriptorProto {
    service_with_marker(name, Some(true), methods)
}

/// A proto3 file importing `empty.proto` and the options file.
pub fn file(
    name: &str,
    package: &str,
    messages: Vec<DescriptorProto>,
    services: Vec<ServiceDescriptorProto>,
) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some(package.to_string()),
        dependency: vec![EMPTY_PROTO_PATH.to_string(), OPTIONS_PROTO_PATH.to_string()],
        message_type: messages,
        service: services,
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// Attaches a leading comment to the element at `path`.
pub fn comment(file: &mut FileDescriptorProto, path: Vec<i32>, text: &str) {
    file.source_code_info
        .get_or_insert_with(SourceCodeInfo::default)
        .location
        .push(Location {
            path,
            span: vec![0, 0, 0],
            leading_comments: Some(text.to_string()),
        });
}

fn options_message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        extension_range: vec![ExtensionRange {
            start: Some(1000),
            end: Some(MAX_FIELD_NUMBER),
        }],
        ..Default::default()
    }
}

/// The parts of `google/protobuf/descriptor.proto` the options extend.
pub fn descriptor_file() -> FileDescriptorProto {
    let deprecated = || field("deprecated", 33, field_type::BOOL, None);
    FileDescriptorProto {
        name: Some(DESCRIPTOR_PROTO_PATH.to_string()),
        package: Some("google.protobuf".to_string()),
        message_type: vec![
            options_message("MessageOptions", vec![field("map_entry", 7, field_type::BOOL, None)]),
            options_message("ServiceOptions", vec![deprecated()]),
            options_message("MethodOptions", vec![deprecated()]),
        ],
        syntax: Some("proto2".to_string()),
        ..Default::default()
    }
}

pub fn empty_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(EMPTY_PROTO_PATH.to_string()),
        package: Some("google.protobuf".to_string()),
        message_type: vec![message("Empty")],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// `nexustemporal/v1/options.proto`, as compiled from the bundled source.
pub fn options_file() -> FileDescriptorProto {
    let style_enum = EnumDescriptorProto {
        name: Some("ExecutionStyle".to_string()),
        value: [
            ("EXECUTION_STYLE_UNSPECIFIED", 0),
            ("EXECUTION_STYLE_DIRECT", ExecutionStyle::Direct.tag()),
            ("EXECUTION_STYLE_WORKFLOW_RUN", ExecutionStyle::WorkflowRun.tag()),
        ]
        .into_iter()
        .map(|(name, number)| EnumValueDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
        })
        .collect(),
    };

    let mut nexus_service = field(NEXUS_SERVICE.name, NEXUS_SERVICE.number as i32, field_type::BOOL, None);
    nexus_service.extendee = Some(".google.protobuf.ServiceOptions".to_string());

    let style_type = format!(".{OPTIONS_PACKAGE}.ExecutionStyle");
    let mut execution_style = field(
        EXECUTION_STYLE.name,
        EXECUTION_STYLE.number as i32,
        field_type::ENUM,
        Some(&style_type),
    );
    execution_style.extendee = Some(".google.protobuf.MethodOptions".to_string());

    FileDescriptorProto {
        name: Some(OPTIONS_PROTO_PATH.to_string()),
        package: Some(OPTIONS_PACKAGE.to_string()),
        dependency: vec![DESCRIPTOR_PROTO_PATH.to_string()],
        enum_type: vec![style_enum],
        extension: vec![nexus_service, execution_style],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// Well-known files every fixture depends on, in import order.
pub fn standard_files() -> Vec<FileDescriptorProto> {
    vec![descriptor_file(), empty_file(), options_file()]
}

/// Encodes files for the `proto_file` field of a request.
pub fn encode(files: &[FileDescriptorProto]) -> Vec<Vec<u8>> {
    files.iter().map(Message::encode_to_vec).collect()
}

/// `files` preceded by [`standard_files`], encoded.
pub fn proto_files(files: &[FileDescriptorProto]) -> Vec<Vec<u8>> {
    let mut all = standard_files();
    all.extend_from_slice(files);
    encode(&all)
}

/// `example/v1/example.proto`: `NoInput` is a direct operation without
/// input, `Echo` is backed by a workflow run.
pub fn example_file() -> FileDescriptorProto {
    let payload = |name: &str| {
        let mut message = message(name);
        message.field.push(string_field("foo", 1));
        message
    };
    file(
        "example/v1/example.proto",
        "example.v1",
        vec![payload("ExampleInput"), payload("ExampleOutput")],
        vec![exposed(
            "Example",
            vec![
                method("NoInput", EMPTY, ".example.v1.ExampleOutput"),
                workflow(method(
                    "Echo",
                    ".example.v1.ExampleInput",
                    ".example.v1.ExampleOutput",
                )),
            ],
        )],
    )
}

/// `shapes/v1/shapes.proto`: every call shape in both execution styles,
/// operation names that need escaping or fall back to their declared form,
/// a service without operations and one without the marker.
pub fn shapes_file() -> FileDescriptorProto {
    let direct = ExecutionStyle::Direct.tag();
    let run = ExecutionStyle::WorkflowRun.tag();
    let shape_ops = |suffix: &str, style: i32| {
        vec![
            with_style(method(&format!("Empty{suffix}"), EMPTY, EMPTY), style),
            with_style(method(&format!("Output{suffix}"), EMPTY, ".shapes.v1.Out"), style),
            with_style(method(&format!("Input{suffix}"), ".shapes.v1.In", EMPTY), style),
            with_style(
                method(&format!("InputOutput{suffix}"), ".shapes.v1.In", ".shapes.v1.Out"),
                style,
            ),
        ]
    };
    let mut shapes = shape_ops("Direct", direct);
    shapes.extend(shape_ops("Run", run));
    shapes.push(method("Nested", ".shapes.v1.In", ".shapes.v1.Outer.Inner"));

    let mut outer = message("Outer");
    outer.nested_type.push(value_message("Inner"));

    let mut file = file(
        "shapes/v1/shapes.proto",
        "shapes.v1",
        vec![value_message("In"), value_message("Out"), outer],
        vec![
            exposed("Shapes", shapes),
            exposed(
                "Names",
                vec![
                    method("New", EMPTY, EMPTY),
                    method("Type", ".shapes.v1.In", ".shapes.v1.Out"),
                    method("Foo", EMPTY, EMPTY),
                    method("FooAsync", EMPTY, EMPTY),
                ],
            ),
            exposed("Nothing", vec![]),
            service_with_marker("Hidden", None, vec![method("Ping", EMPTY, EMPTY)]),
        ],
    );
    comment(&mut file, vec![6, 0], " Every call shape.\n");
    file
}

fn json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
