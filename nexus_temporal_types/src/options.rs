//! Custom protobuf options recognised by the code generator.
//!
//! The definitions live in `proto/nexustemporal/v1/options.proto`, bundled as
//! [`OPTIONS_PROTO`] so that callers can write it next to their own protos.
//!
//! # Options
//!
//! - [`NEXUS_SERVICE`] - boolean marker on `google.protobuf.ServiceOptions`
//! - [`EXECUTION_STYLE`] - [`ExecutionStyle`](crate::ExecutionStyle) tag on
//!   `google.protobuf.MethodOptions`

/// Import path of the bundled options file.
pub const OPTIONS_PROTO_PATH: &str = "nexustemporal/v1/options.proto";

/// Source text of the bundled options file.
pub const OPTIONS_PROTO: &str = include_str!("../proto/nexustemporal/v1/options.proto");

/// Protobuf package of the option extensions.
pub const OPTIONS_PACKAGE: &str = "nexustemporal.v1";

/// Describes one extension field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionField {
    pub name: &'static str,
    pub number: u32,
}

impl OptionField {
    /// Fully-qualified extension name, as written in `option (...)`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", OPTIONS_PACKAGE, self.name)
    }
}

pub const NEXUS_SERVICE: OptionField = OptionField {
    name: "nexus_service",
    number: 51001,
};

pub const EXECUTION_STYLE: OptionField = OptionField {
    name: "execution_style",
    number: 51002,
};
