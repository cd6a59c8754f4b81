//! Output files handed back to `protoc`.

use proc_macro2::TokenStream;

use crate::error::GenerateError;
use crate::render::RenderedModules;

/// Suffix of the bindings file, appended to the `.proto` file stem.
pub const BINDINGS_SUFFIX: &str = "_nexus_temporal.rs";
/// Suffix of the registration file written with the split layout.
pub const REGISTER_SUFFIX: &str = "_nexus_temporal_register.rs";

/// A generated file, relative to the plugin's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: String,
}

/// `a/b/c.proto` with suffix `_x.rs` becomes `a/b/c_x.rs`.
pub fn output_path(proto_path: &str, suffix: &str) -> String {
    let stem = proto_path.strip_suffix(".proto").unwrap_or(proto_path);
    format!("{stem}{suffix}")
}

pub fn header(source: &str) -> String {
    format!(
        "// @generated by protoc-gen-nexus-temporal {}. DO NOT EDIT.\n// source: {source}\n\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Parses emitted tokens back and pretty-prints them under the header.
pub fn format_file(source: &str, tokens: TokenStream) -> Result<String, GenerateError> {
    let file = syn::parse2::<syn::File>(tokens).map_err(|source_err| GenerateError::Render {
        file: source.to_string(),
        source: source_err,
    })?;
    Ok(format!("{}{}", header(source), prettyplease::unparse(&file)))
}

/// Turns the rendered modules of one input file into output files.
pub fn assemble(source: &str, modules: RenderedModules) -> Result<Vec<RenderedFile>, GenerateError> {
    let mut files = vec![RenderedFile {
        path: output_path(source, BINDINGS_SUFFIX),
        content: format_file(source, modules.bindings)?,
    }];
    if let Some(register) = modules.register {
        files.push(RenderedFile {
            path: output_path(source, REGISTER_SUFFIX),
            content: format_file(source, register)?,
        });
    }
    Ok(files)
}
