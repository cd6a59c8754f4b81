//! Plugin parameters, passed by `protoc` as `--nexus-temporal_opt=key=value,...`.

use proc_macro2::Span;

use crate::error::GenerateError;

/// Runtime crate the generated code refers to unless overridden.
pub const DEFAULT_RUNTIME_CRATE: &str = "nexus_temporal_core";

/// How generated code is split into files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Clients, handler traits and registration functions share one file
    #[default]
    Single,
    /// Registration functions move into a second `*_register.rs` file
    Split,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub runtime_crate: syn::Path,
    pub layout: Layout,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let runtime = syn::Ident::new(DEFAULT_RUNTIME_CRATE, Span::call_site());
        Self {
            runtime_crate: syn::parse_quote!(::#runtime),
            layout: Layout::Single,
        }
    }
}

impl GeneratorConfig {
    /// Parses the raw parameter string of a `CodeGeneratorRequest`.
    pub fn from_parameter(parameter: Option<&str>) -> Result<Self, GenerateError> {
        let mut config = Self::default();
        let Some(parameter) = parameter else {
            return Ok(config);
        };

        for part in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| invalid(part, "expected key=value"))?;
            match key.trim() {
                "runtime_crate" => {
                    config.runtime_crate = syn::parse_str(value.trim())
                        .map_err(|e| invalid(part, &format!("not a Rust path: {e}")))?;
                }
                "layout" => {
                    config.layout = match value.trim() {
                        "single" => Layout::Single,
                        "split" => Layout::Split,
                        _ => return Err(invalid(part, "expected `single` or `split`")),
                    };
                }
                _ => return Err(invalid(part, "unknown key")),
            }
        }

        Ok(config)
    }

    pub fn with_runtime_crate(mut self, runtime_crate: syn::Path) -> Self {
        self.runtime_crate = runtime_crate;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

fn invalid(parameter: &str, detail: &str) -> GenerateError {
    GenerateError::InvalidParameter {
        parameter: parameter.to_string(),
        detail: detail.to_string(),
    }
}
