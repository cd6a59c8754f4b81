//! Generation engine of `protoc-gen-nexus-temporal`.
//!
//! Turns protobuf services marked with `option (nexustemporal.v1.nexus_service) = true`
//! into Rust bindings for [`nexus_temporal_core`](https://docs.rs/nexus_temporal_core):
//! a typed client per service, a handler trait and a registration function.
//!
//! The pipeline for each requested file is
//!
//! 1. [`service::build_file_model`] - descriptor pool to [`service::FileModel`]
//! 2. [`classify::classify_file`] - call shape and execution style per operation
//! 3. [`naming::resolve_file`] - collision free identifiers
//! 4. [`render::render_file`] - token streams
//! 5. [`output::assemble`] - formatted output files
//!
//! ```ignore
//! let generator = Generator::new(GeneratorConfig::default());
//! let files = generator.generate(&request.proto_file, &request.file_to_generate)?;
//! ```

pub mod classify;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod naming;
pub mod options;
pub mod output;
pub mod plugin;
pub mod render;
pub mod service;

pub use config::{GeneratorConfig, Layout};
pub use error::{Direction, GenerateError};
pub use output::RenderedFile;

use naming::NamingContext;
use prost_reflect::DescriptorPool;

#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates bindings for every file in `file_to_generate`, in order.
    ///
    /// `proto_files` are the encoded `FileDescriptorProto`s of the request,
    /// dependencies first. The first error aborts the batch; nothing is
    /// returned for files that succeeded before it.
    pub fn generate(
        &self,
        proto_files: &[Vec<u8>],
        file_to_generate: &[String],
    ) -> Result<Vec<RenderedFile>, GenerateError> {
        let pool = descriptor::load_pool(proto_files)?;
        self.generate_from_pool(&pool, file_to_generate)
    }

    pub fn generate_from_pool(
        &self,
        pool: &DescriptorPool,
        file_to_generate: &[String],
    ) -> Result<Vec<RenderedFile>, GenerateError> {
        let mut output = Vec::new();
        for name in file_to_generate {
            output.extend(self.generate_file(pool, name)?);
        }
        log::info!(
            "generated {} files for {} inputs",
            output.len(),
            file_to_generate.len()
        );
        Ok(output)
    }

    /// Generates the output files of one input file.
    ///
    /// Files without exposed services produce nothing.
    pub fn generate_file(
        &self,
        pool: &DescriptorPool,
        name: &str,
    ) -> Result<Vec<RenderedFile>, GenerateError> {
        let file = pool.get_file_by_name(name).ok_or_else(|| GenerateError::UnknownFile {
            file: name.to_string(),
        })?;

        let model = classify::classify_file(service::build_file_model(pool, &file)?)?;
        if model.services.is_empty() {
            log::debug!("{name}: no exposed services");
            return Ok(Vec::new());
        }

        let mut ctx = NamingContext::new(name);
        let names = naming::resolve_file(&mut ctx, &model, self.config.layout)?;
        for (key, ident) in ctx.chosen() {
            log::trace!("{name}: {key} -> {ident}");
        }
        let modules = render::render_file(&model, &names, &self.config);
        output::assemble(name, modules)
    }
}
