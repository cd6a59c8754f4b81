//! The `protoc` plugin protocol around [`Generator`].

use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::CodeGeneratorResponse;

use crate::config::GeneratorConfig;
use crate::descriptor::CodeGeneratorRequest;
use crate::error::GenerateError;
use crate::{Generator, RenderedFile};

pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest, prost::DecodeError> {
    CodeGeneratorRequest::decode(bytes)
}

/// Answers one request. Failures end up in the response's `error` field.
pub fn run(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    match generate(request) {
        Ok(files) => CodeGeneratorResponse {
            supported_features: Some(Feature::Proto3Optional as u64),
            file: files
                .into_iter()
                .map(|file| File {
                    name: Some(file.path),
                    content: Some(file.content),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        },
        Err(err) => {
            log::error!("{err}");
            CodeGeneratorResponse {
                error: Some(err.to_string()),
                supported_features: Some(Feature::Proto3Optional as u64),
                ..Default::default()
            }
        }
    }
}

fn generate(request: &CodeGeneratorRequest) -> Result<Vec<RenderedFile>, GenerateError> {
    let config = GeneratorConfig::from_parameter(request.parameter.as_deref())?;
    Generator::new(config).generate(&request.proto_file, &request.file_to_generate)
}
