//! `protoc` plugin entry point.
//!
//! ```text
//! protoc --plugin=protoc-gen-nexus-temporal --nexus-temporal_out=src/gen \
//!     --nexus-temporal_opt=layout=split example/v1/example.proto
//! ```

use std::io::{Read, Write};

use anyhow::Context;
use clap::Parser;
use prost::Message;

use nexus_temporal_gen::plugin;

/// Reads a CodeGeneratorRequest on stdin and writes a CodeGeneratorResponse on stdout.
///
/// Generator options are passed by protoc through `--nexus-temporal_opt`:
/// `runtime_crate=<path>` and `layout=single|split`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {}

fn main() -> anyhow::Result<()> {
    let _args = Args::parse();

    // stdout carries the response
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("failed to read the code generator request from stdin")?;
    let request =
        plugin::decode_request(&input).context("failed to decode the code generator request")?;
    log::debug!("received request for {:?}", request.file_to_generate);

    let response = plugin::run(&request);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .context("failed to write the code generator response")?;
    stdout.flush()?;
    Ok(())
}
