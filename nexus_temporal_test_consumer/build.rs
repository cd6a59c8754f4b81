//! Runs the generator over the shared descriptor fixtures and writes its
//! output to OUT_DIR, where `src/lib.rs` includes it.

use std::env;
use std::fs;
use std::path::Path;

use nexus_temporal_gen::{Generator, GeneratorConfig, Layout};
use nexus_temporal_test_proto::{example_file, proto_files, shapes_file};

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=../nexus_temporal_test_proto/src");
    println!("cargo::rerun-if-changed=../nexus_temporal_gen/src");

    let out_dir = env::var("OUT_DIR").unwrap();
    let proto_files = proto_files(&[example_file(), shapes_file()]);

    // One fixture per layout.
    let targets = [
        ("shapes/v1/shapes.proto", Layout::Single),
        ("example/v1/example.proto", Layout::Split),
    ];
    for (target, layout) in targets {
        let generator = Generator::new(GeneratorConfig::default().with_layout(layout));
        let files = generator
            .generate(&proto_files, &[target.to_string()])
            .unwrap_or_else(|err| panic!("generating {target}: {err}"));

        for file in files {
            let dest = Path::new(&out_dir).join(&file.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&dest, file.content).unwrap();
        }
    }
}
