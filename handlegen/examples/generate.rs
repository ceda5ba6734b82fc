//! Generates handle traversal sources from a schema description.
//!
//! Run with: `cargo run --example generate [schema.xml] [out_dir] [config.json]`
//!
//! Without arguments the bundled `registry.xml` subset is used and the
//! output is printed to stdout. Set `RUST_LOG=debug` for per-struct logs.

use handlegen::prelude::*;
use std::path::PathBuf;

const SAMPLE_REGISTRY: &str = include_str!("registry.xml");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let schema = match args.next() {
        Some(path) => parse_schema_file(&PathBuf::from(path))?,
        None => parse_schema(SAMPLE_REGISTRY)?,
    };
    let out_dir = args.next().map(PathBuf::from);
    let config = match args.next() {
        Some(path) => GeneratorConfig::from_file(&PathBuf::from(path))?,
        None => GeneratorConfig::default()
            .with_dump_resources_calls(["vkCreateSampler", "vkUpdateDescriptorSets"]),
    };

    let model = SchemaModel::from_schema(&schema)?;
    let generator = Generator::new(&model, &config);
    let plan = generator.plan()?;

    let sources = handlegen::codegen::render(&plan, &CppEmitter::from_config(&config));

    match out_dir {
        Some(dir) => {
            sources.write_to_dir(&dir)?;
            tracing::info!(out_dir = %dir.display(), "wrote generated sources");
            println!(
                "Wrote {} routines for {} structs to {} ({} diagnostics)",
                plan.structs.len() * 3,
                plan.structs.len(),
                dir.display(),
                plan.diagnostics.len()
            );
        }
        None => {
            for file in OutputFile::ALL {
                println!("// ===== {} =====", file.file_name());
                println!("{}", sources.get(file));
            }
        }
    }

    Ok(())
}
