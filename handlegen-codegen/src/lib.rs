//! # handlegen Codegen
//!
//! Handle traversal synthesis and source emission.
//!
//! This crate provides:
//! - An operation IR for remap, registration and length propagation routines
//! - Per-struct traversal synthesis driven by member classification
//! - Extension chain dispatch tables
//! - Enum to-string and replay dump-resources declarations
//! - A `CodeEmitter` trait with a C++ implementation
//! - Configuration, denylist and replay override loading

pub mod commands;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod enums;
pub mod error;
pub mod extension;
pub mod generator;
pub mod ops;
pub mod synth;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod replay_sim;

pub use commands::{CommandDecl, ParamDecl, ParamKind, ParamStyle, dump_resources_decls};
pub use config::{Denylist, GeneratorConfig, ReplayOverrides};
pub use diagnostic::Diagnostic;
pub use emit::{CodeEmitter, CppEmitter, OutputFile};
pub use enums::{EnumDecl, EnumDeclKind, enum_decls};
pub use error::CodegenError;
pub use extension::{ChainDispatch, ChainPlan, DispatchArm, ExtensionChainSynthesizer};
pub use generator::{GeneratedSources, GenerationPlan, Generator, render};
pub use ops::{
    CountedElements, ElementCount, Guard, LiveCount, Op, Routine, RoutineKind, StructRoutines,
};
pub use synth::TraversalSynthesizer;

use handlegen_schema::SchemaModel;
use std::path::Path;

/// Generates C++ sources from a schema description string.
///
/// # Arguments
/// * `xml` - Schema description content
/// * `config` - Generator configuration
///
/// # Returns
/// The rendered output files.
///
/// # Errors
/// Returns `CodegenError` if parsing, model building, or generation fails.
pub fn generate_from_xml(
    xml: &str,
    config: &GeneratorConfig,
) -> Result<GeneratedSources, CodegenError> {
    let schema = handlegen_schema::parse_schema(xml)?;
    let model = SchemaModel::from_schema(&schema)?;
    Generator::new(&model, config).generate()
}

/// Generates C++ sources from a schema description file.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, or generation fails.
pub fn generate_from_file(
    path: &Path,
    config: &GeneratorConfig,
) -> Result<GeneratedSources, CodegenError> {
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml, config)
}
