//! # handlegen
//!
//! Handle traversal code generator for graphics API capture/replay tooling.
//!
//! Given a schema of an API's structs, handles, enums and commands, handlegen
//! synthesizes the routines a replayer needs to move handles between the
//! captured and the live identity space.
//!
//! ## Features
//!
//! - **Remap** - rewrite captured handle ids embedded in decoded structs
//! - **Register** - record handles created by a call under their parent
//! - **Length propagation** - size decoded handle storage through nesting
//! - **Extension chains** - closed, tag-dispatched walks over `pNext`-style lists
//!
//! ## Quick Start
//!
//! ```ignore
//! use handlegen::prelude::*;
//!
//! let schema = parse_schema(xml)?;
//! let model = SchemaModel::from_schema(&schema)?;
//! let config = GeneratorConfig::default();
//! let sources = Generator::new(&model, &config).generate()?;
//! sources.write_to_dir(out_dir)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Schema description reading, validation and the resolved model
//! - [`codegen`] - Traversal synthesis, configuration and emitters

pub mod prelude;

/// Schema reading, validation and the resolved model.
pub mod schema {
    pub use handlegen_schema::*;
}

/// Traversal synthesis and source emission.
pub mod codegen {
    pub use handlegen_codegen::*;
}

pub use handlegen_codegen::{
    CodegenError, GeneratedSources, Generator, GeneratorConfig, generate_from_file,
    generate_from_xml,
};
pub use handlegen_schema::{SchemaModel, parse_schema, parse_schema_file};
