//! # handlegen Schema
//!
//! Schema description reader and handle-aware type model.
//!
//! This crate provides:
//! - XML schema description parsing
//! - Raw definitions for types, structs, enums and commands
//! - Validation of length, discriminant and tag references
//! - A resolved model with handle reachability and extension registries
//! - Per-member traversal classification

pub mod classify;
pub mod error;
pub mod model;
pub mod parser;
pub mod types;
pub mod validation;

pub use classify::{MemberKind, classify, handle_members};
pub use error::{ParseError, SchemaError};
pub use model::{
    CommandDescriptor, EnumDescriptor, HandleTableBinding, MemberDescriptor, RegistryEntry,
    SchemaModel, StructDescriptor, TypeDescriptor,
};
pub use parser::{parse_schema, parse_schema_file};
pub use types::{
    Cardinality, CommandDef, EnumDef, HandleDef, MemberDef, ScalarDef, Schema, StructDef,
    TypeCategory, TypeDef,
};
