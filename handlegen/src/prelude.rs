//! Prelude module for convenient imports.
//!
//! ```ignore
//! use handlegen::prelude::*;
//! ```

// Schema types
pub use handlegen_schema::{
    Cardinality, MemberKind, ParseError, SchemaError, SchemaModel, StructDescriptor, classify,
    parse_schema, parse_schema_file,
};

// Generation
pub use handlegen_codegen::{
    CodeEmitter, CodegenError, CppEmitter, Denylist, Diagnostic, GeneratedSources,
    GenerationPlan, Generator, GeneratorConfig, OutputFile, ReplayOverrides,
};

// Operation IR
pub use handlegen_codegen::{
    ChainDispatch, DispatchArm, ElementCount, Guard, LiveCount, Op, Routine, RoutineKind,
    StructRoutines,
};
