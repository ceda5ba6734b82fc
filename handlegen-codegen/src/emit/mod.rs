//! Rendering of synthesized IR into source text.

pub mod cpp;

pub use cpp::CppEmitter;

use crate::commands::CommandDecl;
use crate::enums::EnumDecl;
use crate::extension::ChainDispatch;
use crate::ops::Routine;

/// Output files produced by one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFile {
    /// Declarations of traversal and dispatch routines.
    HandleMappersHeader,
    /// Definitions of traversal and dispatch routines.
    HandleMappers,
    /// Enum to-string declarations.
    EnumToStringHeader,
    /// Dump-resources declarations.
    DumpResourcesHeader,
}

impl OutputFile {
    /// All output files in write order.
    pub const ALL: [Self; 4] = [
        Self::HandleMappersHeader,
        Self::HandleMappers,
        Self::EnumToStringHeader,
        Self::DumpResourcesHeader,
    ];

    /// Returns the file name written for this output.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::HandleMappersHeader => "generated_struct_handle_mappers.h",
            Self::HandleMappers => "generated_struct_handle_mappers.cpp",
            Self::EnumToStringHeader => "generated_enum_to_string.h",
            Self::DumpResourcesHeader => "generated_dump_resources.h",
        }
    }
}

/// Renders IR into a target language.
///
/// Emitters are pure: the same IR always yields the same text.
pub trait CodeEmitter {
    /// Renders the text preceding the content of a file.
    fn prologue(&self, file: OutputFile) -> String {
        let _ = file;
        String::new()
    }

    /// Renders the text following the content of a file.
    fn epilogue(&self, file: OutputFile) -> String {
        let _ = file;
        String::new()
    }

    /// Renders the declaration of a traversal routine.
    fn routine_declaration(&self, routine: &Routine) -> String;

    /// Renders the definition of a traversal routine.
    fn routine_definition(&self, routine: &Routine) -> String;

    /// Renders the declaration of a chain dispatch routine.
    fn dispatch_declaration(&self, dispatch: &ChainDispatch) -> String;

    /// Renders the definition of a chain dispatch routine.
    fn dispatch_definition(&self, dispatch: &ChainDispatch) -> String;

    /// Renders the to-string declarations of an enum.
    fn enum_declaration(&self, decl: &EnumDecl) -> String;

    /// Renders a dump-resources declaration.
    fn command_declaration(&self, decl: &CommandDecl) -> String;
}
