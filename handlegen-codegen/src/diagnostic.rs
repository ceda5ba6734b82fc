//! Recoverable findings reported during generation.

use std::fmt;

/// A recoverable generation finding. Diagnostics never abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An extension candidate without handles; it gets no dispatch case.
    ExtensionWithoutHandles {
        /// Canonical extension struct.
        extension: String,
        /// Structs whose chain may carry it.
        bases: Vec<String>,
    },
    /// The override table names a command missing from the schema.
    UnknownOverride {
        /// Command name.
        command: String,
    },
    /// The dump-resources list names a command missing from the schema.
    UnknownDumpResourcesCall {
        /// Command name.
        command: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtensionWithoutHandles { extension, bases } => write!(
                f,
                "extension '{}' of {} contains no handles and has no dispatch case",
                extension,
                bases.join(", ")
            ),
            Self::UnknownOverride { command } => {
                write!(f, "override for unknown command '{command}'")
            }
            Self::UnknownDumpResourcesCall { command } => {
                write!(f, "dump-resources call names unknown command '{command}'")
            }
        }
    }
}
