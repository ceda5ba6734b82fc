//! Enum to-string declaration synthesis.

use handlegen_schema::SchemaModel;

/// Shape of the to-string declarations of one enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumDeclKind {
    /// 64-bit flag enum: a value overload plus a flags overload named after
    /// the paired flags type.
    Flags64 {
        /// Paired flags type name.
        flags_name: String,
    },
    /// Generic `ToString` specialization, with a flags overload for bit
    /// enums.
    Value {
        /// Whether the enum name marks it as a bit enum.
        bit_flags: bool,
    },
}

/// To-string declarations of one enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    /// Enum name.
    pub enum_name: String,
    /// Declaration shape.
    pub kind: EnumDeclKind,
}

/// Synthesizes declarations for every non-alias enum, sorted by name.
#[must_use]
pub fn enum_decls(model: &SchemaModel) -> Vec<EnumDecl> {
    let mut enums: Vec<_> = model.enums().iter().filter(|e| !e.is_alias()).collect();
    enums.sort_by(|a, b| a.name.cmp(&b.name));

    enums
        .into_iter()
        .map(|e| {
            let kind = if e.is_flags_64bit() {
                EnumDeclKind::Flags64 {
                    flags_name: e.flags_type_name(),
                }
            } else {
                EnumDeclKind::Value {
                    bit_flags: e.is_bit_flags(),
                }
            };
            EnumDecl {
                enum_name: e.name.clone(),
                kind,
            }
        })
        .collect()
}
