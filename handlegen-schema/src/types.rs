//! Schema type definitions.
//!
//! This module contains the data structures read from a schema description
//! document: scalar and handle types, structs with their members, enums and
//! commands. Definitions here are unresolved; [`crate::model::SchemaModel`]
//! turns them into the queryable descriptors used by code generation.

use std::collections::HashMap;

/// Complete schema description.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Registry name (e.g. `vulkan`).
    pub name: String,
    /// Type definitions in declaration order.
    pub types: Vec<TypeDef>,
    /// Command definitions in declaration order.
    pub commands: Vec<CommandDef>,
    /// Type lookup map (built during parsing).
    type_map: HashMap<String, usize>,
}

impl Schema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a type definition to the schema.
    pub fn add_type(&mut self, type_def: TypeDef) {
        let name = type_def.name().to_string();
        let index = self.types.len();
        self.types.push(type_def);
        self.type_map.insert(name, index);
    }

    /// Adds a command definition to the schema.
    pub fn add_command(&mut self, command: CommandDef) {
        self.commands.push(command);
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.type_map.get(name).map(|&idx| &self.types[idx])
    }

    /// Returns true if a type with the given name exists.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.type_map.contains_key(name)
    }

    /// Builds the type lookup map from the types vector.
    pub fn build_type_map(&mut self) {
        self.type_map.clear();
        for (idx, type_def) in self.types.iter().enumerate() {
            self.type_map.insert(type_def.name().to_string(), idx);
        }
    }

    /// Iterates over struct definitions in declaration order.
    pub fn structs(&self) -> impl Iterator<Item = &StructDef> {
        self.types.iter().filter_map(|t| match t {
            TypeDef::Struct(s) => Some(s),
            _ => None,
        })
    }

    /// Iterates over enum definitions in declaration order.
    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.types.iter().filter_map(|t| match t {
            TypeDef::Enum(e) => Some(e),
            _ => None,
        })
    }
}

/// Broad category of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// Plain value type (integers, floats, `void`, opaque platform types).
    Scalar,
    /// Opaque resource identifier.
    Handle,
    /// Aggregate with ordered members.
    Struct,
    /// Enumeration or bit-flag enumeration.
    Enum,
}

impl TypeCategory {
    /// Parses a category attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scalar" | "basetype" => Some(Self::Scalar),
            "handle" => Some(Self::Handle),
            "struct" => Some(Self::Struct),
            "enum" | "bitmask" => Some(Self::Enum),
            _ => None,
        }
    }
}

/// Type definition variants.
#[derive(Debug, Clone)]
pub enum TypeDef {
    /// Scalar type.
    Scalar(ScalarDef),
    /// Handle type.
    Handle(HandleDef),
    /// Struct type.
    Struct(StructDef),
    /// Enum type.
    Enum(EnumDef),
}

impl TypeDef {
    /// Returns the name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(s) => &s.name,
            Self::Handle(h) => &h.name,
            Self::Struct(s) => &s.name,
            Self::Enum(e) => &e.name,
        }
    }

    /// Returns the category of the type.
    #[must_use]
    pub const fn category(&self) -> TypeCategory {
        match self {
            Self::Scalar(_) => TypeCategory::Scalar,
            Self::Handle(_) => TypeCategory::Handle,
            Self::Struct(_) => TypeCategory::Struct,
            Self::Enum(_) => TypeCategory::Enum,
        }
    }

    /// Returns the aliased type name, if this definition is an alias.
    #[must_use]
    pub fn alias_of(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Handle(h) => h.alias.as_deref(),
            Self::Struct(s) => s.alias.as_deref(),
            Self::Enum(e) => e.alias.as_deref(),
        }
    }
}

/// Scalar type definition.
#[derive(Debug, Clone)]
pub struct ScalarDef {
    /// Type name.
    pub name: String,
}

/// Handle type definition.
#[derive(Debug, Clone)]
pub struct HandleDef {
    /// Type name.
    pub name: String,
    /// Canonical handle this name aliases.
    pub alias: Option<String>,
}

/// Struct type definition.
#[derive(Debug, Clone)]
pub struct StructDef {
    /// Struct name.
    pub name: String,
    /// Runtime type tag carried in the struct header (e.g. `VK_STRUCTURE_TYPE_*`).
    pub type_tag: Option<String>,
    /// Canonical struct this name aliases.
    pub alias: Option<String>,
    /// Structs whose extension chain may carry this struct.
    pub struct_extends: Vec<String>,
    /// Members in declared order.
    pub members: Vec<MemberDef>,
}

impl StructDef {
    /// Creates a new struct definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: None,
            alias: None,
            struct_extends: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Adds a member to the struct.
    pub fn add_member(&mut self, member: MemberDef) {
        self.members.push(member);
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn get_member(&self, name: &str) -> Option<&MemberDef> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// How many values a member holds and how they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Single value embedded in the owner.
    Scalar,
    /// Fixed-size array embedded in the owner.
    FixedArray(usize),
    /// Pointer to a run of values whose count lives in a sibling member.
    DynamicArray,
    /// Pointer to a single value.
    Pointer,
}

impl Cardinality {
    /// Returns true for fixed and dynamic arrays.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::FixedArray(_) | Self::DynamicArray)
    }

    /// Returns true for members stored behind a pointer.
    #[must_use]
    pub const fn is_indirect(&self) -> bool {
        matches!(self, Self::DynamicArray | Self::Pointer)
    }

    /// Returns the fixed element count, if any.
    #[must_use]
    pub const fn fixed_len(&self) -> Option<usize> {
        match self {
            Self::FixedArray(n) => Some(*n),
            _ => None,
        }
    }
}

/// Member of a struct or parameter of a command.
#[derive(Debug, Clone)]
pub struct MemberDef {
    /// Member name.
    pub name: String,
    /// Base type name (without pointer or array decoration).
    pub type_name: String,
    /// Cardinality.
    pub cardinality: Cardinality,
    /// Sibling member holding the element count of a dynamic array.
    pub length_field: Option<String>,
    /// Whether the pointee is const-qualified.
    pub is_const: bool,
    /// Whether this member is the head of the owner's extension chain.
    pub chain_head: bool,
    /// Sibling member whose value selects the concrete handle type.
    pub generic_discriminant: Option<String>,
}

impl MemberDef {
    /// Creates a new scalar member definition.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            cardinality: Cardinality::Scalar,
            length_field: None,
            is_const: false,
            chain_head: false,
            generic_discriminant: None,
        }
    }
}

/// Enum type definition.
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// Enum name.
    pub name: String,
    /// Storage width in bits (32 or 64).
    pub bit_width: u8,
    /// Canonical enum this name aliases.
    pub alias: Option<String>,
}

impl EnumDef {
    /// Creates a new 32-bit enum definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bit_width: 32,
            alias: None,
        }
    }
}

/// Command definition.
#[derive(Debug, Clone)]
pub struct CommandDef {
    /// Command name.
    pub name: String,
    /// Return type name.
    pub return_type: String,
    /// Parameters in declared order.
    pub params: Vec<MemberDef>,
}

impl CommandDef {
    /// Creates a new command definition returning `void`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: "void".to_string(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter to the command.
    pub fn add_param(&mut self, param: MemberDef) {
        self.params.push(param);
    }
}
