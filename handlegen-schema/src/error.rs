//! Error types for schema reading and model construction.

use thiserror::Error;

/// Error raised while reading a registry document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed registry XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A `<{element}>` lacks an attribute it cannot do without.
    #[error("<{element}> requires attribute '{attribute}'")]
    MissingAttribute {
        /// Registry element.
        element: String,
        /// Required attribute.
        attribute: String,
    },

    /// An attribute value cannot be interpreted.
    #[error("<{element}> attribute {attribute}=\"{value}\" is not recognized")]
    InvalidAttribute {
        /// Registry element.
        element: String,
        /// Offending attribute.
        attribute: String,
        /// Rejected value.
        value: String,
    },

    /// The same name is declared twice.
    #[error("{kind} '{name}' is declared more than once")]
    DuplicateDefinition {
        /// Kind of definition (type, command, member).
        kind: String,
        /// Declared name.
        name: String,
    },

    /// The document does not have the registry layout.
    #[error("unexpected registry layout: {message}")]
    InvalidStructure {
        /// What was wrong.
        message: String,
    },

    /// The registry file could not be read.
    #[error("failed to read registry: {0}")]
    Io(#[from] std::io::Error),

    /// Element or attribute text is not UTF-8.
    #[error("registry text is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for schema validation and model construction.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The registry could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A member, parameter or extension list references an undeclared type.
    #[error("unknown type '{type_name}' referenced by '{context}'")]
    UnknownType {
        /// Referenced type name.
        type_name: String,
        /// Referencing struct member, command parameter or attribute.
        context: String,
    },

    /// An alias names a type that does not exist.
    #[error("alias '{alias}' targets undeclared type '{target}'")]
    DanglingAlias {
        /// Alias name.
        alias: String,
        /// Missing target name.
        target: String,
    },

    /// A dynamic array does not name its length field.
    #[error("dynamic array '{structure}.{member}' has no length field")]
    MissingLengthField {
        /// Owning struct or command.
        structure: String,
        /// Member name.
        member: String,
    },

    /// A length field names a sibling that does not exist.
    #[error("length field '{field}' of '{structure}.{member}' is not a sibling member")]
    UnknownLengthField {
        /// Owning struct or command.
        structure: String,
        /// Member name.
        member: String,
        /// Missing length field.
        field: String,
    },

    /// A generic handle discriminant names a sibling that does not exist.
    #[error("discriminant '{discriminant}' of generic handle '{structure}.{member}' is not a sibling member")]
    UnknownDiscriminant {
        /// Owning struct.
        structure: String,
        /// Member name.
        member: String,
        /// Missing discriminant member.
        discriminant: String,
    },

    /// A handle-bearing extension struct has no runtime type tag.
    #[error("extension struct '{name}' has no type tag")]
    MissingTypeTag {
        /// Struct name.
        name: String,
    },

    /// Two structs share a runtime type tag.
    #[error("type tag '{tag}' is used by both '{first}' and '{second}'")]
    DuplicateTypeTag {
        /// Tag value.
        tag: String,
        /// First struct carrying the tag.
        first: String,
        /// Second struct carrying the tag.
        second: String,
    },

    /// Any other inconsistency found while validating.
    #[error("invalid registry: {message}")]
    Validation {
        /// What was wrong.
        message: String,
    },
}

impl ParseError {
    /// Shorthand for [`ParseError::MissingAttribute`].
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Shorthand for [`ParseError::InvalidAttribute`].
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Shorthand for [`ParseError::DuplicateDefinition`].
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateDefinition {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl SchemaError {
    /// Creates an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            context: context.into(),
        }
    }
}
