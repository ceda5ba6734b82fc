//! Schema validation utilities.
//!
//! These checks cover only what code generation relies on: length and
//! discriminant siblings must exist, dynamic arrays must name their length,
//! and runtime type tags must be unique.

use crate::error::SchemaError;
use crate::types::{Cardinality, MemberDef, Schema};
use std::collections::{HashMap, HashSet};

/// Validates a parsed schema for correctness.
///
/// # Arguments
/// * `schema` - The schema to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the issue.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    validate_structs(schema)?;
    validate_type_tags(schema)?;
    validate_commands(schema)?;
    Ok(())
}

/// Validates the members of every struct.
fn validate_structs(schema: &Schema) -> Result<(), SchemaError> {
    for struct_def in schema.structs() {
        validate_members(&struct_def.name, &struct_def.members)?;

        for member in &struct_def.members {
            if let Some(discriminant) = &member.generic_discriminant {
                if struct_def.get_member(discriminant).is_none() {
                    return Err(SchemaError::UnknownDiscriminant {
                        structure: struct_def.name.clone(),
                        member: member.name.clone(),
                        discriminant: discriminant.clone(),
                    });
                }
            }
        }

        let chain_heads = struct_def.members.iter().filter(|m| m.chain_head).count();
        if chain_heads > 1 {
            return Err(SchemaError::Validation {
                message: format!(
                    "struct '{}' declares {} extension chain heads",
                    struct_def.name, chain_heads
                ),
            });
        }
    }
    Ok(())
}

/// Validates a member list shared by structs and commands.
fn validate_members(owner: &str, members: &[MemberDef]) -> Result<(), SchemaError> {
    let mut seen_names = HashSet::new();

    for member in members {
        if !seen_names.insert(member.name.as_str()) {
            return Err(SchemaError::Validation {
                message: format!("Duplicate member name '{}' in '{}'", member.name, owner),
            });
        }

        match member.cardinality {
            Cardinality::FixedArray(0) => {
                return Err(SchemaError::Validation {
                    message: format!("Zero-length array '{}.{}'", owner, member.name),
                });
            }
            Cardinality::DynamicArray if member.length_field.is_none() => {
                return Err(SchemaError::MissingLengthField {
                    structure: owner.to_string(),
                    member: member.name.clone(),
                });
            }
            _ => {}
        }

        if let Some(field) = &member.length_field {
            // Length expressions such as `codeSize / 4` name their sibling first.
            let sibling = field.split_whitespace().next().unwrap_or(field);
            if !members.iter().any(|m| m.name == sibling) {
                return Err(SchemaError::UnknownLengthField {
                    structure: owner.to_string(),
                    member: member.name.clone(),
                    field: field.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Validates that runtime type tags identify a single canonical struct.
fn validate_type_tags(schema: &Schema) -> Result<(), SchemaError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for struct_def in schema.structs().filter(|s| s.alias.is_none()) {
        if let Some(tag) = &struct_def.type_tag {
            if let Some(first) = seen.insert(tag, &struct_def.name) {
                return Err(SchemaError::DuplicateTypeTag {
                    tag: tag.clone(),
                    first: first.to_string(),
                    second: struct_def.name.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Validates command parameter lists.
fn validate_commands(schema: &Schema) -> Result<(), SchemaError> {
    for command in &schema.commands {
        validate_members(&command.name, &command.params)?;
    }
    Ok(())
}
