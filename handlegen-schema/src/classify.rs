//! Member classification.
//!
//! Maps a single struct member to the traversal kind that decides which
//! operations the synthesizer emits for it.

use crate::model::{MemberDescriptor, SchemaModel, StructDescriptor};
use crate::types::{Cardinality, TypeCategory};

/// Traversal kind of a struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// Single handle value.
    DirectHandle {
        /// Canonical handle type.
        handle_type: String,
    },
    /// Array of handles or pointer to handles.
    HandleCollection {
        /// Canonical handle type.
        handle_type: String,
    },
    /// Integer holding a handle whose type is selected by a sibling.
    GenericHandle {
        /// Sibling member naming the concrete handle type.
        discriminant: String,
    },
    /// Struct value, array or pointer that itself contains handles.
    NestedStruct {
        /// Canonical struct name.
        struct_name: String,
        /// Cardinality of the member.
        cardinality: Cardinality,
    },
    /// Head of the owner's polymorphic extension chain.
    ExtensionChainHead,
    /// Member without handles; excluded from every traversal.
    Plain,
}

impl MemberKind {
    /// Returns true for members excluded from traversal.
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

/// Classifies a member of `owner`.
///
/// Rules are checked in priority order and the first match wins: extension
/// chain head, generic handle binding, handle type, nested struct with
/// handles, otherwise plain.
#[must_use]
pub fn classify(
    member: &MemberDescriptor,
    owner: &StructDescriptor,
    model: &SchemaModel,
) -> MemberKind {
    if owner.is_chain_head(&member.name) {
        return MemberKind::ExtensionChainHead;
    }

    if let Some(discriminant) = owner.generic_discriminant(&member.name) {
        return MemberKind::GenericHandle {
            discriminant: discriminant.to_string(),
        };
    }

    match model.category_of(&member.base_type) {
        Some(TypeCategory::Handle) => {
            let handle_type = model.resolve_alias(&member.base_type).to_string();
            if member.cardinality == Cardinality::Scalar {
                MemberKind::DirectHandle { handle_type }
            } else {
                MemberKind::HandleCollection { handle_type }
            }
        }
        Some(TypeCategory::Struct) => match model.get_struct(&member.base_type) {
            Some(nested) if nested.contains_handles => MemberKind::NestedStruct {
                struct_name: nested.name.clone(),
                cardinality: member.cardinality,
            },
            _ => MemberKind::Plain,
        },
        _ => MemberKind::Plain,
    }
}

/// Returns the members of a struct that take part in handle traversal, in
/// declared order, paired with their kind.
#[must_use]
pub fn handle_members<'a>(
    owner: &'a StructDescriptor,
    model: &SchemaModel,
) -> Vec<(&'a MemberDescriptor, MemberKind)> {
    owner
        .members
        .iter()
        .map(|member| (member, classify(member, owner, model)))
        .filter(|(_, kind)| !kind.is_plain())
        .collect()
}
