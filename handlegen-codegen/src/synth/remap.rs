//! Remap routine synthesis.

use super::{binding_for, element_count};
use crate::error::CodegenError;
use crate::ops::Op;
use handlegen_schema::{Cardinality, MemberDescriptor, MemberKind, SchemaModel};

/// Returns the remap op for one classified member.
pub(super) fn member_op(
    member: &MemberDescriptor,
    kind: &MemberKind,
    model: &SchemaModel,
) -> Result<Option<Op>, CodegenError> {
    let name = member.name.clone();

    let op = match kind {
        MemberKind::DirectHandle { handle_type } => Op::MapHandle {
            member: name,
            binding: binding_for(model, handle_type)?,
        },
        MemberKind::HandleCollection { handle_type } => Op::MapHandles {
            member: name,
            binding: binding_for(model, handle_type)?,
            count: element_count(member.cardinality),
            rebind: !matches!(member.cardinality, Cardinality::FixedArray(_)),
        },
        MemberKind::GenericHandle { discriminant } => Op::MapGenericHandle {
            member: name,
            discriminant: discriminant.clone(),
        },
        MemberKind::NestedStruct {
            struct_name,
            cardinality: Cardinality::Scalar,
        } => Op::MapStruct {
            member: name,
            struct_name: struct_name.clone(),
        },
        MemberKind::NestedStruct {
            struct_name,
            cardinality,
        } => Op::MapStructs {
            member: name,
            struct_name: struct_name.clone(),
            count: element_count(*cardinality),
        },
        MemberKind::ExtensionChainHead => Op::MapChain { member: name },
        MemberKind::Plain => return Ok(None),
    };

    Ok(Some(op))
}
