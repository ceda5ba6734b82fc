//! Registration routine synthesis.
//!
//! Collections get a count check in front of them unless both the decoded
//! and the live count are the same compile-time constant.

use super::{binding_for, element_count};
use crate::error::CodegenError;
use crate::ops::{CountedElements, ElementCount, LiveCount, Op};
use handlegen_schema::{Cardinality, MemberDescriptor, MemberKind, SchemaModel};

/// Returns the registration ops for one classified member.
pub(super) fn member_ops(
    member: &MemberDescriptor,
    kind: &MemberKind,
    model: &SchemaModel,
) -> Result<Vec<Op>, CodegenError> {
    let name = member.name.clone();
    let mut ops = Vec::new();

    match kind {
        MemberKind::DirectHandle { handle_type } => ops.push(Op::AddHandle {
            member: name,
            binding: binding_for(model, handle_type)?,
        }),
        MemberKind::HandleCollection { handle_type } => {
            let decoded = element_count(member.cardinality);
            let live = live_count(member);
            push_count_check(&mut ops, &name, decoded, &live, CountedElements::Handles);
            ops.push(Op::AddHandles {
                member: name,
                binding: binding_for(model, handle_type)?,
                decoded,
                live,
            });
        }
        MemberKind::GenericHandle { discriminant } => ops.push(Op::AddGenericHandle {
            member: name,
            discriminant: discriminant.clone(),
        }),
        MemberKind::NestedStruct {
            struct_name,
            cardinality: Cardinality::Scalar,
        } => ops.push(Op::AddStruct {
            member: name,
            struct_name: struct_name.clone(),
        }),
        MemberKind::NestedStruct {
            struct_name,
            cardinality,
        } => {
            let decoded = element_count(*cardinality);
            let live = live_count(member);
            push_count_check(&mut ops, &name, decoded, &live, CountedElements::Structs);
            ops.push(Op::AddStructs {
                member: name,
                struct_name: struct_name.clone(),
                decoded,
                live,
            });
        }
        MemberKind::ExtensionChainHead => ops.push(Op::AddChain { member: name }),
        MemberKind::Plain => {}
    }

    Ok(ops)
}

/// Returns the element count of the live side of a collection.
fn live_count(member: &MemberDescriptor) -> LiveCount {
    match (&member.cardinality, &member.length_field) {
        (Cardinality::FixedArray(n), _) => LiveCount::Fixed(*n),
        (_, Some(field)) => LiveCount::Field(field.clone()),
        _ => LiveCount::Single,
    }
}

fn push_count_check(
    ops: &mut Vec<Op>,
    member: &str,
    decoded: ElementCount,
    live: &LiveCount,
    elements: CountedElements,
) {
    let statically_equal = matches!(
        (decoded.static_len(), live.static_len()),
        (Some(a), Some(b)) if a == b
    );
    if !statically_equal {
        ops.push(Op::CheckCount {
            member: member.to_string(),
            decoded,
            live: live.clone(),
            elements,
        });
    }
}
