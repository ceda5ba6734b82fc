//! Length propagation routine synthesis.

use super::element_count;
use crate::ops::{Guard, Op};
use handlegen_schema::{Cardinality, MemberDescriptor, MemberKind};

/// Returns the guard of the length routine. The decoded value is checked
/// whenever a handle member is not a fixed array, even a single handle
/// that carries no length op.
pub(super) fn guard(members: &[(&MemberDescriptor, MemberKind)]) -> Guard {
    let needs_value = members.iter().any(|(member, kind)| match kind {
        MemberKind::DirectHandle { .. } => true,
        MemberKind::HandleCollection { .. } => {
            !matches!(member.cardinality, Cardinality::FixedArray(_))
        }
        _ => false,
    });
    if needs_value {
        Guard::WrapperAndValue
    } else {
        Guard::Wrapper
    }
}

/// Returns the length op for one classified member. Single handles and
/// generic handles carry no length.
pub(super) fn member_op(member: &MemberDescriptor, kind: &MemberKind) -> Option<Op> {
    let name = member.name.clone();

    match kind {
        MemberKind::HandleCollection { .. } => Some(Op::SetHandleLength {
            member: name,
            length: element_count(member.cardinality),
            rebind: !matches!(member.cardinality, Cardinality::FixedArray(_)),
        }),
        MemberKind::NestedStruct {
            struct_name,
            cardinality: Cardinality::Scalar,
        } => Some(Op::SetStructLengths {
            member: name,
            struct_name: struct_name.clone(),
        }),
        MemberKind::NestedStruct {
            struct_name,
            cardinality,
        } => Some(Op::SetStructArrayLengths {
            member: name,
            struct_name: struct_name.clone(),
            count: element_count(*cardinality),
        }),
        MemberKind::ExtensionChainHead => Some(Op::SetChainLengths { member: name }),
        MemberKind::DirectHandle { .. } | MemberKind::GenericHandle { .. } | MemberKind::Plain => {
            None
        }
    }
}
