//! Handle traversal synthesis.
//!
//! Derives the remap, registration and length propagation routines of a
//! struct from the classification of its members. Members are visited in
//! declared order, and the op order of every routine follows it.

mod lengths;
mod register;
mod remap;

use crate::error::CodegenError;
use crate::ops::{ElementCount, Op, Routine, RoutineKind, StructRoutines};
use handlegen_schema::{
    Cardinality, HandleTableBinding, SchemaModel, StructDescriptor, handle_members,
};

/// Synthesizer for per-struct traversal routines.
pub struct TraversalSynthesizer<'a> {
    model: &'a SchemaModel,
}

impl<'a> TraversalSynthesizer<'a> {
    /// Creates a new synthesizer over a model.
    #[must_use]
    pub fn new(model: &'a SchemaModel) -> Self {
        Self { model }
    }

    /// Synthesizes all three routines of a struct.
    ///
    /// # Errors
    /// Returns `CodegenError::Generation` if a handle member has no object
    /// table binding.
    pub fn synthesize(&self, owner: &StructDescriptor) -> Result<StructRoutines, CodegenError> {
        let routines = StructRoutines {
            struct_name: owner.name.clone(),
            map: self.routine(owner, RoutineKind::MapHandles)?,
            add: self.routine(owner, RoutineKind::AddHandles)?,
            set_lengths: self.routine(owner, RoutineKind::SetHandleLengths)?,
        };

        tracing::debug!(
            structure = %owner.name,
            map_ops = routines.map.ops.len(),
            add_ops = routines.add.ops.len(),
            length_ops = routines.set_lengths.ops.len(),
            "synthesized traversal routines"
        );

        Ok(routines)
    }

    /// Synthesizes one routine of a struct.
    ///
    /// # Errors
    /// Returns `CodegenError::Generation` if a handle member has no object
    /// table binding.
    pub fn routine(
        &self,
        owner: &StructDescriptor,
        kind: RoutineKind,
    ) -> Result<Routine, CodegenError> {
        let members = handle_members(owner, self.model);
        let mut ops = Vec::new();

        for (member, member_kind) in &members {
            match kind {
                RoutineKind::MapHandles => {
                    ops.extend(remap::member_op(member, member_kind, self.model)?);
                }
                RoutineKind::AddHandles => {
                    ops.extend(register::member_ops(member, member_kind, self.model)?);
                }
                RoutineKind::SetHandleLengths => {
                    ops.extend(lengths::member_op(member, member_kind));
                }
            }
        }

        if kind == RoutineKind::SetHandleLengths {
            let guard = lengths::guard(&members);
            return Ok(Routine::with_guard(kind, owner.name.clone(), guard, ops));
        }
        Ok(Routine::new(kind, owner.name.clone(), ops))
    }
}

/// Returns the decoded element count for a member's cardinality.
fn element_count(cardinality: Cardinality) -> ElementCount {
    match cardinality {
        Cardinality::FixedArray(n) => ElementCount::Fixed(n),
        Cardinality::DynamicArray => ElementCount::Decoded,
        Cardinality::Pointer | Cardinality::Scalar => ElementCount::Single,
    }
}

fn binding_for(model: &SchemaModel, handle_type: &str) -> Result<HandleTableBinding, CodegenError> {
    model.handle_table_binding(handle_type).ok_or_else(|| {
        CodegenError::generation(format!("no object table binding for '{handle_type}'"))
    })
}

/// Collects every op of a routine that visits the given member.
#[must_use]
pub fn ops_for_member<'r>(routine: &'r Routine, member: &str) -> Vec<&'r Op> {
    routine.ops.iter().filter(|op| op.member() == member).collect()
}
