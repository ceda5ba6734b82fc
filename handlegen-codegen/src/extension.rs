//! Extension chain dispatch synthesis.
//!
//! A chain is a singly linked list of structs whose runtime tag selects the
//! routine to run for each node. One dispatch table is derived per routine
//! kind, shared by every base struct: its cases are the union of all
//! extension registries.

use crate::config::GeneratorConfig;
use crate::diagnostic::Diagnostic;
use crate::ops::RoutineKind;
use handlegen_schema::SchemaModel;

/// One arm of a dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchArm {
    /// Runs the routine of `struct_name` on nodes tagged `tag`.
    Case {
        /// Runtime type tag.
        tag: String,
        /// Canonical struct name.
        struct_name: String,
    },
    /// Unrecognized tags: nothing to do, the walk advances.
    Default,
}

static DEFAULT_ARM: DispatchArm = DispatchArm::Default;

/// Dispatch routine walking an extension chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDispatch {
    /// Routine run on each recognized node.
    pub kind: RoutineKind,
    /// Dispatch routine name.
    pub name: String,
    /// Header field holding the node's tag.
    pub tag_field: String,
    /// Header field linking to the next node.
    pub next_field: String,
    /// Cases sorted by struct name, then the default arm.
    pub arms: Vec<DispatchArm>,
}

impl ChainDispatch {
    /// Selects the arm for a runtime tag.
    #[must_use]
    pub fn select(&self, tag: &str) -> &DispatchArm {
        self.arms
            .iter()
            .find(|arm| matches!(arm, DispatchArm::Case { tag: t, .. } if t == tag))
            .unwrap_or(&DEFAULT_ARM)
    }

    /// Iterates over the cases as `(tag, struct)`.
    pub fn cases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.arms.iter().filter_map(|arm| match arm {
            DispatchArm::Case { tag, struct_name } => Some((tag.as_str(), struct_name.as_str())),
            DispatchArm::Default => None,
        })
    }
}

/// Output of chain synthesis.
#[derive(Debug, Clone, Default)]
pub struct ChainPlan {
    /// Map, add and set-lengths dispatch routines, in that order.
    pub dispatches: Vec<ChainDispatch>,
    /// Extension candidates left out of the tables.
    pub diagnostics: Vec<Diagnostic>,
}

/// Synthesizer for extension chain dispatch tables.
pub struct ExtensionChainSynthesizer<'a> {
    model: &'a SchemaModel,
    config: &'a GeneratorConfig,
}

impl<'a> ExtensionChainSynthesizer<'a> {
    /// Creates a new chain synthesizer.
    #[must_use]
    pub fn new(model: &'a SchemaModel, config: &'a GeneratorConfig) -> Self {
        Self { model, config }
    }

    /// Builds the three dispatch routines and reports extension candidates
    /// that contain no handles.
    ///
    /// No dispatch is produced when no handle-bearing struct has a chain.
    #[must_use]
    pub fn synthesize(&self) -> ChainPlan {
        let (arms, diagnostics) = self.arms();

        for diagnostic in &diagnostics {
            tracing::warn!("{}", diagnostic);
        }

        let has_chains = self
            .model
            .handle_structs()
            .filter(|s| !self.config.denylist.is_struct_denied(&s.name))
            .any(|s| !s.chain_heads.is_empty());
        if !has_chains {
            return ChainPlan {
                dispatches: Vec::new(),
                diagnostics,
            };
        }

        let dispatches = RoutineKind::ALL
            .into_iter()
            .map(|kind| ChainDispatch {
                kind,
                name: kind.dispatch_name(&self.config.chain_id),
                tag_field: self.config.struct_type_field.clone(),
                next_field: self.config.chain_next_field.clone(),
                arms: arms.clone(),
            })
            .collect();

        tracing::debug!(
            chain = %self.config.chain_id,
            cases = arms.len() - 1,
            "synthesized extension chain dispatch"
        );

        ChainPlan {
            dispatches,
            diagnostics,
        }
    }

    fn arms(&self) -> (Vec<DispatchArm>, Vec<Diagnostic>) {
        let mut arms = Vec::new();
        let mut diagnostics = Vec::new();

        // Registries hold canonical structs only, sorted by name.
        for entry in self.model.extended_structs() {
            if self.config.denylist.is_struct_denied(&entry.struct_name) {
                continue;
            }
            // The model guarantees a tag on every handle-bearing extension.
            if let (true, Some(tag)) = (entry.contains_handles, &entry.type_tag) {
                arms.push(DispatchArm::Case {
                    tag: tag.clone(),
                    struct_name: entry.struct_name.clone(),
                });
            } else {
                diagnostics.push(Diagnostic::ExtensionWithoutHandles {
                    extension: entry.struct_name.clone(),
                    bases: self
                        .model
                        .extension_bases(&entry.struct_name)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                });
            }
        }

        arms.push(DispatchArm::Default);
        (arms, diagnostics)
    }
}
