//! Operation IR produced by synthesis and consumed by emitters.
//!
//! A [`Routine`] is an ordered list of [`Op`]s for one struct. Ops refer to
//! nested routines by struct name; they never inline them.

use handlegen_schema::HandleTableBinding;

/// The three traversal routines derived for every handle-bearing struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoutineKind {
    /// Rewrites captured identifiers into live identifiers.
    MapHandles,
    /// Registers newly created identifiers under a parent id.
    AddHandles,
    /// Propagates array lengths into decoded handle storage.
    SetHandleLengths,
}

impl RoutineKind {
    /// All routine kinds in emission order.
    pub const ALL: [Self; 3] = [Self::MapHandles, Self::AddHandles, Self::SetHandleLengths];

    /// Returns the per-struct routine name.
    #[must_use]
    pub const fn routine_name(self) -> &'static str {
        match self {
            Self::MapHandles => "MapStructHandles",
            Self::AddHandles => "AddStructHandles",
            Self::SetHandleLengths => "SetStructHandleLengths",
        }
    }

    /// Returns the extension chain dispatch routine name for a chain id.
    #[must_use]
    pub fn dispatch_name(self, chain_id: &str) -> String {
        match self {
            Self::MapHandles => format!("Map{chain_id}StructHandles"),
            Self::AddHandles => format!("Add{chain_id}StructHandles"),
            Self::SetHandleLengths => format!("Set{chain_id}StructHandleLengths"),
        }
    }
}

/// Entry check of a routine body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The wrapper must be present.
    Wrapper,
    /// The wrapper and its decoded value must both be present.
    WrapperAndValue,
}

impl Guard {
    /// Derives the guard from the body: the decoded value is checked iff
    /// some op reads or writes it.
    #[must_use]
    pub fn for_ops(ops: &[Op]) -> Self {
        if ops.iter().any(Op::touches_value) {
            Self::WrapperAndValue
        } else {
            Self::Wrapper
        }
    }
}

/// Number of elements visited on the decoded side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCount {
    /// Statically sized array.
    Fixed(usize),
    /// Length carried by the decoded record.
    Decoded,
    /// Exactly one element behind a pointer.
    Single,
}

impl ElementCount {
    /// Returns the count when it is known without reading any record.
    #[must_use]
    pub const fn static_len(self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(n),
            Self::Single => Some(1),
            Self::Decoded => None,
        }
    }
}

/// Number of elements available on the live side during registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveCount {
    /// Statically sized array.
    Fixed(usize),
    /// Read from a sibling field of the live struct.
    Field(String),
    /// Exactly one element behind a pointer.
    Single,
}

impl LiveCount {
    /// Returns the count when it is known without reading any struct.
    #[must_use]
    pub const fn static_len(&self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(*n),
            Self::Single => Some(1),
            Self::Field(_) => None,
        }
    }
}

/// What a [`Op::CheckCount`] compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedElements {
    /// Decoded handle storage.
    Handles,
    /// Decoded nested struct records.
    Structs,
}

/// A single traversal step over one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Looks up one captured handle and stores the live value.
    MapHandle {
        /// Member name.
        member: String,
        /// Object table accessors.
        binding: HandleTableBinding,
    },
    /// Looks up a collection of captured handles.
    MapHandles {
        /// Member name.
        member: String,
        /// Object table accessors.
        binding: HandleTableBinding,
        /// Elements visited.
        count: ElementCount,
        /// Whether the decoded value is repointed at the mapped storage.
        rebind: bool,
    },
    /// Looks up a handle whose type is read from a sibling.
    MapGenericHandle {
        /// Member name.
        member: String,
        /// Sibling naming the handle type.
        discriminant: String,
    },
    /// Recurses into a nested struct value.
    MapStruct {
        /// Member name.
        member: String,
        /// Nested struct.
        struct_name: String,
    },
    /// Recurses into each element of a nested struct array or pointer.
    MapStructs {
        /// Member name.
        member: String,
        /// Nested struct.
        struct_name: String,
        /// Elements visited.
        count: ElementCount,
    },
    /// Walks the extension chain through the map dispatch routine.
    MapChain {
        /// Member name.
        member: String,
    },
    /// Fails the routine when decoded and live counts differ.
    CheckCount {
        /// Member name.
        member: String,
        /// Decoded element count.
        decoded: ElementCount,
        /// Live element count.
        live: LiveCount,
        /// Kind of decoded storage being counted.
        elements: CountedElements,
    },
    /// Registers one created handle.
    AddHandle {
        /// Member name.
        member: String,
        /// Object table accessors.
        binding: HandleTableBinding,
    },
    /// Registers a collection of created handles.
    AddHandles {
        /// Member name.
        member: String,
        /// Object table accessors.
        binding: HandleTableBinding,
        /// Decoded element count.
        decoded: ElementCount,
        /// Live element count.
        live: LiveCount,
    },
    /// Registers a created handle whose type is read from a sibling.
    AddGenericHandle {
        /// Member name.
        member: String,
        /// Sibling naming the handle type.
        discriminant: String,
    },
    /// Recurses registration into a nested struct value.
    AddStruct {
        /// Member name.
        member: String,
        /// Nested struct.
        struct_name: String,
    },
    /// Recurses registration into each element of a nested struct array.
    AddStructs {
        /// Member name.
        member: String,
        /// Nested struct.
        struct_name: String,
        /// Decoded element count.
        decoded: ElementCount,
        /// Live element count.
        live: LiveCount,
    },
    /// Walks the extension chain through the add dispatch routine.
    AddChain {
        /// Member name.
        member: String,
    },
    /// Sizes decoded handle storage.
    SetHandleLength {
        /// Member name.
        member: String,
        /// Length to apply.
        length: ElementCount,
        /// Whether the decoded value is repointed at the sized storage.
        rebind: bool,
    },
    /// Recurses length propagation into a nested struct value.
    SetStructLengths {
        /// Member name.
        member: String,
        /// Nested struct.
        struct_name: String,
    },
    /// Recurses length propagation into each element of a nested array.
    SetStructArrayLengths {
        /// Member name.
        member: String,
        /// Nested struct.
        struct_name: String,
        /// Elements visited.
        count: ElementCount,
    },
    /// Walks the extension chain through the set-lengths dispatch routine.
    SetChainLengths {
        /// Member name.
        member: String,
    },
}

impl Op {
    /// Returns the member this op visits.
    #[must_use]
    pub fn member(&self) -> &str {
        match self {
            Self::MapHandle { member, .. }
            | Self::MapHandles { member, .. }
            | Self::MapGenericHandle { member, .. }
            | Self::MapStruct { member, .. }
            | Self::MapStructs { member, .. }
            | Self::MapChain { member }
            | Self::CheckCount { member, .. }
            | Self::AddHandle { member, .. }
            | Self::AddHandles { member, .. }
            | Self::AddGenericHandle { member, .. }
            | Self::AddStruct { member, .. }
            | Self::AddStructs { member, .. }
            | Self::AddChain { member }
            | Self::SetHandleLength { member, .. }
            | Self::SetStructLengths { member, .. }
            | Self::SetStructArrayLengths { member, .. }
            | Self::SetChainLengths { member } => member,
        }
    }

    /// Returns true if the op reads or writes the decoded value.
    ///
    /// Fixed arrays are mapped in place inside the wrapper and never touch it.
    #[must_use]
    pub fn touches_value(&self) -> bool {
        match self {
            Self::MapHandle { .. } | Self::MapGenericHandle { .. } => true,
            Self::MapHandles { rebind, .. } | Self::SetHandleLength { rebind, .. } => *rebind,
            _ => false,
        }
    }

    /// Returns the nested struct whose routine this op calls, if any.
    #[must_use]
    pub fn nested_struct(&self) -> Option<&str> {
        match self {
            Self::MapStruct { struct_name, .. }
            | Self::MapStructs { struct_name, .. }
            | Self::AddStruct { struct_name, .. }
            | Self::AddStructs { struct_name, .. }
            | Self::SetStructLengths { struct_name, .. }
            | Self::SetStructArrayLengths { struct_name, .. } => Some(struct_name),
            _ => None,
        }
    }
}

/// One synthesized routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    /// Routine kind.
    pub kind: RoutineKind,
    /// Struct the routine traverses.
    pub struct_name: String,
    /// Entry check.
    pub guard: Guard,
    /// Body in declared member order.
    pub ops: Vec<Op>,
}

impl Routine {
    /// Creates a routine, deriving its guard from the body.
    #[must_use]
    pub fn new(kind: RoutineKind, struct_name: impl Into<String>, ops: Vec<Op>) -> Self {
        let guard = match kind {
            RoutineKind::AddHandles => Guard::Wrapper,
            RoutineKind::MapHandles | RoutineKind::SetHandleLengths => Guard::for_ops(&ops),
        };
        Self {
            kind,
            struct_name: struct_name.into(),
            guard,
            ops,
        }
    }

    /// Creates a routine with a guard decided by the caller.
    #[must_use]
    pub fn with_guard(
        kind: RoutineKind,
        struct_name: impl Into<String>,
        guard: Guard,
        ops: Vec<Op>,
    ) -> Self {
        Self {
            kind,
            struct_name: struct_name.into(),
            guard,
            ops,
        }
    }

    /// Returns true if the body may fail on a count mismatch.
    #[must_use]
    pub fn can_fail(&self) -> bool {
        self.kind == RoutineKind::AddHandles
    }
}

/// The three routines of one struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructRoutines {
    /// Struct name.
    pub struct_name: String,
    /// Remap routine.
    pub map: Routine,
    /// Registration routine.
    pub add: Routine,
    /// Length propagation routine.
    pub set_lengths: Routine,
}

impl StructRoutines {
    /// Returns the routine of the given kind.
    #[must_use]
    pub fn routine(&self, kind: RoutineKind) -> &Routine {
        match kind {
            RoutineKind::MapHandles => &self.map,
            RoutineKind::AddHandles => &self.add,
            RoutineKind::SetHandleLengths => &self.set_lengths,
        }
    }
}
