//! In-memory execution of synthesized routines.
//!
//! Decoded records are modelled as [`Record`] trees and the object table as
//! a map from `(handle type, captured id)` to the registered live value. The
//! interpreter runs a [`GenerationPlan`] the way the rendered code would.

use crate::extension::{ChainDispatch, DispatchArm};
use crate::generator::GenerationPlan;
use crate::ops::{CountedElements, ElementCount, Guard, LiveCount, Op, Routine, RoutineKind};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Decoded record of one struct value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub struct_name: String,
    pub type_tag: Option<String>,
    /// Whether the decoded value behind the wrapper exists.
    pub has_value: bool,
    /// Captured handle ids per member.
    pub captured: BTreeMap<String, Vec<u64>>,
    /// Live handle values per member.
    pub live: BTreeMap<String, Vec<u64>>,
    /// Integer siblings used as live lengths.
    pub counts: BTreeMap<String, usize>,
    /// Discriminant siblings, holding a handle type name.
    pub kinds: BTreeMap<String, String>,
    /// Nested records, chain nodes included.
    pub nested: BTreeMap<String, Vec<Record>>,
    /// Lengths applied to decoded handle storage.
    pub lengths: BTreeMap<String, usize>,
    /// Members whose decoded value was repointed at wrapper storage.
    pub rebound: BTreeSet<String>,
}

impl Record {
    pub fn new(struct_name: &str) -> Self {
        Self {
            struct_name: struct_name.to_string(),
            type_tag: None,
            has_value: true,
            captured: BTreeMap::new(),
            live: BTreeMap::new(),
            counts: BTreeMap::new(),
            kinds: BTreeMap::new(),
            nested: BTreeMap::new(),
            lengths: BTreeMap::new(),
            rebound: BTreeSet::new(),
        }
    }

    pub fn tagged(mut self, tag: &str) -> Self {
        self.type_tag = Some(tag.to_string());
        self
    }

    pub fn without_value(mut self) -> Self {
        self.has_value = false;
        self
    }

    pub fn handles(mut self, member: &str, ids: &[u64]) -> Self {
        self.captured.insert(member.to_string(), ids.to_vec());
        self
    }

    pub fn created(mut self, member: &str, values: &[u64]) -> Self {
        self.live.insert(member.to_string(), values.to_vec());
        self
    }

    pub fn count(mut self, member: &str, n: usize) -> Self {
        self.counts.insert(member.to_string(), n);
        self
    }

    pub fn kind(mut self, member: &str, handle_type: &str) -> Self {
        self.kinds.insert(member.to_string(), handle_type.to_string());
        self
    }

    pub fn nested(mut self, member: &str, records: Vec<Record>) -> Self {
        self.nested.insert(member.to_string(), records);
        self
    }

    /// Drops every live value in the tree.
    pub fn clear_live(&mut self) {
        self.live.clear();
        for records in self.nested.values_mut() {
            for record in records {
                record.clear_live();
            }
        }
    }

    /// Collects every live value in the tree.
    pub fn all_live(&self) -> BTreeSet<u64> {
        let mut values: BTreeSet<u64> = self.live.values().flatten().copied().collect();
        for records in self.nested.values() {
            for record in records {
                values.extend(record.all_live());
            }
        }
        values
    }
}

/// One registration performed against the object table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub parent_id: u64,
    pub handle_type: String,
    pub captured: u64,
    pub live: u64,
}

/// Object table keyed by handle type and captured id.
#[derive(Debug, Default)]
pub struct ObjectTable {
    entries: HashMap<(String, u64), u64>,
    pub log: Vec<Registration>,
}

impl ObjectTable {
    pub fn insert(&mut self, handle_type: &str, captured: u64, live: u64) {
        self.entries.insert((handle_type.to_string(), captured), live);
    }

    fn add(&mut self, parent_id: u64, handle_type: &str, captured: u64, live: u64) {
        self.insert(handle_type, captured, live);
        self.log.push(Registration {
            parent_id,
            handle_type: handle_type.to_string(),
            captured,
            live,
        });
    }

    /// Unknown ids map to the null handle.
    fn lookup(&self, handle_type: &str, captured: u64) -> u64 {
        self.entries
            .get(&(handle_type.to_string(), captured))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    CountMismatch {
        member: String,
        decoded: usize,
        live: usize,
    },
    MissingRoutine(RoutineKind, String),
    MissingDispatch(RoutineKind),
}

/// Walk state over the nodes of an extension chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    HasNode(usize),
    AtEnd,
}

impl ChainState {
    fn start(len: usize) -> Self {
        if len == 0 { Self::AtEnd } else { Self::HasNode(0) }
    }

    fn advance(self, len: usize) -> Self {
        match self {
            Self::HasNode(index) if index + 1 < len => Self::HasNode(index + 1),
            Self::HasNode(_) | Self::AtEnd => Self::AtEnd,
        }
    }
}

/// Executes the routines of a plan.
pub struct Interpreter<'p> {
    routines: HashMap<(RoutineKind, String), &'p Routine>,
    dispatches: HashMap<RoutineKind, &'p ChainDispatch>,
    /// Structs whose routine body ran, in order.
    pub executed: Vec<(RoutineKind, String)>,
    /// Chain nodes handled by a dispatch case.
    pub dispatched: Vec<(RoutineKind, String)>,
    /// Chain nodes that fell to the default arm, by tag.
    pub defaulted: Vec<(RoutineKind, String)>,
}

impl<'p> Interpreter<'p> {
    pub fn new(plan: &'p GenerationPlan) -> Self {
        let mut routines = HashMap::new();
        for set in &plan.structs {
            for kind in RoutineKind::ALL {
                routines.insert((kind, set.struct_name.clone()), set.routine(kind));
            }
        }
        let dispatches = plan.dispatches.iter().map(|d| (d.kind, d)).collect();

        Self {
            routines,
            dispatches,
            executed: Vec::new(),
            dispatched: Vec::new(),
            defaulted: Vec::new(),
        }
    }

    fn routine(&self, kind: RoutineKind, name: &str) -> Result<&'p Routine, SimError> {
        self.routines
            .get(&(kind, name.to_string()))
            .copied()
            .ok_or_else(|| SimError::MissingRoutine(kind, name.to_string()))
    }

    /// Returns the struct handling a node, or None for the default arm.
    fn arm_for(&self, kind: RoutineKind, tag: Option<&str>) -> Result<Option<&'p str>, SimError> {
        let dispatch: &'p ChainDispatch = self
            .dispatches
            .get(&kind)
            .copied()
            .ok_or(SimError::MissingDispatch(kind))?;
        match dispatch.select(tag.unwrap_or_default()) {
            DispatchArm::Case { struct_name, .. } => Ok(Some(struct_name.as_str())),
            DispatchArm::Default => Ok(None),
        }
    }

    fn enter(&mut self, routine: &Routine, record: &Record) -> bool {
        if routine.guard == Guard::WrapperAndValue && !record.has_value {
            return false;
        }
        self.executed
            .push((routine.kind, routine.struct_name.clone()));
        true
    }

    fn note_node(&mut self, kind: RoutineKind, handled_by: Option<&str>, node: &Record) {
        match handled_by {
            Some(name) => self.dispatched.push((kind, name.to_string())),
            None => self
                .defaulted
                .push((kind, node.type_tag.clone().unwrap_or_default())),
        }
    }

    /// Runs the remap routine of the record's struct.
    pub fn map(&mut self, record: &mut Record, table: &ObjectTable) -> Result<(), SimError> {
        let name = record.struct_name.clone();
        self.run_map(&name, record, table)
    }

    fn run_map(
        &mut self,
        name: &str,
        record: &mut Record,
        table: &ObjectTable,
    ) -> Result<(), SimError> {
        let routine = self.routine(RoutineKind::MapHandles, name)?;
        if !self.enter(routine, record) {
            return Ok(());
        }

        for op in &routine.ops {
            match op {
                Op::MapHandle { member, binding } => {
                    let mapped = map_ids(record, member, &binding.handle_type, None, table);
                    record.live.insert(member.clone(), mapped);
                }
                Op::MapHandles {
                    member,
                    binding,
                    count,
                    rebind,
                } => {
                    let n = decoded_len(*count, captured_len(record, member));
                    let mapped = map_ids(record, member, &binding.handle_type, Some(n), table);
                    record.live.insert(member.clone(), mapped);
                    if *rebind {
                        record.rebound.insert(member.clone());
                    }
                }
                Op::MapGenericHandle {
                    member,
                    discriminant,
                } => {
                    let handle_type = record.kinds.get(discriminant).cloned().unwrap_or_default();
                    let mapped = map_ids(record, member, &handle_type, None, table);
                    record.live.insert(member.clone(), mapped);
                }
                Op::MapStruct {
                    member,
                    struct_name,
                } => {
                    if let Some(children) = record.nested.get_mut(member) {
                        for child in children.iter_mut().take(1) {
                            self.run_map(struct_name, child, table)?;
                        }
                    }
                }
                Op::MapStructs {
                    member,
                    struct_name,
                    count,
                } => {
                    if let Some(children) = record.nested.get_mut(member) {
                        let n = decoded_len(*count, children.len());
                        for child in children.iter_mut().take(n) {
                            self.run_map(struct_name, child, table)?;
                        }
                    }
                }
                Op::MapChain { member } => {
                    if let Some(nodes) = record.nested.get_mut(member) {
                        let mut state = ChainState::start(nodes.len());
                        while let ChainState::HasNode(index) = state {
                            let node = &mut nodes[index];
                            let arm = self.arm_for(RoutineKind::MapHandles, node.type_tag.as_deref())?;
                            self.note_node(RoutineKind::MapHandles, arm, node);
                            if let Some(struct_name) = arm {
                                self.run_map(struct_name, node, table)?;
                            }
                            state = state.advance(nodes.len());
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Runs the registration routine of the record's struct.
    pub fn add(
        &mut self,
        parent_id: u64,
        record: &Record,
        table: &mut ObjectTable,
    ) -> Result<(), SimError> {
        self.run_add(&record.struct_name, parent_id, record, table)
    }

    fn run_add(
        &mut self,
        name: &str,
        parent_id: u64,
        record: &Record,
        table: &mut ObjectTable,
    ) -> Result<(), SimError> {
        let routine = self.routine(RoutineKind::AddHandles, name)?;
        if !self.enter(routine, record) {
            return Ok(());
        }

        for op in &routine.ops {
            match op {
                Op::CheckCount {
                    member,
                    decoded,
                    live,
                    elements,
                } => {
                    let available = match elements {
                        CountedElements::Handles => captured_len(record, member),
                        CountedElements::Structs => record.nested.get(member).map_or(0, Vec::len),
                    };
                    let decoded = decoded_len(*decoded, available);
                    let live = live_len(live, record);
                    if decoded != live {
                        return Err(SimError::CountMismatch {
                            member: member.clone(),
                            decoded,
                            live,
                        });
                    }
                }
                Op::AddHandle { member, binding } => {
                    register(record, member, &binding.handle_type, 1, parent_id, table);
                }
                Op::AddHandles {
                    member,
                    binding,
                    decoded,
                    live,
                } => {
                    let n = decoded_len(*decoded, captured_len(record, member))
                        .min(live_len(live, record));
                    register(record, member, &binding.handle_type, n, parent_id, table);
                }
                Op::AddGenericHandle {
                    member,
                    discriminant,
                } => {
                    let handle_type = record.kinds.get(discriminant).cloned().unwrap_or_default();
                    register(record, member, &handle_type, 1, parent_id, table);
                }
                Op::AddStruct {
                    member,
                    struct_name,
                } => {
                    if let Some(child) = record.nested.get(member).and_then(|c| c.first()) {
                        self.run_add(struct_name, parent_id, child, table)?;
                    }
                }
                Op::AddStructs {
                    member,
                    struct_name,
                    decoded,
                    live,
                } => {
                    if let Some(children) = record.nested.get(member) {
                        let n = decoded_len(*decoded, children.len()).min(live_len(live, record));
                        for child in children.iter().take(n) {
                            self.run_add(struct_name, parent_id, child, table)?;
                        }
                    }
                }
                Op::AddChain { member } => {
                    if let Some(nodes) = record.nested.get(member) {
                        let mut state = ChainState::start(nodes.len());
                        while let ChainState::HasNode(index) = state {
                            let node = &nodes[index];
                            let arm = self.arm_for(RoutineKind::AddHandles, node.type_tag.as_deref())?;
                            self.note_node(RoutineKind::AddHandles, arm, node);
                            if let Some(struct_name) = arm {
                                self.run_add(struct_name, parent_id, node, table)?;
                            }
                            state = state.advance(nodes.len());
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Runs the length propagation routine of the record's struct.
    pub fn set_lengths(&mut self, record: &mut Record) -> Result<(), SimError> {
        let name = record.struct_name.clone();
        self.run_set_lengths(&name, record)
    }

    fn run_set_lengths(&mut self, name: &str, record: &mut Record) -> Result<(), SimError> {
        let routine = self.routine(RoutineKind::SetHandleLengths, name)?;
        if !self.enter(routine, record) {
            return Ok(());
        }

        for op in &routine.ops {
            match op {
                Op::SetHandleLength {
                    member,
                    length,
                    rebind,
                } => {
                    let n = decoded_len(*length, captured_len(record, member));
                    record.lengths.insert(member.clone(), n);
                    if *rebind {
                        record.rebound.insert(member.clone());
                    }
                }
                Op::SetStructLengths {
                    member,
                    struct_name,
                } => {
                    if let Some(children) = record.nested.get_mut(member) {
                        for child in children.iter_mut().take(1) {
                            self.run_set_lengths(struct_name, child)?;
                        }
                    }
                }
                Op::SetStructArrayLengths {
                    member,
                    struct_name,
                    count,
                } => {
                    if let Some(children) = record.nested.get_mut(member) {
                        let n = decoded_len(*count, children.len());
                        for child in children.iter_mut().take(n) {
                            self.run_set_lengths(struct_name, child)?;
                        }
                    }
                }
                Op::SetChainLengths { member } => {
                    if let Some(nodes) = record.nested.get_mut(member) {
                        let mut state = ChainState::start(nodes.len());
                        while let ChainState::HasNode(index) = state {
                            let node = &mut nodes[index];
                            let arm = self
                                .arm_for(RoutineKind::SetHandleLengths, node.type_tag.as_deref())?;
                            self.note_node(RoutineKind::SetHandleLengths, arm, node);
                            if let Some(struct_name) = arm {
                                self.run_set_lengths(struct_name, node)?;
                            }
                            state = state.advance(nodes.len());
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

fn captured_len(record: &Record, member: &str) -> usize {
    record.captured.get(member).map_or(0, Vec::len)
}

fn decoded_len(count: ElementCount, available: usize) -> usize {
    match count {
        ElementCount::Fixed(n) => n,
        ElementCount::Decoded => available,
        ElementCount::Single => 1,
    }
}

fn live_len(count: &LiveCount, record: &Record) -> usize {
    match count {
        LiveCount::Fixed(n) => *n,
        LiveCount::Single => 1,
        LiveCount::Field(field) => {
            let sibling = field.split_whitespace().next().unwrap_or(field);
            record.counts.get(sibling).copied().unwrap_or(0)
        }
    }
}

fn map_ids(
    record: &Record,
    member: &str,
    handle_type: &str,
    limit: Option<usize>,
    table: &ObjectTable,
) -> Vec<u64> {
    let ids = record.captured.get(member).map_or(&[][..], Vec::as_slice);
    ids.iter()
        .take(limit.unwrap_or(1))
        .map(|id| table.lookup(handle_type, *id))
        .collect()
}

fn register(
    record: &Record,
    member: &str,
    handle_type: &str,
    n: usize,
    parent_id: u64,
    table: &mut ObjectTable,
) {
    let captured = record.captured.get(member).map_or(&[][..], Vec::as_slice);
    let live = record.live.get(member).map_or(&[][..], Vec::as_slice);
    for (c, l) in captured.iter().zip(live).take(n) {
        table.add(parent_id, handle_type, *c, *l);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::fixtures::traversal_model;
    use crate::generator::Generator;

    const LIVE_OFFSET: u64 = 1000;

    fn plan() -> GenerationPlan {
        let model = traversal_model();
        let config = GeneratorConfig::default();
        Generator::new(&model, &config).plan().expect("Failed to plan")
    }

    fn leaf(buffer: u64) -> Record {
        Record::new("VkLeaf").handles("buffer", &[buffer])
    }

    /// Three levels of nesting plus a two-member extension chain.
    fn top() -> Record {
        let middle = Record::new("VkMiddle")
            .count("leafCount", 2)
            .nested("pLeaves", vec![leaf(11), leaf(12)])
            .handles("image", &[21]);
        let chain = vec![
            Record::new("VkTopImageExt")
                .tagged("VK_STRUCTURE_TYPE_TOP_IMAGE_EXT")
                .handles("image", &[31]),
            Record::new("VkTopBufferExt")
                .tagged("VK_STRUCTURE_TYPE_TOP_BUFFER_EXT")
                .handles("pBuffer", &[41]),
        ];
        Record::new("VkTop")
            .tagged("VK_STRUCTURE_TYPE_TOP")
            .nested("pNext", chain)
            .nested("middle", vec![middle])
            .handles("semaphores", &[51, 52])
            .count("imageCount", 3)
            .handles("pImages", &[61, 62, 63])
    }

    fn table_for(entries: &[(&str, u64)]) -> ObjectTable {
        let mut table = ObjectTable::default();
        for (handle_type, id) in entries {
            table.insert(handle_type, *id, id + LIVE_OFFSET);
        }
        table
    }

    fn top_table() -> ObjectTable {
        table_for(&[
            ("VkBuffer", 11),
            ("VkBuffer", 12),
            ("VkImage", 21),
            ("VkImage", 31),
            ("VkBuffer", 41),
            ("VkSemaphore", 51),
            ("VkSemaphore", 52),
            ("VkImage", 61),
            ("VkImage", 62),
            ("VkImage", 63),
        ])
    }

    /// Fills live values as a creating call would: captured id plus offset.
    fn with_created(mut record: Record) -> Record {
        record.live = record
            .captured
            .iter()
            .map(|(m, ids)| (m.clone(), ids.iter().map(|id| id + LIVE_OFFSET).collect()))
            .collect();
        for records in record.nested.values_mut() {
            let filled: Vec<Record> = records.drain(..).map(with_created).collect();
            *records = filled;
        }
        record
    }

    #[test]
    fn test_remap_reaches_every_handle() {
        let plan = plan();
        let mut interpreter = Interpreter::new(&plan);
        let table = top_table();
        let mut record = top();

        interpreter.map(&mut record, &table).expect("map failed");

        let expected: BTreeSet<u64> = [11, 12, 21, 31, 41, 51, 52, 61, 62, 63]
            .iter()
            .map(|id| id + LIVE_OFFSET)
            .collect();
        assert_eq!(record.all_live(), expected);
        assert!(record.rebound.contains("pImages"));
        assert!(!record.rebound.contains("semaphores"));
    }

    #[test]
    fn test_register_then_remap_round_trip() {
        let plan = plan();
        let created = with_created(top());

        let mut table = ObjectTable::default();
        Interpreter::new(&plan)
            .add(7, &created, &mut table)
            .expect("add failed");
        assert_eq!(table.log.len(), 10);
        assert!(table.log.iter().all(|r| r.parent_id == 7));

        let mut replayed = created.clone();
        replayed.clear_live();
        Interpreter::new(&plan)
            .map(&mut replayed, &table)
            .expect("map failed");

        assert_eq!(replayed.all_live(), created.all_live());
    }

    #[test]
    fn test_generic_handle_round_trip() {
        let plan = plan();
        let created = Record::new("VkNameInfo")
            .kind("objectType", "VkImage")
            .handles("objectHandle", &[5])
            .created("objectHandle", &[505]);

        let mut table = ObjectTable::default();
        Interpreter::new(&plan)
            .add(3, &created, &mut table)
            .expect("add failed");
        assert_eq!(
            table.log,
            vec![Registration {
                parent_id: 3,
                handle_type: "VkImage".to_string(),
                captured: 5,
                live: 505,
            }]
        );

        let mut replayed = created.clone();
        replayed.clear_live();
        Interpreter::new(&plan)
            .map(&mut replayed, &table)
            .expect("map failed");
        assert_eq!(replayed.live.get("objectHandle"), Some(&vec![505]));
    }

    #[test]
    fn test_guard_matches_value_access() {
        let plan = plan();

        for routines in &plan.structs {
            for kind in RoutineKind::ALL {
                let routine = routines.routine(kind);
                let touches = match kind {
                    RoutineKind::MapHandles => routine.ops.iter().any(Op::touches_value),
                    RoutineKind::AddHandles => false,
                    // Lengths follow the remap guard, minus generic handles.
                    RoutineKind::SetHandleLengths => routines
                        .map
                        .ops
                        .iter()
                        .filter(|op| !matches!(op, Op::MapGenericHandle { .. }))
                        .any(Op::touches_value),
                };
                let expected = if touches {
                    Guard::WrapperAndValue
                } else {
                    Guard::Wrapper
                };
                assert_eq!(routine.guard, expected, "{kind:?} {}", routine.struct_name);
            }
        }
    }

    #[test]
    fn test_missing_value_skips_only_value_guarded_bodies() {
        let plan = plan();
        let table = table_for(&[("VkBuffer", 1), ("VkBuffer", 2), ("VkImage", 5)]);

        let mut fixed = Record::new("VkFixedOnly")
            .handles("buffers", &[1, 2])
            .without_value();
        Interpreter::new(&plan)
            .map(&mut fixed, &table)
            .expect("map failed");
        assert_eq!(fixed.live.get("buffers"), Some(&vec![1001, 1002]));

        let mut named = Record::new("VkNameInfo")
            .kind("objectType", "VkImage")
            .handles("objectHandle", &[5])
            .without_value();
        let mut interpreter = Interpreter::new(&plan);
        interpreter.map(&mut named, &table).expect("map failed");
        assert!(named.live.is_empty());
        assert!(interpreter.executed.is_empty());
    }

    #[test]
    fn test_dispatch_skips_unknown_tags_and_continues() {
        let plan = plan();
        let table = table_for(&[("VkImage", 31)]);
        let chain = vec![
            Record::new("VkUnknown").tagged("VK_STRUCTURE_TYPE_UNKNOWN"),
            Record::new("VkTopPlainExt").tagged("VK_STRUCTURE_TYPE_TOP_PLAIN_EXT"),
            Record::new("VkTopImageExt")
                .tagged("VK_STRUCTURE_TYPE_TOP_IMAGE_EXT")
                .handles("image", &[31]),
        ];
        let mut record = Record::new("VkTop").nested("pNext", chain);

        let mut interpreter = Interpreter::new(&plan);
        interpreter.map(&mut record, &table).expect("map failed");

        assert_eq!(
            interpreter.dispatched,
            vec![(RoutineKind::MapHandles, "VkTopImageExt".to_string())]
        );
        assert_eq!(
            interpreter.defaulted,
            vec![
                (
                    RoutineKind::MapHandles,
                    "VK_STRUCTURE_TYPE_UNKNOWN".to_string()
                ),
                (
                    RoutineKind::MapHandles,
                    "VK_STRUCTURE_TYPE_TOP_PLAIN_EXT".to_string()
                ),
            ]
        );
        assert_eq!(
            record.nested["pNext"][2].live.get("image"),
            Some(&vec![1031])
        );
    }

    #[test]
    fn test_alias_has_no_dispatch_case() {
        let plan = plan();
        for dispatch in &plan.dispatches {
            let structs: Vec<&str> = dispatch.cases().map(|(_, s)| s).collect();
            assert!(!structs.contains(&"VkTopImageExtKHR"));
            assert_eq!(
                structs.iter().filter(|s| **s == "VkTopImageExt").count(),
                1
            );
        }
    }

    #[test]
    fn test_registration_follows_declared_order() {
        let plan = plan();
        let created = with_created(top());
        let mut table = ObjectTable::default();

        Interpreter::new(&plan)
            .add(1, &created, &mut table)
            .expect("add failed");

        let order: Vec<u64> = table.log.iter().map(|r| r.captured).collect();
        // Chain nodes, then middle (leaves before its image), then the
        // semaphores, then the image array.
        assert_eq!(order, vec![31, 41, 11, 12, 21, 51, 52, 61, 62, 63]);
    }

    #[test]
    fn test_count_mismatch_registers_nothing() {
        let plan = plan();
        let created = Record::new("VkCreated")
            .handles("pBuffers", &[1, 2, 3])
            .count("bufferCount", 2)
            .created("pBuffers", &[101, 102]);
        let mut table = ObjectTable::default();

        let result = Interpreter::new(&plan).add(9, &created, &mut table);

        assert_eq!(
            result,
            Err(SimError::CountMismatch {
                member: "pBuffers".to_string(),
                decoded: 3,
                live: 2,
            })
        );
        assert!(table.is_empty());
        assert!(table.log.is_empty());
    }

    #[test]
    fn test_nested_count_mismatch_propagates() {
        let plan = plan();
        let mut created = with_created(top());
        if let Some(middle) = created.nested.get_mut("middle").and_then(|m| m.first_mut()) {
            middle.counts.insert("leafCount".to_string(), 1);
        }
        let mut table = ObjectTable::default();

        let result = Interpreter::new(&plan).add(1, &created, &mut table);
        assert!(matches!(
            result,
            Err(SimError::CountMismatch { ref member, decoded: 2, live: 1 }) if member == "pLeaves"
        ));
    }

    #[test]
    fn test_set_lengths_through_nesting_and_chain() {
        let plan = plan();
        let mut record = top();

        let mut interpreter = Interpreter::new(&plan);
        interpreter.set_lengths(&mut record).expect("set lengths failed");

        assert_eq!(record.lengths.get("semaphores"), Some(&2));
        assert_eq!(record.lengths.get("pImages"), Some(&3));
        assert!(record.rebound.contains("pImages"));
        let buffer_ext = &record.nested["pNext"][1];
        assert_eq!(buffer_ext.lengths.get("pBuffer"), Some(&1));
        assert!(interpreter
            .executed
            .contains(&(RoutineKind::SetHandleLengths, "VkLeaf".to_string())));
    }

    #[test]
    fn test_chain_state_walk() {
        assert_eq!(ChainState::start(0), ChainState::AtEnd);
        assert_eq!(ChainState::start(2), ChainState::HasNode(0));
        assert_eq!(ChainState::HasNode(0).advance(2), ChainState::HasNode(1));
        assert_eq!(ChainState::HasNode(1).advance(2), ChainState::AtEnd);
        assert_eq!(ChainState::AtEnd.advance(2), ChainState::AtEnd);
    }
}
