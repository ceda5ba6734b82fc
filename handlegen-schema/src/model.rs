//! Resolved schema model for code generation.
//!
//! [`SchemaModel`] is a normalized, queryable view of the schema: aliases are
//! resolved, member types are checked, the `structextends` relation is
//! inverted into per-struct extension candidates, and every struct knows
//! whether any handle is reachable from it.

use crate::error::SchemaError;
use crate::types::{Cardinality, MemberDef, Schema, TypeCategory, TypeDef};
use crate::validation::validate_schema;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Upper bound on alias indirections before an alias cycle is reported.
const MAX_ALIAS_DEPTH: usize = 16;

/// Named type with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Type category.
    pub category: TypeCategory,
}

/// Struct member or command parameter with a checked base type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    /// Member name.
    pub name: String,
    /// Base type name as declared.
    pub base_type: String,
    /// Cardinality.
    pub cardinality: Cardinality,
    /// Sibling member holding the element count of a dynamic array.
    pub length_field: Option<String>,
    /// Whether the pointee is const-qualified.
    pub is_const: bool,
}

impl MemberDescriptor {
    fn from_member_def(def: &MemberDef) -> Self {
        Self {
            name: def.name.clone(),
            base_type: def.type_name.clone(),
            cardinality: def.cardinality,
            length_field: def.length_field.clone(),
            is_const: def.is_const,
        }
    }

    /// Returns true when the element count of the member is known, either
    /// from a sibling length field or from a fixed array size.
    #[must_use]
    pub fn has_explicit_length_field(&self) -> bool {
        self.length_field.is_some() || matches!(self.cardinality, Cardinality::FixedArray(_))
    }

    /// Returns true for pointer members that the callee writes through.
    #[must_use]
    pub fn is_output(&self) -> bool {
        self.cardinality.is_indirect() && !self.is_const
    }
}

/// Struct with resolved members and extension relationships.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    /// Struct name.
    pub name: String,
    /// Members in declared order.
    pub members: Vec<MemberDescriptor>,
    /// Structs that may appear in this struct's extension chain (as declared,
    /// possibly aliases).
    pub extends_candidates: BTreeSet<String>,
    /// Whether a handle is reachable from this struct.
    pub contains_handles: bool,
    /// Runtime type tag.
    pub type_tag: Option<String>,
    /// Members acting as the head of the extension chain.
    pub chain_heads: BTreeSet<String>,
    /// Generic handle members mapped to their discriminant sibling.
    pub generic_handles: BTreeMap<String, String>,
}

impl StructDescriptor {
    /// Looks up a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Returns true if the named member heads the extension chain.
    #[must_use]
    pub fn is_chain_head(&self, member: &str) -> bool {
        self.chain_heads.contains(member)
    }

    /// Returns the discriminant sibling of a generic handle member.
    #[must_use]
    pub fn generic_discriminant(&self, member: &str) -> Option<&str> {
        self.generic_handles.get(member).map(String::as_str)
    }
}

/// Enum with its storage width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Enum name.
    pub name: String,
    /// Storage width in bits.
    pub bit_width: u8,
    /// Canonical enum this name aliases.
    pub alias_of: Option<String>,
}

impl EnumDescriptor {
    /// Returns true if this name aliases another enum.
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    /// Returns true for 64-bit flag enums.
    #[must_use]
    pub fn is_flags_64bit(&self) -> bool {
        self.bit_width == 64
    }

    /// Returns true if the name follows the bit-flag naming convention.
    #[must_use]
    pub fn is_bit_flags(&self) -> bool {
        self.name.contains("Bits")
    }

    /// Returns the flags typedef paired with this enum
    /// (`VkAccessFlagBits2` becomes `VkAccessFlags2`).
    #[must_use]
    pub fn flags_type_name(&self) -> String {
        self.name.replace("FlagBits", "Flags")
    }
}

/// Command with checked parameters.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    /// Command name.
    pub name: String,
    /// Return type name.
    pub return_type: String,
    /// Parameters in declared order.
    pub params: Vec<MemberDescriptor>,
}

impl CommandDescriptor {
    /// Iterates over parameters the command writes through.
    pub fn output_params(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.params.iter().filter(|p| p.is_output())
    }
}

/// One entry of an extension registry: a runtime tag and the canonical
/// struct it denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Runtime type tag value. Always present when the struct contains
    /// handles.
    pub type_tag: Option<String>,
    /// Canonical struct name.
    pub struct_name: String,
    /// Whether the struct contains handles.
    pub contains_handles: bool,
}

/// Accessor names used against the externally owned object table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleTableBinding {
    /// Canonical handle type name.
    pub handle_type: String,
    /// Lookup accessor (`Get<Kind>Info`).
    pub get_accessor: String,
    /// Registration accessor (`Add<Kind>Info`).
    pub add_accessor: String,
}

/// Resolved, immutable schema model.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    /// Registry name.
    pub name: String,
    types: HashMap<String, TypeDescriptor>,
    aliases: HashMap<String, String>,
    structs: Vec<StructDescriptor>,
    struct_index: HashMap<String, usize>,
    enums: Vec<EnumDescriptor>,
    commands: Vec<CommandDescriptor>,
    registries: HashMap<String, Vec<RegistryEntry>>,
}

impl SchemaModel {
    /// Builds the model from a parsed schema.
    ///
    /// # Errors
    /// Returns `SchemaError` if validation fails, a member references an
    /// unknown type, an alias dangles or a handle-bearing extension struct
    /// has no tag.
    pub fn from_schema(schema: &Schema) -> Result<Self, SchemaError> {
        validate_schema(schema)?;

        let mut model = Self {
            name: schema.name.clone(),
            types: HashMap::new(),
            aliases: HashMap::new(),
            structs: Vec::new(),
            struct_index: HashMap::new(),
            enums: Vec::new(),
            commands: Vec::new(),
            registries: HashMap::new(),
        };

        for type_def in &schema.types {
            model.types.insert(
                type_def.name().to_string(),
                TypeDescriptor {
                    name: type_def.name().to_string(),
                    category: type_def.category(),
                },
            );
            if let Some(target) = type_def.alias_of() {
                model
                    .aliases
                    .insert(type_def.name().to_string(), target.to_string());
            }
        }
        model.check_aliases()?;

        for type_def in &schema.types {
            match type_def {
                TypeDef::Struct(def) if def.alias.is_none() => {
                    let mut descriptor = StructDescriptor {
                        name: def.name.clone(),
                        members: Vec::with_capacity(def.members.len()),
                        extends_candidates: BTreeSet::new(),
                        contains_handles: false,
                        type_tag: def.type_tag.clone(),
                        chain_heads: BTreeSet::new(),
                        generic_handles: BTreeMap::new(),
                    };
                    for member in &def.members {
                        model.require_type(&member.type_name, &def.name, &member.name)?;
                        if member.chain_head {
                            descriptor.chain_heads.insert(member.name.clone());
                        }
                        if let Some(discriminant) = &member.generic_discriminant {
                            descriptor
                                .generic_handles
                                .insert(member.name.clone(), discriminant.clone());
                        }
                        descriptor
                            .members
                            .push(MemberDescriptor::from_member_def(member));
                    }
                    model
                        .struct_index
                        .insert(descriptor.name.clone(), model.structs.len());
                    model.structs.push(descriptor);
                }
                TypeDef::Enum(def) => model.enums.push(EnumDescriptor {
                    name: def.name.clone(),
                    bit_width: def.bit_width,
                    alias_of: def.alias.clone(),
                }),
                _ => {}
            }
        }

        for def in schema.structs() {
            for base in &def.struct_extends {
                let context = format!("{}.structextends", def.name);
                let index = model
                    .struct_slot(base)
                    .ok_or_else(|| SchemaError::unknown_type(base, context))?;
                model.structs[index]
                    .extends_candidates
                    .insert(def.name.clone());
            }
        }

        for command in &schema.commands {
            for param in &command.params {
                model.require_type(&param.type_name, &command.name, &param.name)?;
            }
            if command.return_type != "void" {
                model.require_type(&command.return_type, &command.name, "return")?;
            }
            model.commands.push(CommandDescriptor {
                name: command.name.clone(),
                return_type: command.return_type.clone(),
                params: command
                    .params
                    .iter()
                    .map(MemberDescriptor::from_member_def)
                    .collect(),
            });
        }

        model.build_registries();
        model.compute_contains_handles();
        model.check_registry_tags()?;

        tracing::debug!(
            registry = %model.name,
            structs = model.structs.len(),
            handle_structs = model.structs.iter().filter(|s| s.contains_handles).count(),
            enums = model.enums.len(),
            commands = model.commands.len(),
            "schema model built"
        );

        Ok(model)
    }

    /// Verifies every alias resolves to a declared, non-cyclic target.
    fn check_aliases(&self) -> Result<(), SchemaError> {
        for (alias, target) in &self.aliases {
            let mut current = target.as_str();
            let mut hops = 0;
            loop {
                if !self.types.contains_key(current) {
                    return Err(SchemaError::DanglingAlias {
                        alias: alias.clone(),
                        target: current.to_string(),
                    });
                }
                match self.aliases.get(current) {
                    Some(next) => current = next,
                    None => break,
                }
                hops += 1;
                if hops > MAX_ALIAS_DEPTH {
                    return Err(SchemaError::Validation {
                        message: format!("alias cycle through '{alias}'"),
                    });
                }
            }
        }
        Ok(())
    }

    fn require_type(&self, type_name: &str, owner: &str, member: &str) -> Result<(), SchemaError> {
        if self.types.contains_key(type_name) {
            Ok(())
        } else {
            Err(SchemaError::unknown_type(type_name, format!("{owner}.{member}")))
        }
    }

    fn struct_slot(&self, name: &str) -> Option<usize> {
        self.struct_index.get(self.resolve_alias(name)).copied()
    }

    /// Builds the tag registry of every struct that has extension candidates.
    fn build_registries(&mut self) {
        let mut registries = HashMap::new();

        for base in &self.structs {
            if base.extends_candidates.is_empty() {
                continue;
            }

            let mut reachable = BTreeSet::new();
            let mut queue: VecDeque<&str> =
                base.extends_candidates.iter().map(String::as_str).collect();
            while let Some(candidate) = queue.pop_front() {
                // Aliases resolve to their canonical struct before registration.
                let canonical = self.resolve_alias(candidate);
                if canonical == base.name || !reachable.insert(canonical.to_string()) {
                    continue;
                }
                if let Some(index) = self.struct_index.get(canonical) {
                    queue.extend(
                        self.structs[*index]
                            .extends_candidates
                            .iter()
                            .map(String::as_str),
                    );
                }
            }

            let entries: Vec<RegistryEntry> = reachable
                .into_iter()
                .map(|name| RegistryEntry {
                    type_tag: self.get_struct(&name).and_then(|s| s.type_tag.clone()),
                    struct_name: name,
                    contains_handles: false,
                })
                .collect();
            registries.insert(base.name.clone(), entries);
        }

        self.registries = registries;
    }

    /// Requires a type tag on every extension struct that dispatch must
    /// recognize. Tagless extensions without handles are left to be
    /// reported downstream.
    fn check_registry_tags(&self) -> Result<(), SchemaError> {
        let mut entries: Vec<&RegistryEntry> = self.registries.values().flatten().collect();
        entries.sort_by(|a, b| a.struct_name.cmp(&b.struct_name));
        match entries
            .into_iter()
            .find(|e| e.contains_handles && e.type_tag.is_none())
        {
            Some(entry) => Err(SchemaError::MissingTypeTag {
                name: entry.struct_name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Marks structs with reachable handles, iterating to a fixpoint because
    /// nesting and extension chains may refer forward.
    fn compute_contains_handles(&mut self) {
        loop {
            let mut changed = false;
            for index in 0..self.structs.len() {
                if self.structs[index].contains_handles {
                    continue;
                }
                let has_handles = self.struct_has_handles(&self.structs[index]);
                if has_handles {
                    self.structs[index].contains_handles = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let flags: HashMap<String, bool> = self
            .structs
            .iter()
            .map(|s| (s.name.clone(), s.contains_handles))
            .collect();
        for entries in self.registries.values_mut() {
            for entry in entries {
                entry.contains_handles = flags.get(&entry.struct_name).copied().unwrap_or(false);
            }
        }
    }

    fn struct_has_handles(&self, descriptor: &StructDescriptor) -> bool {
        descriptor.members.iter().any(|member| {
            if descriptor.generic_handles.contains_key(&member.name) {
                return true;
            }
            if descriptor.is_chain_head(&member.name) {
                return self.extension_registry(&descriptor.name).iter().any(|entry| {
                    self.get_struct(&entry.struct_name)
                        .is_some_and(|s| s.contains_handles)
                });
            }
            match self.category_of(&member.base_type) {
                Some(TypeCategory::Handle) => true,
                Some(TypeCategory::Struct) => self
                    .get_struct(&member.base_type)
                    .is_some_and(|s| s.contains_handles),
                _ => false,
            }
        })
    }

    /// Resolves an alias chain to its canonical name.
    #[must_use]
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        let mut current = name;
        for _ in 0..=MAX_ALIAS_DEPTH {
            match self.aliases.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Returns the canonical struct name behind a struct or struct alias.
    #[must_use]
    pub fn resolve_struct_alias(&self, name: &str) -> Option<&str> {
        self.get_struct(name).map(|s| s.name.as_str())
    }

    /// Returns true if the name is an alias of a struct.
    #[must_use]
    pub fn is_struct_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
            && self
                .types
                .get(name)
                .is_some_and(|t| t.category == TypeCategory::Struct)
    }

    /// Gets a type descriptor by name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Returns the category of a type after alias resolution.
    #[must_use]
    pub fn category_of(&self, name: &str) -> Option<TypeCategory> {
        self.types.get(self.resolve_alias(name)).map(|t| t.category)
    }

    /// Gets a struct descriptor by name, resolving aliases.
    #[must_use]
    pub fn get_struct(&self, name: &str) -> Option<&StructDescriptor> {
        self.struct_slot(name).map(|index| &self.structs[index])
    }

    /// Returns all canonical structs in declaration order.
    #[must_use]
    pub fn structs(&self) -> &[StructDescriptor] {
        &self.structs
    }

    /// Iterates over structs that contain handles.
    pub fn handle_structs(&self) -> impl Iterator<Item = &StructDescriptor> {
        self.structs.iter().filter(|s| s.contains_handles)
    }

    /// Returns all enums in declaration order, aliases included.
    #[must_use]
    pub fn enums(&self) -> &[EnumDescriptor] {
        &self.enums
    }

    /// Returns all commands in declaration order.
    #[must_use]
    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    /// Gets a command by name.
    #[must_use]
    pub fn get_command(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Iterates over every generic handle binding as
    /// `(struct, member, discriminant)`.
    pub fn generic_handle_bindings(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.structs.iter().flat_map(|s| {
            s.generic_handles
                .iter()
                .map(move |(m, d)| (s.name.as_str(), m.as_str(), d.as_str()))
        })
    }

    /// Returns the extension registry of a base struct: every canonical
    /// struct reachable through its extension candidates, sorted by name.
    #[must_use]
    pub fn extension_registry(&self, base: &str) -> &[RegistryEntry] {
        self.registries
            .get(self.resolve_alias(base))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the union of all extension registries, deduplicated by
    /// canonical struct and sorted by name.
    #[must_use]
    pub fn extended_structs(&self) -> Vec<&RegistryEntry> {
        let mut by_name: BTreeMap<&str, &RegistryEntry> = BTreeMap::new();
        for entries in self.registries.values() {
            for entry in entries {
                by_name.entry(entry.struct_name.as_str()).or_insert(entry);
            }
        }
        by_name.into_values().collect()
    }

    /// Returns the bases whose extension chain may carry the given struct.
    #[must_use]
    pub fn extension_bases(&self, extension: &str) -> Vec<&str> {
        let canonical = self.resolve_alias(extension);
        let mut bases: Vec<&str> = self
            .registries
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e.struct_name == canonical))
            .map(|(base, _)| base.as_str())
            .collect();
        bases.sort_unstable();
        bases
    }

    /// Returns the object table accessors for a handle type.
    #[must_use]
    pub fn handle_table_binding(&self, handle: &str) -> Option<HandleTableBinding> {
        let canonical = self.resolve_alias(handle);
        match self.category_of(canonical) {
            Some(TypeCategory::Handle) => Some(HandleTableBinding {
                handle_type: canonical.to_string(),
                get_accessor: format!("Get{canonical}Info"),
                add_accessor: format!("Add{canonical}Info"),
            }),
            _ => None,
        }
    }
}
