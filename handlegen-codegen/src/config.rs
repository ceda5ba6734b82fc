//! Generator configuration and side-file loading.
//!
//! All knobs are carried by an explicit [`GeneratorConfig`] value passed to
//! the generator. The JSON side files (replay overrides and the denylist)
//! are loaded with `serde_json`; a malformed file aborts generation.

use crate::error::CodegenError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Configuration of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Identifier spliced into dispatch routine names (`Map<ChainId>StructHandles`).
    pub chain_id: String,
    /// Header field holding the runtime type tag of a chain node.
    pub struct_type_field: String,
    /// Header field linking a chain node to the next one.
    pub chain_next_field: String,
    /// Prefix stripped from handle names when forming info type names.
    pub api_type_prefix: String,
    /// Prefix of object table info types (`VkBuffer` maps to `VulkanBufferInfo`).
    pub info_type_prefix: String,
    /// 32-bit flags typedef.
    pub flags_type: String,
    /// 64-bit flags typedef.
    pub flags64_type: String,
    /// Structures and commands excluded from generation.
    pub denylist: Denylist,
    /// Commands that get a dump-resources declaration.
    pub dump_resources_calls: BTreeSet<String>,
    /// Commands whose replay is overridden by hand-written consumers.
    pub overrides: ReplayOverrides,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            chain_id: "PNext".to_string(),
            struct_type_field: "sType".to_string(),
            chain_next_field: "pNext".to_string(),
            api_type_prefix: "Vk".to_string(),
            info_type_prefix: "Vulkan".to_string(),
            flags_type: "VkFlags".to_string(),
            flags64_type: "VkFlags64".to_string(),
            denylist: Denylist::default(),
            dump_resources_calls: BTreeSet::new(),
            overrides: ReplayOverrides::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `CodegenError::Config` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, CodegenError> {
        serde_json::from_str(json).map_err(CodegenError::Config)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `CodegenError` if the file cannot be read or is malformed.
    pub fn from_file(path: &Path) -> Result<Self, CodegenError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Replaces the denylist.
    #[must_use]
    pub fn with_denylist(mut self, denylist: Denylist) -> Self {
        self.denylist = denylist;
        self
    }

    /// Replaces the replay overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ReplayOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Adds commands to the dump-resources list.
    #[must_use]
    pub fn with_dump_resources_calls<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dump_resources_calls
            .extend(commands.into_iter().map(Into::into));
        self
    }
}

/// Names excluded from generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denylist {
    /// Denylisted commands.
    #[serde(default)]
    pub functions: BTreeSet<String>,
    /// Denylisted structures.
    #[serde(default)]
    pub structures: BTreeSet<String>,
}

impl Denylist {
    /// Parses a denylist from JSON.
    ///
    /// # Errors
    /// Returns `CodegenError::Denylist` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, CodegenError> {
        serde_json::from_str(json).map_err(CodegenError::Denylist)
    }

    /// Loads a denylist from a JSON file.
    ///
    /// # Errors
    /// Returns `CodegenError` if the file cannot be read or is malformed.
    pub fn from_file(path: &Path) -> Result<Self, CodegenError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Returns true if the struct is excluded.
    #[must_use]
    pub fn is_struct_denied(&self, name: &str) -> bool {
        self.structures.contains(name)
    }

    /// Returns true if the command is excluded.
    #[must_use]
    pub fn is_command_denied(&self, name: &str) -> bool {
        self.functions.contains(name)
    }
}

/// Replay override table: command name to the consumer method replacing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOverrides {
    /// Overridden commands.
    pub functions: BTreeMap<String, String>,
}

impl ReplayOverrides {
    /// Parses an override table from JSON. The `functions` object is required.
    ///
    /// # Errors
    /// Returns `CodegenError::Overrides` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, CodegenError> {
        serde_json::from_str(json).map_err(CodegenError::Overrides)
    }

    /// Loads an override table from a JSON file.
    ///
    /// # Errors
    /// Returns `CodegenError` if the file cannot be read or is malformed.
    pub fn from_file(path: &Path) -> Result<Self, CodegenError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Returns true if the command is overridden.
    #[must_use]
    pub fn is_overridden(&self, command: &str) -> bool {
        self.functions.contains_key(command)
    }
}
