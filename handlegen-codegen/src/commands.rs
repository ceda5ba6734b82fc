//! Replay dump-resources declaration synthesis.
//!
//! Each configured command gets a `Process_<command>` declaration. Commands
//! with a replay override receive their arguments still wrapped in decoder
//! records; all others receive live API values.

use crate::config::GeneratorConfig;
use crate::diagnostic::Diagnostic;
use handlegen_schema::{Cardinality, CommandDescriptor, SchemaModel, TypeCategory};

/// How the parameters of a declaration are passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// Live API values.
    Live,
    /// Decoder records, for overridden commands.
    Decoded,
}

/// Category of a parameter's base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Handle type.
    Handle,
    /// Struct type.
    Struct,
    /// Anything else.
    Other,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    /// Parameter name.
    pub name: String,
    /// Declared base type.
    pub base_type: String,
    /// Cardinality.
    pub cardinality: Cardinality,
    /// Whether the pointee is const.
    pub is_const: bool,
    /// Category of the base type.
    pub kind: ParamKind,
}

/// Declaration of one dump-resources entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDecl {
    /// Command name.
    pub command: String,
    /// Return type, absent for `void`.
    pub return_type: Option<String>,
    /// Parameter passing style.
    pub style: ParamStyle,
    /// Parameters in declared order.
    pub params: Vec<ParamDecl>,
}

/// Synthesizes the dump-resources declarations in schema order.
///
/// Returns the declarations and a diagnostic for every configured name that
/// is not a command of the schema.
#[must_use]
pub fn dump_resources_decls(
    model: &SchemaModel,
    config: &GeneratorConfig,
) -> (Vec<CommandDecl>, Vec<Diagnostic>) {
    let mut diagnostics: Vec<Diagnostic> = config
        .dump_resources_calls
        .iter()
        .filter(|name| model.get_command(name).is_none())
        .map(|name| Diagnostic::UnknownDumpResourcesCall {
            command: name.clone(),
        })
        .collect();
    diagnostics.extend(
        config
            .overrides
            .functions
            .keys()
            .filter(|name| model.get_command(name).is_none())
            .map(|name| Diagnostic::UnknownOverride {
                command: name.clone(),
            }),
    );

    let decls = model
        .commands()
        .iter()
        .filter(|c| config.dump_resources_calls.contains(&c.name))
        .filter(|c| !config.denylist.is_command_denied(&c.name))
        .map(|c| command_decl(c, model, config))
        .collect();

    (decls, diagnostics)
}

fn command_decl(
    command: &CommandDescriptor,
    model: &SchemaModel,
    config: &GeneratorConfig,
) -> CommandDecl {
    let style = if config.overrides.is_overridden(&command.name) {
        ParamStyle::Decoded
    } else {
        ParamStyle::Live
    };

    let params = command
        .params
        .iter()
        .map(|p| ParamDecl {
            name: p.name.clone(),
            base_type: p.base_type.clone(),
            cardinality: p.cardinality,
            is_const: p.is_const,
            kind: match model.category_of(&p.base_type) {
                Some(TypeCategory::Handle) => ParamKind::Handle,
                Some(TypeCategory::Struct) => ParamKind::Struct,
                _ => ParamKind::Other,
            },
        })
        .collect();

    CommandDecl {
        command: command.name.clone(),
        return_type: (command.return_type != "void").then(|| command.return_type.clone()),
        style,
        params,
    }
}
