//! Generation driver.
//!
//! Runs every synthesizer over a model into a [`GenerationPlan`], then
//! renders the plan through a [`CodeEmitter`].

use crate::commands::{CommandDecl, dump_resources_decls};
use crate::config::GeneratorConfig;
use crate::diagnostic::Diagnostic;
use crate::emit::{CodeEmitter, CppEmitter, OutputFile};
use crate::enums::{EnumDecl, enum_decls};
use crate::error::CodegenError;
use crate::extension::{ChainDispatch, ExtensionChainSynthesizer};
use crate::ops::{RoutineKind, StructRoutines};
use crate::synth::TraversalSynthesizer;
use handlegen_schema::SchemaModel;
use std::path::Path;

/// Everything synthesized for one run, before rendering.
#[derive(Debug, Clone, Default)]
pub struct GenerationPlan {
    /// Routines of every handle-bearing struct, in declaration order.
    pub structs: Vec<StructRoutines>,
    /// Extension chain dispatch routines.
    pub dispatches: Vec<ChainDispatch>,
    /// Enum to-string declarations.
    pub enums: Vec<EnumDecl>,
    /// Dump-resources declarations.
    pub commands: Vec<CommandDecl>,
    /// Recoverable findings.
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationPlan {
    /// Looks up the routines of a struct.
    #[must_use]
    pub fn struct_routines(&self, name: &str) -> Option<&StructRoutines> {
        self.structs.iter().find(|r| r.struct_name == name)
    }

    /// Looks up the dispatch routine of a kind.
    #[must_use]
    pub fn dispatch(&self, kind: RoutineKind) -> Option<&ChainDispatch> {
        self.dispatches.iter().find(|d| d.kind == kind)
    }
}

/// Rendered output files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSources {
    /// Routine declarations.
    pub handle_mappers_header: String,
    /// Routine definitions.
    pub handle_mappers: String,
    /// Enum to-string declarations.
    pub enum_to_string_header: String,
    /// Dump-resources declarations.
    pub dump_resources_header: String,
}

impl GeneratedSources {
    /// Returns the content of an output file.
    #[must_use]
    pub fn get(&self, file: OutputFile) -> &str {
        match file {
            OutputFile::HandleMappersHeader => &self.handle_mappers_header,
            OutputFile::HandleMappers => &self.handle_mappers,
            OutputFile::EnumToStringHeader => &self.enum_to_string_header,
            OutputFile::DumpResourcesHeader => &self.dump_resources_header,
        }
    }

    /// Writes every output file into a directory.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if a file cannot be written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(), CodegenError> {
        std::fs::create_dir_all(dir)?;
        for file in OutputFile::ALL {
            std::fs::write(dir.join(file.file_name()), self.get(file))?;
        }
        Ok(())
    }
}

/// Main code generator.
pub struct Generator<'a> {
    model: &'a SchemaModel,
    config: &'a GeneratorConfig,
}

impl<'a> Generator<'a> {
    /// Creates a new generator for the given model and configuration.
    #[must_use]
    pub fn new(model: &'a SchemaModel, config: &'a GeneratorConfig) -> Self {
        Self { model, config }
    }

    /// Synthesizes the full plan.
    ///
    /// # Errors
    /// Returns `CodegenError` if a routine cannot be synthesized.
    pub fn plan(&self) -> Result<GenerationPlan, CodegenError> {
        let synthesizer = TraversalSynthesizer::new(self.model);
        let denylist = &self.config.denylist;

        let structs = self
            .model
            .handle_structs()
            .filter(|s| {
                let denied = denylist.is_struct_denied(&s.name);
                if denied {
                    tracing::debug!(structure = %s.name, "skipping denylisted struct");
                }
                !denied
            })
            .map(|s| synthesizer.synthesize(s))
            .collect::<Result<Vec<_>, _>>()?;

        let chain = ExtensionChainSynthesizer::new(self.model, self.config).synthesize();
        let (commands, command_diagnostics) = dump_resources_decls(self.model, self.config);
        for diagnostic in &command_diagnostics {
            tracing::warn!("{}", diagnostic);
        }

        let mut diagnostics = chain.diagnostics;
        diagnostics.extend(command_diagnostics);

        let plan = GenerationPlan {
            structs,
            dispatches: chain.dispatches,
            enums: enum_decls(self.model),
            commands,
            diagnostics,
        };

        tracing::info!(
            schema = %self.model.name,
            structs = plan.structs.len(),
            dispatches = plan.dispatches.len(),
            enums = plan.enums.len(),
            commands = plan.commands.len(),
            diagnostics = plan.diagnostics.len(),
            "generation plan ready"
        );

        Ok(plan)
    }

    /// Generates C++ sources with an emitter built from the configuration.
    ///
    /// # Errors
    /// Returns `CodegenError` if synthesis fails.
    pub fn generate(&self) -> Result<GeneratedSources, CodegenError> {
        self.generate_with(&CppEmitter::from_config(self.config))
    }

    /// Generates sources with the given emitter.
    ///
    /// # Errors
    /// Returns `CodegenError` if synthesis fails.
    pub fn generate_with<E: CodeEmitter + ?Sized>(
        &self,
        emitter: &E,
    ) -> Result<GeneratedSources, CodegenError> {
        let plan = self.plan()?;
        Ok(render(&plan, emitter))
    }
}

/// Renders a plan into output files.
#[must_use]
pub fn render<E: CodeEmitter + ?Sized>(plan: &GenerationPlan, emitter: &E) -> GeneratedSources {
    let mut header = emitter.prologue(OutputFile::HandleMappersHeader);
    let mut source = emitter.prologue(OutputFile::HandleMappers);

    for dispatch in &plan.dispatches {
        header.push_str(&emitter.dispatch_declaration(dispatch));
    }
    if !plan.dispatches.is_empty() {
        header.push('\n');
    }

    for routines in &plan.structs {
        for kind in RoutineKind::ALL {
            let routine = routines.routine(kind);
            header.push_str(&emitter.routine_declaration(routine));
            source.push_str(&emitter.routine_definition(routine));
            source.push('\n');
        }
    }

    for dispatch in &plan.dispatches {
        source.push_str(&emitter.dispatch_definition(dispatch));
        source.push('\n');
    }

    header.push_str(&emitter.epilogue(OutputFile::HandleMappersHeader));
    source.push_str(&emitter.epilogue(OutputFile::HandleMappers));

    let mut enum_header = emitter.prologue(OutputFile::EnumToStringHeader);
    for decl in &plan.enums {
        enum_header.push_str(&emitter.enum_declaration(decl));
    }
    enum_header.push_str(&emitter.epilogue(OutputFile::EnumToStringHeader));

    let mut dump_header = emitter.prologue(OutputFile::DumpResourcesHeader);
    for decl in &plan.commands {
        dump_header.push_str(&emitter.command_declaration(decl));
    }
    dump_header.push_str(&emitter.epilogue(OutputFile::DumpResourcesHeader));

    GeneratedSources {
        handle_mappers_header: header,
        handle_mappers: source,
        enum_to_string_header: enum_header,
        dump_resources_header: dump_header,
    }
}
