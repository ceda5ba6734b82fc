//! C++ emitter for capture/replay decoders.
//!
//! Routine and accessor names are fixed by the consuming code base:
//! `MapStructHandles`, `AddStructHandles`, `SetStructHandleLengths`, the
//! `handle_mapping` helpers, and the `CommonObjectInfoTable` accessors.

use super::{CodeEmitter, OutputFile};
use crate::commands::{CommandDecl, ParamDecl, ParamKind, ParamStyle};
use crate::config::GeneratorConfig;
use crate::enums::{EnumDecl, EnumDeclKind};
use crate::extension::{ChainDispatch, DispatchArm};
use crate::ops::{CountedElements, ElementCount, Guard, LiveCount, Op, Routine, RoutineKind};
use handlegen_schema::Cardinality;

const INDENT: &str = "    ";

/// Emitter producing C++ source.
#[derive(Debug, Clone)]
pub struct CppEmitter {
    chain_id: String,
    api_type_prefix: String,
    info_type_prefix: String,
    flags_type: String,
    flags64_type: String,
}

impl Default for CppEmitter {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

impl CppEmitter {
    /// Creates an emitter using the naming knobs of a configuration.
    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            chain_id: config.chain_id.clone(),
            api_type_prefix: config.api_type_prefix.clone(),
            info_type_prefix: config.info_type_prefix.clone(),
            flags_type: config.flags_type.clone(),
            flags64_type: config.flags64_type.clone(),
        }
    }

    /// Returns the object table info type of a handle (`VkBuffer` maps to
    /// `VulkanBufferInfo`).
    #[must_use]
    pub fn info_type(&self, handle_type: &str) -> String {
        let stem = handle_type
            .strip_prefix(self.api_type_prefix.as_str())
            .unwrap_or(handle_type);
        format!("{}{}Info", self.info_type_prefix, stem)
    }

    fn signature(&self, routine: &Routine) -> String {
        let name = routine.kind.routine_name();
        let s = &routine.struct_name;
        match routine.kind {
            RoutineKind::MapHandles => format!(
                "void {name}(Decoded_{s}* wrapper, const CommonObjectInfoTable& object_info_table)"
            ),
            RoutineKind::AddHandles => format!(
                "bool {name}(format::HandleId parent_id, const Decoded_{s}* id_wrapper, const {s}* handle_struct, CommonObjectInfoTable* object_info_table)"
            ),
            RoutineKind::SetHandleLengths => format!("void {name}(Decoded_{s}* wrapper)"),
        }
    }

    fn dispatch_signature(&self, dispatch: &ChainDispatch) -> String {
        let name = &dispatch.name;
        match dispatch.kind {
            RoutineKind::MapHandles => format!(
                "void {name}(PNextNode* pnext, const CommonObjectInfoTable& object_info_table)"
            ),
            RoutineKind::AddHandles => format!(
                "bool {name}(format::HandleId parent_id, const PNextNode* id_pnext, const void* handle_pnext, CommonObjectInfoTable* object_info_table)"
            ),
            RoutineKind::SetHandleLengths => format!("void {name}(PNextNode* pnext)"),
        }
    }

    /// Renders one op as lines relative to the routine body.
    fn op_lines(&self, op: &Op) -> Vec<String> {
        match op {
            Op::MapHandle { member, binding } => vec![format!(
                "value->{member} = handle_mapping::MapHandle<{}>(wrapper->{member}, object_info_table, &CommonObjectInfoTable::{});",
                self.info_type(&binding.handle_type),
                binding.get_accessor
            )],
            Op::MapHandles {
                member,
                binding,
                rebind,
                ..
            } => {
                let call = format!(
                    "handle_mapping::MapHandleArray<{}>(&wrapper->{member}, object_info_table, &CommonObjectInfoTable::{});",
                    self.info_type(&binding.handle_type),
                    binding.get_accessor
                );
                if *rebind {
                    vec![format!("value->{member} = {call}")]
                } else {
                    vec![call]
                }
            }
            Op::MapGenericHandle {
                member,
                discriminant,
            } => vec![format!(
                "value->{member} = handle_mapping::MapHandle(wrapper->{member}, value->{discriminant}, object_info_table);"
            )],
            Op::MapStruct { member, .. } => {
                vec![format!("MapStructHandles(wrapper->{member}, object_info_table);")]
            }
            Op::MapStructs {
                member,
                struct_name,
                count,
            } => vec![format!(
                "MapStructArrayHandles<Decoded_{struct_name}>(wrapper->{member}->GetMetaStructPointer(), {}, object_info_table);",
                struct_count("wrapper", member, *count)
            )],
            Op::MapChain { member } => guarded_call(
                &format!("wrapper->{member}"),
                format!(
                    "{}(wrapper->{member}, object_info_table);",
                    RoutineKind::MapHandles.dispatch_name(&self.chain_id)
                ),
            ),
            Op::CheckCount {
                member,
                decoded,
                live,
                elements,
            } => {
                let decoded = match elements {
                    CountedElements::Handles => handle_count("id_wrapper", member, *decoded),
                    CountedElements::Structs => struct_count("id_wrapper", member, *decoded),
                };
                fail_unless(format!(
                    "handle_mapping::CheckHandleCount({decoded}, {})",
                    live_count(live)
                ))
            }
            Op::AddHandle { member, binding } => vec![format!(
                "handle_mapping::AddHandle<{}>(parent_id, id_wrapper->{member}, handle_struct->{member}, object_info_table, &CommonObjectInfoTable::{});",
                self.info_type(&binding.handle_type),
                binding.add_accessor
            )],
            Op::AddHandles {
                member,
                binding,
                decoded,
                live,
            } => vec![format!(
                "handle_mapping::AddHandleArray<{}>(parent_id, id_wrapper->{member}.GetPointer(), {}, handle_struct->{member}, {}, object_info_table, &CommonObjectInfoTable::{});",
                self.info_type(&binding.handle_type),
                handle_count("id_wrapper", member, *decoded),
                live_count(live),
                binding.add_accessor
            )],
            Op::AddGenericHandle {
                member,
                discriminant,
            } => vec![format!(
                "handle_mapping::AddHandle(parent_id, id_wrapper->{member}, handle_struct->{member}, handle_struct->{discriminant}, object_info_table);"
            )],
            Op::AddStruct { member, .. } => fail_unless(format!(
                "AddStructHandles(parent_id, id_wrapper->{member}, &handle_struct->{member}, object_info_table)"
            )),
            Op::AddStructs {
                member,
                struct_name,
                decoded,
                live,
            } => fail_unless(format!(
                "AddStructArrayHandles<Decoded_{struct_name}>(parent_id, id_wrapper->{member}->GetMetaStructPointer(), {}, handle_struct->{member}, {}, object_info_table)",
                struct_count("id_wrapper", member, *decoded),
                live_count(live)
            )),
            Op::AddChain { member } => {
                let mut lines = vec![format!("if (id_wrapper->{member})"), "{".to_string()];
                lines.extend(
                    fail_unless(format!(
                        "{}(parent_id, id_wrapper->{member}, handle_struct->{member}, object_info_table)",
                        RoutineKind::AddHandles.dispatch_name(&self.chain_id)
                    ))
                    .into_iter()
                    .map(|line| format!("{INDENT}{line}")),
                );
                lines.push("}".to_string());
                lines
            }
            Op::SetHandleLength {
                member,
                length,
                rebind,
            } => {
                let mut lines = vec![format!(
                    "wrapper->{member}.SetHandleLength({});",
                    handle_count("wrapper", member, *length)
                )];
                if *rebind {
                    lines.push(format!(
                        "value->{member} = wrapper->{member}.GetHandlePointer();"
                    ));
                }
                lines
            }
            Op::SetStructLengths { member, .. } => {
                vec![format!("SetStructHandleLengths(wrapper->{member});")]
            }
            Op::SetStructArrayLengths {
                member,
                struct_name,
                count,
            } => vec![format!(
                "SetStructArrayHandleLengths<Decoded_{struct_name}>(wrapper->{member}->GetMetaStructPointer(), {});",
                struct_count("wrapper", member, *count)
            )],
            Op::SetChainLengths { member } => guarded_call(
                &format!("wrapper->{member}"),
                format!(
                    "{}(wrapper->{member});",
                    RoutineKind::SetHandleLengths.dispatch_name(&self.chain_id)
                ),
            ),
        }
    }

    fn dispatch_case_lines(&self, dispatch: &ChainDispatch, struct_name: &str) -> Vec<String> {
        let routine = dispatch.kind.routine_name();
        match dispatch.kind {
            RoutineKind::MapHandles => vec![format!(
                "{routine}(reinterpret_cast<Decoded_{struct_name}*>(wrapper), object_info_table);"
            )],
            RoutineKind::AddHandles => fail_unless(format!(
                "{routine}(parent_id, reinterpret_cast<const Decoded_{struct_name}*>(wrapper), reinterpret_cast<const {struct_name}*>(handle_pnext), object_info_table)"
            )),
            RoutineKind::SetHandleLengths => vec![format!(
                "{routine}(reinterpret_cast<Decoded_{struct_name}*>(wrapper));"
            )],
        }
    }

    fn param(&self, style: ParamStyle, param: &ParamDecl) -> String {
        let name = &param.name;
        let base = &param.base_type;
        let indirect = param.cardinality != Cardinality::Scalar;
        let constness = if param.is_const { "const " } else { "" };

        match (style, param.kind, indirect) {
            (ParamStyle::Live, _, false) => format!("{base} {name}"),
            (ParamStyle::Live, _, true) => format!("{constness}{base}* {name}"),
            (ParamStyle::Decoded, ParamKind::Handle, false) => format!("format::HandleId {name}"),
            (ParamStyle::Decoded, ParamKind::Handle, true) => {
                format!("HandlePointerDecoder<{base}>* {name}")
            }
            (ParamStyle::Decoded, ParamKind::Struct, false) => {
                format!("const Decoded_{base}& {name}")
            }
            (ParamStyle::Decoded, ParamKind::Struct, true) => {
                format!("StructPointerDecoder<Decoded_{base}>* {name}")
            }
            (ParamStyle::Decoded, ParamKind::Other, false) => format!("{base} {name}"),
            (ParamStyle::Decoded, ParamKind::Other, true) if base == "void" => {
                format!("uint64_t {name}")
            }
            (ParamStyle::Decoded, ParamKind::Other, true) => {
                format!("PointerDecoder<{base}>* {name}")
            }
        }
    }
}

impl CodeEmitter for CppEmitter {
    fn prologue(&self, file: OutputFile) -> String {
        let mut output = String::from("// Generated by handlegen. Do not edit.\n\n");
        match file {
            OutputFile::HandleMappers => {}
            OutputFile::HandleMappersHeader
            | OutputFile::EnumToStringHeader
            | OutputFile::DumpResourcesHeader => output.push_str("#pragma once\n\n"),
        }
        output
    }

    fn routine_declaration(&self, routine: &Routine) -> String {
        format!("{};\n", self.signature(routine))
    }

    fn routine_definition(&self, routine: &Routine) -> String {
        let mut output = String::new();
        let (wrapper, returns) = match routine.kind {
            RoutineKind::AddHandles => ("id_wrapper", true),
            RoutineKind::MapHandles | RoutineKind::SetHandleLengths => ("wrapper", false),
        };

        output.push_str(&format!("{}\n{{\n", self.signature(routine)));
        match routine.guard {
            Guard::Wrapper => {
                output.push_str(&format!("{INDENT}if ({wrapper} != nullptr)\n"));
                output.push_str(&format!("{INDENT}{{\n"));
            }
            Guard::WrapperAndValue => {
                output.push_str(&format!(
                    "{INDENT}if (({wrapper} != nullptr) && ({wrapper}->decoded_value != nullptr))\n"
                ));
                output.push_str(&format!("{INDENT}{{\n"));
                output.push_str(&format!(
                    "{INDENT}{INDENT}{}* value = {wrapper}->decoded_value;\n",
                    routine.struct_name
                ));
                output.push('\n');
            }
        }

        let blocks: Vec<String> = routine
            .ops
            .iter()
            .map(|op| indent_lines(&self.op_lines(op), 2))
            .collect();
        output.push_str(&blocks.join("\n"));

        output.push_str(&format!("{INDENT}}}\n"));
        if returns {
            output.push_str(&format!("\n{INDENT}return true;\n"));
        }
        output.push_str("}\n");
        output
    }

    fn dispatch_declaration(&self, dispatch: &ChainDispatch) -> String {
        format!("{};\n", self.dispatch_signature(dispatch))
    }

    fn dispatch_definition(&self, dispatch: &ChainDispatch) -> String {
        let mut output = String::new();
        let (cursor, constness, returns) = match dispatch.kind {
            RoutineKind::AddHandles => ("id_pnext", "const ", true),
            RoutineKind::MapHandles | RoutineKind::SetHandleLengths => ("pnext", "", false),
        };

        output.push_str(&format!("{}\n{{\n", self.dispatch_signature(dispatch)));
        if returns {
            output.push_str(&format!(
                "{INDENT}while (({cursor} != nullptr) && (handle_pnext != nullptr))\n"
            ));
        } else {
            output.push_str(&format!("{INDENT}while ({cursor} != nullptr)\n"));
        }
        output.push_str(&format!("{INDENT}{{\n"));
        output.push_str(&format!(
            "{INDENT}{INDENT}{constness}void* wrapper = {cursor}->GetMetaStructPointer();\n"
        ));
        output.push_str(&format!(
            "{INDENT}{INDENT}const auto* header = reinterpret_cast<const MetaStructHeader*>(wrapper);\n\n"
        ));
        output.push_str(&format!(
            "{INDENT}{INDENT}switch (*header->{})\n",
            dispatch.tag_field
        ));
        output.push_str(&format!("{INDENT}{INDENT}{{\n"));

        for arm in &dispatch.arms {
            match arm {
                DispatchArm::Case { tag, struct_name } => {
                    output.push_str(&format!("{INDENT}{INDENT}{INDENT}case {tag}:\n"));
                    output.push_str(&indent_lines(
                        &self.dispatch_case_lines(dispatch, struct_name),
                        4,
                    ));
                }
                DispatchArm::Default => {
                    output.push_str(&format!("{INDENT}{INDENT}{INDENT}default:\n"));
                }
            }
            output.push_str(&format!("{INDENT}{INDENT}{INDENT}{INDENT}break;\n"));
        }

        output.push_str(&format!("{INDENT}{INDENT}}}\n\n"));
        output.push_str(&format!(
            "{INDENT}{INDENT}{cursor} = header->{};\n",
            dispatch.next_field
        ));
        if returns {
            output.push_str(&format!(
                "{INDENT}{INDENT}handle_pnext = handle_mapping::NextChainNode(handle_pnext);\n"
            ));
        }
        output.push_str(&format!("{INDENT}}}\n"));
        if returns {
            output.push_str(&format!("\n{INDENT}return true;\n"));
        }
        output.push_str("}\n");
        output
    }

    fn enum_declaration(&self, decl: &EnumDecl) -> String {
        let e = &decl.enum_name;
        match &decl.kind {
            EnumDeclKind::Flags64 { flags_name } => format!(
                "std::string {e}ToString(const {e} value);\nstd::string {flags_name}ToString({} vkFlags);\n",
                self.flags64_type
            ),
            EnumDeclKind::Value { bit_flags } => {
                let mut output = format!(
                    "template <> std::string ToString<{e}>(const {e}& value, ToStringFlags toStringFlags, uint32_t tabCount, uint32_t tabSize);\n"
                );
                if *bit_flags {
                    output.push_str(&format!(
                        "template <> std::string ToString<{e}>({} vkFlags, ToStringFlags toStringFlags, uint32_t tabCount, uint32_t tabSize);\n",
                        self.flags_type
                    ));
                }
                output
            }
        }
    }

    fn command_declaration(&self, decl: &CommandDecl) -> String {
        let mut params = vec!["const ApiCallInfo& call_info".to_string()];
        if let Some(return_type) = &decl.return_type {
            params.push(format!("{return_type} returnValue"));
        }
        params.extend(decl.params.iter().map(|p| self.param(decl.style, p)));

        format!("void Process_{}({});\n", decl.command, params.join(", "))
    }
}

/// Returns the decoded count of handle storage held by value in a wrapper.
fn handle_count(wrapper: &str, member: &str, count: ElementCount) -> String {
    match count {
        ElementCount::Fixed(n) => n.to_string(),
        ElementCount::Decoded => format!("{wrapper}->{member}.GetLength()"),
        ElementCount::Single => "1".to_string(),
    }
}

/// Returns the decoded count of a struct array held through a pointer.
fn struct_count(wrapper: &str, member: &str, count: ElementCount) -> String {
    match count {
        ElementCount::Fixed(n) => n.to_string(),
        ElementCount::Decoded => format!("{wrapper}->{member}->GetLength()"),
        ElementCount::Single => "1".to_string(),
    }
}

fn live_count(count: &LiveCount) -> String {
    match count {
        LiveCount::Fixed(n) => n.to_string(),
        LiveCount::Field(field) => format!("static_cast<size_t>(handle_struct->{field})"),
        LiveCount::Single => "1".to_string(),
    }
}

/// Wraps a call returning bool so that failure propagates out of the routine.
fn fail_unless(condition: String) -> Vec<String> {
    vec![
        format!("if (!{condition})"),
        "{".to_string(),
        format!("{INDENT}return false;"),
        "}".to_string(),
    ]
}

fn guarded_call(pointer: &str, call: String) -> Vec<String> {
    vec![
        format!("if ({pointer})"),
        "{".to_string(),
        format!("{INDENT}{call}"),
        "}".to_string(),
    ]
}

fn indent_lines(lines: &[String], depth: usize) -> String {
    let prefix = INDENT.repeat(depth);
    lines
        .iter()
        .map(|line| format!("{prefix}{line}\n"))
        .collect()
}
