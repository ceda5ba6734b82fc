//! Schema description parser.
//!
//! This module reads the XML schema description handed over by the registry
//! front-end into the [`Schema`] definitions. The document looks like:
//!
//! ```xml
//! <registry name="vulkan">
//!     <types>
//!         <type name="VkBuffer" category="handle"/>
//!         <enum name="VkFormat"/>
//!         <struct name="VkBufferViewCreateInfo" tag="VK_STRUCTURE_TYPE_BUFFER_VIEW_CREATE_INFO">
//!             <member name="pNext" type="void" cardinality="pointer" chain="true"/>
//!             <member name="buffer" type="VkBuffer"/>
//!         </struct>
//!     </types>
//!     <commands>
//!         <command name="vkCreateBufferView" return="VkResult">
//!             <param name="pView" type="VkBufferView" cardinality="pointer"/>
//!         </command>
//!     </commands>
//! </registry>
//! ```

use crate::error::ParseError;
use crate::types::{
    Cardinality, CommandDef, EnumDef, HandleDef, MemberDef, ScalarDef, Schema, StructDef,
    TypeCategory, TypeDef,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parses a schema description from a string.
///
/// # Arguments
/// * `xml` - XML schema description
///
/// # Returns
/// Parsed schema or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or contains invalid schema elements.
pub fn parse_schema(xml: &str) -> Result<Schema, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut schema: Option<Schema> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "registry" => {
                        schema = Some(parse_registry(e)?);
                    }
                    "types" => {
                        if let Some(schema) = schema.as_mut() {
                            parse_types(&mut reader, schema)?;
                        }
                    }
                    "commands" => {
                        if let Some(schema) = schema.as_mut() {
                            parse_commands(&mut reader, schema)?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"registry" {
                    schema = Some(parse_registry(e)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    schema.ok_or_else(|| ParseError::InvalidStructure {
        message: "No registry element found".to_string(),
    })
}

/// Parses a schema description from a file.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn parse_schema_file(path: &std::path::Path) -> Result<Schema, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_schema(&xml)
}

/// Parses the registry element attributes.
fn parse_registry(e: &BytesStart<'_>) -> Result<Schema, ParseError> {
    let mut name = String::new();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        if key == "name" {
            name = value.to_string();
        }
    }

    Ok(Schema::new(name))
}

/// Adds a type definition, rejecting redefinitions.
fn add_unique_type(schema: &mut Schema, type_def: TypeDef) -> Result<(), ParseError> {
    if schema.has_type(type_def.name()) {
        return Err(ParseError::duplicate("type", type_def.name()));
    }
    schema.add_type(type_def);
    Ok(())
}

/// Parses the types section.
fn parse_types(reader: &mut Reader<&[u8]>, schema: &mut Schema) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "struct" => {
                        let struct_def = parse_struct(reader, e)?;
                        add_unique_type(schema, TypeDef::Struct(struct_def))?;
                        depth -= 1; // parse_struct consumes the end tag
                    }
                    "type" => {
                        let type_def = parse_type(e)?;
                        add_unique_type(schema, type_def)?;
                    }
                    "enum" => {
                        let enum_def = parse_enum(e)?;
                        add_unique_type(schema, TypeDef::Enum(enum_def))?;
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "type" => add_unique_type(schema, parse_type(e)?)?,
                    "enum" => add_unique_type(schema, TypeDef::Enum(parse_enum(e)?))?,
                    "struct" => {
                        add_unique_type(schema, TypeDef::Struct(parse_struct_header(e)?))?
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parses a `type` element into a scalar or handle definition.
fn parse_type(e: &BytesStart<'_>) -> Result<TypeDef, ParseError> {
    let mut name = None;
    let mut category = TypeCategory::Scalar;
    let mut alias = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "category" => {
                category = TypeCategory::parse(value)
                    .ok_or_else(|| ParseError::invalid_attr("type", "category", value))?
            }
            "alias" => alias = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("type", "name"))?;

    match category {
        TypeCategory::Scalar => Ok(TypeDef::Scalar(ScalarDef { name })),
        TypeCategory::Handle => Ok(TypeDef::Handle(HandleDef { name, alias })),
        TypeCategory::Enum => Ok(TypeDef::Enum(EnumDef {
            name,
            bit_width: 32,
            alias,
        })),
        TypeCategory::Struct => Err(ParseError::invalid_attr("type", "category", "struct")),
    }
}

/// Parses an `enum` element.
fn parse_enum(e: &BytesStart<'_>) -> Result<EnumDef, ParseError> {
    let mut name = None;
    let mut bit_width: u8 = 32;
    let mut alias = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "bitwidth" => {
                bit_width = match value {
                    "32" => 32,
                    "64" => 64,
                    _ => return Err(ParseError::invalid_attr("enum", "bitwidth", value)),
                }
            }
            "alias" => alias = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("enum", "name"))?;
    let mut enum_def = EnumDef::new(name);
    enum_def.bit_width = bit_width;
    enum_def.alias = alias;

    Ok(enum_def)
}

/// Parses the attributes of a `struct` element.
fn parse_struct_header(e: &BytesStart<'_>) -> Result<StructDef, ParseError> {
    let mut name = None;
    let mut type_tag = None;
    let mut alias = None;
    let mut struct_extends = Vec::new();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "tag" => type_tag = Some(value.to_string()),
            "alias" => alias = Some(value.to_string()),
            "structextends" => {
                struct_extends = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("struct", "name"))?;
    let mut struct_def = StructDef::new(name);
    struct_def.type_tag = type_tag;
    struct_def.alias = alias;
    struct_def.struct_extends = struct_extends;

    Ok(struct_def)
}

/// Parses a `struct` element and its members.
fn parse_struct(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<StructDef, ParseError> {
    let mut struct_def = parse_struct_header(e)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"member" {
                    struct_def.add_member(parse_member(e, "member")?);
                }
            }
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"member" {
                    struct_def.add_member(parse_member(e, "member")?);
                }
                skip_to_end(reader)?;
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(struct_def)
}

/// Parses a `member` or `param` element.
fn parse_member(e: &BytesStart<'_>, element: &str) -> Result<MemberDef, ParseError> {
    let mut name = None;
    let mut type_name = None;
    let mut cardinality = None;
    let mut fixed_length: Option<usize> = None;
    let mut length_field = None;
    let mut is_const = false;
    let mut chain_head = false;
    let mut generic_discriminant = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "type" => type_name = Some(value.to_string()),
            "cardinality" => cardinality = Some(value.to_string()),
            "length" => {
                fixed_length = Some(
                    value
                        .parse()
                        .map_err(|_| ParseError::invalid_attr(element, "length", value))?,
                )
            }
            "len" => length_field = Some(value.to_string()),
            "const" => is_const = parse_bool(element, "const", value)?,
            "chain" => chain_head = parse_bool(element, "chain", value)?,
            "generic" => generic_discriminant = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr(element, "name"))?;
    let type_name = type_name.ok_or_else(|| ParseError::missing_attr(element, "type"))?;

    let cardinality = match (cardinality.as_deref(), fixed_length, &length_field) {
        (Some("fixed") | None, Some(n), _) => Cardinality::FixedArray(n),
        (Some("fixed"), None, _) => return Err(ParseError::missing_attr(element, "length")),
        // A static length only applies to fixed arrays.
        (Some("dynamic" | "pointer" | "scalar"), Some(n), _) => {
            return Err(ParseError::invalid_attr(element, "length", n.to_string()));
        }
        (Some("dynamic"), None, _) => Cardinality::DynamicArray,
        // A pointer paired with a length sibling is a dynamic array.
        (Some("pointer"), None, Some(_)) => Cardinality::DynamicArray,
        (Some("pointer"), None, None) => Cardinality::Pointer,
        (Some("scalar") | None, None, _) => Cardinality::Scalar,
        (Some(other), _, _) => {
            return Err(ParseError::invalid_attr(element, "cardinality", other));
        }
    };

    Ok(MemberDef {
        name,
        type_name,
        cardinality,
        length_field,
        is_const,
        chain_head,
        generic_discriminant,
    })
}

/// Parses a boolean attribute value.
fn parse_bool(element: &str, attribute: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParseError::invalid_attr(element, attribute, value)),
    }
}

/// Parses the commands section.
fn parse_commands(reader: &mut Reader<&[u8]>, schema: &mut Schema) -> Result<(), ParseError> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"command" {
                    let command = parse_command(reader, e)?;
                    if schema.commands.iter().any(|c| c.name == command.name) {
                        return Err(ParseError::duplicate("command", command.name));
                    }
                    schema.add_command(command);
                } else {
                    skip_to_end(reader)?;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"command" {
                    let command = parse_command_header(e)?;
                    if schema.commands.iter().any(|c| c.name == command.name) {
                        return Err(ParseError::duplicate("command", command.name));
                    }
                    schema.add_command(command);
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parses the attributes of a `command` element.
fn parse_command_header(e: &BytesStart<'_>) -> Result<CommandDef, ParseError> {
    let mut name = None;
    let mut return_type = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "return" => return_type = Some(value.to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("command", "name"))?;
    let mut command = CommandDef::new(name);
    if let Some(return_type) = return_type {
        command.return_type = return_type;
    }

    Ok(command)
}

/// Parses a `command` element and its parameters.
fn parse_command(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
) -> Result<CommandDef, ParseError> {
    let mut command = parse_command_header(e)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"param" {
                    command.add_param(parse_member(e, "param")?);
                }
            }
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"param" {
                    command.add_param(parse_member(e, "param")?);
                }
                skip_to_end(reader)?;
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(command)
}

/// Skips to the end of the current element.
fn skip_to_end(reader: &mut Reader<&[u8]>) -> Result<(), ParseError> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
