//! XML interchange format
//!
//! ```xml
//! <program language="IPPcode22">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hello\032world</arg1>
//!   </instruction>
//! </program>
//! ```
//!
//! [`load_xml`] decodes literals (integers, booleans, `\ddd` string
//! escapes, variable references) so the VM only ever sees typed arguments.
//! [`to_xml`] produces the same format from a [`Program`].

use crate::bytecode::{literal, Arg, Instruction, LoadError, Opcode, Program, VarRef};
use crate::value::{Value, ValueType};
use roxmltree::{Document, Node};
use std::fmt::Write;
use tracing::debug;

const LANGUAGE: &str = "IPPcode22";

fn structure(msg: impl Into<String>) -> LoadError {
    LoadError::Structure(msg.into())
}

/// Parse and validate an XML program
pub fn load_xml(source: &str) -> Result<Program, LoadError> {
    let doc = Document::parse(source).map_err(|e| LoadError::MalformedXml(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "program" {
        return Err(structure(format!(
            "root element must be <program>, found <{}>",
            root.tag_name().name()
        )));
    }
    match root.attribute("language") {
        Some(lang) if lang.eq_ignore_ascii_case(LANGUAGE) => {}
        Some(lang) => return Err(structure(format!("unsupported language '{}'", lang))),
        None => return Err(structure("missing language attribute")),
    }

    let mut instructions = Vec::new();
    for node in root.children() {
        if node.is_element() {
            instructions.push(parse_instruction(node)?);
        } else if node.is_text() && !node.text().unwrap_or("").trim().is_empty() {
            return Err(structure("unexpected text inside <program>"));
        }
    }

    debug!(instructions = instructions.len(), "loaded XML program");
    Program::new(instructions)
}

fn parse_instruction(node: Node<'_, '_>) -> Result<Instruction, LoadError> {
    if node.tag_name().name() != "instruction" {
        return Err(structure(format!(
            "expected <instruction>, found <{}>",
            node.tag_name().name()
        )));
    }

    let order_text = node
        .attribute("order")
        .ok_or_else(|| structure("instruction without order"))?;
    let order: u32 = order_text
        .trim()
        .parse()
        .map_err(|_| structure(format!("invalid order '{}'", order_text)))?;

    let opcode: Opcode = node
        .attribute("opcode")
        .ok_or_else(|| structure(format!("instruction {} without opcode", order)))?
        .trim()
        .parse()
        .map_err(|e| structure(format!("instruction {}: {}", order, e)))?;

    let mut slots: [Option<Arg>; 3] = [None, None, None];
    for child in node.children() {
        if child.is_text() {
            if !child.text().unwrap_or("").trim().is_empty() {
                return Err(structure(format!(
                    "instruction {}: unexpected text",
                    order
                )));
            }
            continue;
        }
        if !child.is_element() {
            continue;
        }
        let slot = match child.tag_name().name() {
            "arg1" => 0,
            "arg2" => 1,
            "arg3" => 2,
            other => {
                return Err(structure(format!(
                    "instruction {}: unexpected element <{}>",
                    order, other
                )))
            }
        };
        if slots[slot].is_some() {
            return Err(structure(format!(
                "instruction {}: duplicate <arg{}>",
                order,
                slot + 1
            )));
        }
        slots[slot] = Some(parse_arg(child, order)?);
    }

    let mut args = Vec::with_capacity(3);
    let mut gap = false;
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(_) if gap => {
                return Err(structure(format!(
                    "instruction {}: <arg{}> without preceding argument",
                    order,
                    index + 1
                )));
            }
            Some(arg) => args.push(arg),
            None => gap = true,
        }
    }

    Ok(Instruction::new(order, opcode, args))
}

fn parse_arg(node: Node<'_, '_>, order: u32) -> Result<Arg, LoadError> {
    let tag = node
        .attribute("type")
        .ok_or_else(|| structure(format!("instruction {}: argument without type", order)))?;
    let raw = node.text().unwrap_or("");
    let text = raw.trim();

    let arg = match tag {
        "int" => literal::parse_int(text).map(|n| Arg::Literal(Value::Int(n))),
        "bool" => match text {
            "true" => Some(Arg::Literal(Value::Bool(true))),
            "false" => Some(Arg::Literal(Value::Bool(false))),
            _ => None,
        },
        "nil" => (text == "nil").then_some(Arg::Literal(Value::Nil)),
        "string" => literal::unescape(raw).map(|s| Arg::Literal(Value::Str(s))),
        "var" => VarRef::parse(text).map(Arg::Var),
        "label" => literal::is_identifier(text).then(|| Arg::Label(text.to_string())),
        "type" => ValueType::from_name(text).map(Arg::Type),
        other => {
            return Err(structure(format!(
                "instruction {}: unknown argument type '{}'",
                order, other
            )))
        }
    };

    arg.ok_or_else(|| {
        structure(format!(
            "instruction {}: invalid {} value '{}'",
            order, tag, raw
        ))
    })
}

/// Render a program in the XML interchange format
pub fn to_xml(program: &Program) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(out, "<program language=\"{}\">", LANGUAGE);
    for instr in program.instructions() {
        if instr.args.is_empty() {
            let _ = writeln!(
                out,
                "  <instruction order=\"{}\" opcode=\"{}\"/>",
                instr.order, instr.opcode
            );
            continue;
        }
        let _ = writeln!(
            out,
            "  <instruction order=\"{}\" opcode=\"{}\">",
            instr.order, instr.opcode
        );
        for (index, arg) in instr.args.iter().enumerate() {
            let _ = writeln!(
                out,
                "    <arg{n} type=\"{}\">{}</arg{n}>",
                arg.tag(),
                escape_markup(&arg_text(arg)),
                n = index + 1
            );
        }
        out.push_str("  </instruction>\n");
    }
    out.push_str("</program>\n");
    out
}

fn arg_text(arg: &Arg) -> String {
    match arg {
        Arg::Var(var) => var.to_string(),
        Arg::Literal(Value::Str(s)) => literal::escape(s),
        Arg::Literal(Value::Nil) => "nil".to_string(),
        Arg::Literal(other) => other.to_string(),
        Arg::Label(name) => name.clone(),
        Arg::Type(ty) => ty.name().to_string(),
    }
}

fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}
