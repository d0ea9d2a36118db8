//! Instruction handlers
//!
//! One arm per opcode. Handlers read every source operand first, check
//! types, and only then write the destination, so a failing instruction
//! leaves no trace.

use super::{Flow, Vm};
use crate::bytecode::{Arg, Instruction, Opcode, VarRef};
use crate::exit_codes::MAX_PROGRAM_EXIT;
use crate::io;
use crate::value::{RuntimeError, Value, ValueType};
use std::cmp::Ordering;
use std::io::BufRead;

fn malformed(msg: impl Into<String>) -> RuntimeError {
    RuntimeError::Malformed { msg: msg.into() }
}

fn type_error(msg: impl Into<String>) -> RuntimeError {
    RuntimeError::TypeIncompatible { msg: msg.into() }
}

fn string_error(msg: impl Into<String>) -> RuntimeError {
    RuntimeError::StringManipulation { msg: msg.into() }
}

fn overflow(opcode: Opcode) -> RuntimeError {
    RuntimeError::InvalidOperand {
        msg: format!("integer overflow in {}", opcode),
    }
}

fn arg(instr: &Instruction, index: usize) -> Result<&Arg, RuntimeError> {
    instr
        .args
        .get(index)
        .ok_or_else(|| malformed(format!("missing operand {}", index + 1)))
}

fn label(instr: &Instruction, index: usize) -> Result<&str, RuntimeError> {
    match arg(instr, index)? {
        Arg::Label(name) => Ok(name),
        other => Err(malformed(format!("expected label, found {}", other))),
    }
}

fn expect_int(value: Value, what: &str) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(n),
        other => Err(type_error(format!(
            "{} must be int, found {}",
            what,
            other.type_name()
        ))),
    }
}

fn expect_str(value: Value, what: &str) -> Result<String, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(type_error(format!(
            "{} must be string, found {}",
            what,
            other.type_name()
        ))),
    }
}

fn expect_bool(value: Value, what: &str) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(type_error(format!(
            "{} must be bool, found {}",
            what,
            other.type_name()
        ))),
    }
}

/// Integer division rounding toward negative infinity
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Character at a codepoint index
fn char_at(s: &str, index: i64) -> Result<char, RuntimeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .ok_or_else(|| {
            string_error(format!(
                "index {} out of range for string of length {}",
                index,
                s.chars().count()
            ))
        })
}

/// Parse one line of `READ` input
fn parse_input(line: &str, ty: ValueType) -> Value {
    match ty {
        ValueType::Int => line.trim().parse().map_or(Value::Nil, Value::Int),
        ValueType::Str => Value::Str(line.to_string()),
        ValueType::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        ValueType::Nil => Value::Nil,
    }
}

impl Vm {
    /// Destination variable; must exist but may be uninitialized
    fn target<'i>(&self, instr: &'i Instruction) -> Result<&'i VarRef, RuntimeError> {
        match arg(instr, 0)? {
            Arg::Var(var) => {
                self.frames.get(var)?;
                Ok(var)
            }
            other => Err(malformed(format!("expected variable, found {}", other))),
        }
    }

    /// Resolve a symbol; variables must be initialized
    fn symb(&self, instr: &Instruction, index: usize) -> Result<Value, RuntimeError> {
        match arg(instr, index)? {
            Arg::Var(var) => {
                let value = self.frames.get(var)?;
                if !value.is_initialized() {
                    return Err(RuntimeError::MissingValue {
                        msg: format!("variable {} is not initialized", var),
                    });
                }
                Ok(value.clone())
            }
            Arg::Literal(value) => Ok(value.clone()),
            other => Err(malformed(format!("expected symbol, found {}", other))),
        }
    }

    /// Resolve a symbol without requiring initialization
    fn symb_raw(&self, instr: &Instruction, index: usize) -> Result<Value, RuntimeError> {
        match arg(instr, index)? {
            Arg::Var(var) => Ok(self.frames.get(var)?.clone()),
            Arg::Literal(value) => Ok(value.clone()),
            other => Err(malformed(format!("expected symbol, found {}", other))),
        }
    }

    /// Both source operands of a three-address instruction, resolved
    /// before any of them is type checked
    fn operands(&self, instr: &Instruction) -> Result<(Value, Value), RuntimeError> {
        Ok((self.symb(instr, 1)?, self.symb(instr, 2)?))
    }

    fn store(&mut self, var: &VarRef, value: Value) -> Result<Flow, RuntimeError> {
        self.frames.set(var, value)?;
        Ok(Flow::Continue)
    }

    fn jump_to(&mut self, name: &str) -> Result<Flow, RuntimeError> {
        self.pc = self.labels.resolve(name)?;
        Ok(Flow::Continue)
    }

    pub(super) fn execute(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        match instr.opcode {
            // ===== Frames and calls =====
            Opcode::Move => {
                let dest = self.target(instr)?;
                let value = match arg(instr, 1)? {
                    Arg::Literal(Value::Uninit) => Value::string(""),
                    _ => self.symb(instr, 1)?,
                };
                self.store(dest, value)
            }
            Opcode::CreateFrame => {
                self.frames.create_temp();
                Ok(Flow::Continue)
            }
            Opcode::PushFrame => {
                self.frames.push_temp()?;
                Ok(Flow::Continue)
            }
            Opcode::PopFrame => {
                self.frames.pop_local()?;
                Ok(Flow::Continue)
            }
            Opcode::DefVar => match arg(instr, 0)? {
                Arg::Var(var) => {
                    self.frames.define(var)?;
                    Ok(Flow::Continue)
                }
                other => Err(malformed(format!("expected variable, found {}", other))),
            },
            Opcode::Call => {
                let target = self.labels.resolve(label(instr, 0)?)?;
                self.call_stack.push(self.pc);
                self.pc = target;
                Ok(Flow::Continue)
            }
            Opcode::Return => {
                self.pc = self.call_stack.pop().ok_or_else(|| RuntimeError::MissingValue {
                    msg: "RETURN with an empty call stack".to_string(),
                })?;
                Ok(Flow::Continue)
            }

            // ===== Data stack =====
            Opcode::PushS => {
                let value = self.symb(instr, 0)?;
                self.data_stack.push(value);
                Ok(Flow::Continue)
            }
            Opcode::PopS => {
                let dest = self.target(instr)?;
                let value = self.data_stack.pop().ok_or_else(|| RuntimeError::MissingValue {
                    msg: "data stack is empty".to_string(),
                })?;
                self.store(dest, value)
            }

            // ===== Arithmetic =====
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::IDiv => {
                let dest = self.target(instr)?;
                let (a, b) = self.operands(instr)?;
                let a = expect_int(a, "left operand")?;
                let b = expect_int(b, "right operand")?;
                let result = match instr.opcode {
                    Opcode::Add => a.checked_add(b),
                    Opcode::Sub => a.checked_sub(b),
                    Opcode::Mul => a.checked_mul(b),
                    _ => {
                        if b == 0 {
                            return Err(RuntimeError::InvalidOperand {
                                msg: "division by zero".to_string(),
                            });
                        }
                        floor_div(a, b)
                    }
                }
                .ok_or_else(|| overflow(instr.opcode))?;
                self.store(dest, Value::Int(result))
            }

            // ===== Relational =====
            Opcode::Lt | Opcode::Gt => {
                let dest = self.target(instr)?;
                let (a, b) = self.operands(instr)?;
                let wanted = if instr.opcode == Opcode::Lt {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
                let result = a.compare(&b)? == wanted;
                self.store(dest, Value::Bool(result))
            }
            Opcode::Eq => {
                let dest = self.target(instr)?;
                let (a, b) = self.operands(instr)?;
                let result = a.equals(&b)?;
                self.store(dest, Value::Bool(result))
            }

            // ===== Logical =====
            Opcode::And | Opcode::Or => {
                let dest = self.target(instr)?;
                let (a, b) = self.operands(instr)?;
                let a = expect_bool(a, "left operand")?;
                let b = expect_bool(b, "right operand")?;
                let result = if instr.opcode == Opcode::And {
                    a && b
                } else {
                    a || b
                };
                self.store(dest, Value::Bool(result))
            }
            Opcode::Not => {
                let dest = self.target(instr)?;
                let a = expect_bool(self.symb(instr, 1)?, "operand")?;
                self.store(dest, Value::Bool(!a))
            }

            // ===== Conversions =====
            Opcode::Int2Char => {
                let dest = self.target(instr)?;
                let code = expect_int(self.symb(instr, 1)?, "codepoint")?;
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| string_error(format!("{} is not a valid codepoint", code)))?;
                self.store(dest, Value::Str(c.to_string()))
            }
            Opcode::Stri2Int => {
                let dest = self.target(instr)?;
                let (s, index) = self.operands(instr)?;
                let s = expect_str(s, "string operand")?;
                let index = expect_int(index, "index")?;
                let c = char_at(&s, index)?;
                self.store(dest, Value::Int(i64::from(u32::from(c))))
            }

            // ===== Input / output =====
            Opcode::Read => {
                let dest = self.target(instr)?;
                let ty = match arg(instr, 1)? {
                    Arg::Type(ty) => *ty,
                    other => return Err(malformed(format!("expected type, found {}", other))),
                };
                let mut line = String::new();
                let value = if self.input.read_line(&mut line)? == 0 {
                    Value::Nil
                } else {
                    let text = line.strip_suffix('\n').unwrap_or(line.as_str());
                    let text = text.strip_suffix('\r').unwrap_or(text);
                    parse_input(text, ty)
                };
                self.store(dest, value)
            }
            Opcode::Write => {
                let value = self.symb(instr, 0)?;
                io::emit(&self.output, &value.to_string())?;
                Ok(Flow::Continue)
            }

            // ===== Strings =====
            Opcode::Concat => {
                let dest = self.target(instr)?;
                let (a, b) = self.operands(instr)?;
                let mut a = expect_str(a, "left operand")?;
                let b = expect_str(b, "right operand")?;
                a.push_str(&b);
                self.store(dest, Value::Str(a))
            }
            Opcode::StrLen => {
                let dest = self.target(instr)?;
                let s = expect_str(self.symb(instr, 1)?, "operand")?;
                let len = i64::try_from(s.chars().count()).map_err(|_| overflow(instr.opcode))?;
                self.store(dest, Value::Int(len))
            }
            Opcode::GetChar => {
                let dest = self.target(instr)?;
                let (s, index) = self.operands(instr)?;
                let s = expect_str(s, "string operand")?;
                let index = expect_int(index, "index")?;
                let c = char_at(&s, index)?;
                self.store(dest, Value::Str(c.to_string()))
            }
            Opcode::SetChar => {
                let dest = self.target(instr)?;
                let (index, replacement) = self.operands(instr)?;
                let index = expect_int(index, "index")?;
                let replacement = expect_str(replacement, "replacement")?;
                let current = match self.frames.get(dest)? {
                    Value::Uninit => {
                        return Err(RuntimeError::MissingValue {
                            msg: format!("variable {} is not initialized", dest),
                        })
                    }
                    other => expect_str(other.clone(), "destination")?,
                };
                let Some(new_char) = replacement.chars().next() else {
                    return Err(string_error("replacement string is empty"));
                };
                char_at(&current, index)?;
                let updated: String = current
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if i as i64 == index { new_char } else { c })
                    .collect();
                self.store(dest, Value::Str(updated))
            }

            // ===== Types =====
            Opcode::Type => {
                let dest = self.target(instr)?;
                let name = self.symb_raw(instr, 1)?.type_name();
                self.store(dest, Value::string(name))
            }

            // ===== Control flow =====
            Opcode::Label => Ok(Flow::Continue),
            Opcode::Jump => self.jump_to(label(instr, 0)?),
            Opcode::JumpIfEq | Opcode::JumpIfNeq => {
                let target = self.labels.resolve(label(instr, 0)?)?;
                let (a, b) = self.operands(instr)?;
                let equal = a.equals(&b)?;
                if equal == (instr.opcode == Opcode::JumpIfEq) {
                    self.pc = target;
                }
                Ok(Flow::Continue)
            }
            Opcode::Exit => {
                let code = expect_int(self.symb(instr, 0)?, "exit code")?;
                match u8::try_from(code) {
                    Ok(code) if i64::from(code) <= MAX_PROGRAM_EXIT => Ok(Flow::Exit(code)),
                    _ => Err(RuntimeError::InvalidOperand {
                        msg: format!("exit code {} is outside 0..={}", code, MAX_PROGRAM_EXIT),
                    }),
                }
            }

            // ===== Debugging =====
            Opcode::DPrint => {
                let value = self.symb(instr, 0)?;
                io::emit(
                    &self.diagnostics,
                    &format!("{}\n", value),
                )?;
                Ok(Flow::Continue)
            }
            Opcode::Break => {
                let report = self.break_report(instr);
                io::emit(&self.diagnostics, &report)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Interpreter state written by `BREAK`
    fn break_report(&self, instr: &Instruction) -> String {
        format!(
            "BREAK at order {} after {} executed instruction(s)\n  \
             frame stack depth: {}, temporary frame: {}\n  \
             call stack depth: {}, data stack depth: {}\n{}",
            instr.order,
            self.executed,
            self.frames.depth(),
            if self.frames.has_temp() { "yes" } else { "no" },
            self.call_stack.len(),
            self.data_stack.len(),
            self.frames.dump()
        )
    }
}
