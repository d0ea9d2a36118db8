//! Variable frames
//!
//! The frame stack always holds the global frame at index 0. A local frame
//! exists only once something has been pushed above it. At most one
//! temporary frame is pending at a time.
//!
//! ```text
//! frame stack          pending
//! [GF][LF₁][LF₂]       TF?
//!  ^         ^
//!  global    current LF
//! ```

use crate::bytecode::{FrameRole, VarRef};
use crate::value::{RuntimeError, Value};
use std::collections::HashMap;
use std::fmt::Write;

/// One scope level: variable name to value
pub type Frame = HashMap<String, Value>;

#[derive(Debug, Clone)]
pub struct FrameStore {
    stack: Vec<Frame>,
    temp: Option<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::new()],
            temp: None,
        }
    }

    fn frame(&self, role: FrameRole) -> Result<&Frame, RuntimeError> {
        let frame = match role {
            FrameRole::Global => self.stack.first(),
            FrameRole::Local => self.stack.last().filter(|_| self.stack.len() > 1),
            FrameRole::Temporary => self.temp.as_ref(),
        };
        frame.ok_or(RuntimeError::FrameNonexistent { frame: role })
    }

    fn frame_mut(&mut self, role: FrameRole) -> Result<&mut Frame, RuntimeError> {
        let depth = self.stack.len();
        let frame = match role {
            FrameRole::Global => self.stack.first_mut(),
            FrameRole::Local => self.stack.last_mut().filter(|_| depth > 1),
            FrameRole::Temporary => self.temp.as_mut(),
        };
        frame.ok_or(RuntimeError::FrameNonexistent { frame: role })
    }

    /// Create an uninitialized variable
    pub fn define(&mut self, var: &VarRef) -> Result<(), RuntimeError> {
        let frame = self.frame_mut(var.frame)?;
        if frame.contains_key(&var.name) {
            return Err(RuntimeError::Semantics {
                msg: format!("variable {} is already defined", var),
            });
        }
        frame.insert(var.name.clone(), Value::Uninit);
        Ok(())
    }

    pub fn get(&self, var: &VarRef) -> Result<&Value, RuntimeError> {
        self.frame(var.frame)?
            .get(&var.name)
            .ok_or_else(|| undefined(var))
    }

    pub fn get_mut(&mut self, var: &VarRef) -> Result<&mut Value, RuntimeError> {
        self.frame_mut(var.frame)?
            .get_mut(&var.name)
            .ok_or_else(|| undefined(var))
    }

    pub fn set(&mut self, var: &VarRef, value: Value) -> Result<(), RuntimeError> {
        *self.get_mut(var)? = value;
        Ok(())
    }

    /// Start a fresh temporary frame, discarding any pending one
    pub fn create_temp(&mut self) {
        self.temp = Some(Frame::new());
    }

    /// Move the pending temporary frame onto the stack as the new LF
    pub fn push_temp(&mut self) -> Result<(), RuntimeError> {
        let frame = self.temp.take().ok_or(RuntimeError::FrameNonexistent {
            frame: FrameRole::Temporary,
        })?;
        self.stack.push(frame);
        Ok(())
    }

    /// Move the current LF into the temporary slot
    pub fn pop_local(&mut self) -> Result<(), RuntimeError> {
        if self.stack.len() <= 1 {
            return Err(RuntimeError::FrameNonexistent {
                frame: FrameRole::Local,
            });
        }
        self.temp = self.stack.pop();
        Ok(())
    }

    /// Frame stack depth, global frame included
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn has_temp(&self) -> bool {
        self.temp.is_some()
    }

    /// Initialized variables across every frame, pending TF included
    pub fn initialized_count(&self) -> usize {
        self.stack
            .iter()
            .chain(self.temp.iter())
            .flat_map(|frame| frame.values())
            .filter(|value| value.is_initialized())
            .count()
    }

    /// Human-readable listing of every frame, names sorted
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (depth, frame) in self.stack.iter().enumerate() {
            let label = if depth == 0 {
                "GF".to_string()
            } else {
                format!("LF[{}]", depth)
            };
            let _ = writeln!(out, "  {}: {}", label, render_frame(frame));
        }
        match &self.temp {
            Some(frame) => {
                let _ = writeln!(out, "  TF: {}", render_frame(frame));
            }
            None => out.push_str("  TF: <none>\n"),
        }
        out
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined(var: &VarRef) -> RuntimeError {
    RuntimeError::UndefinedVariable {
        name: var.to_string(),
    }
}

fn render_frame(frame: &Frame) -> String {
    if frame.is_empty() {
        return "{}".to_string();
    }
    let mut names: Vec<&String> = frame.keys().collect();
    names.sort();
    let entries: Vec<String> = names
        .into_iter()
        .map(|name| format!("{}={}", name, frame[name].literal()))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(frame: FrameRole, name: &str) -> VarRef {
        VarRef::new(frame, name)
    }

    #[test]
    fn test_define_and_set() {
        let mut frames = FrameStore::new();
        let x = var(FrameRole::Global, "x");
        frames.define(&x).unwrap();
        assert_eq!(frames.get(&x), Ok(&Value::Uninit));
        frames.set(&x, Value::Int(3)).unwrap();
        assert_eq!(frames.get(&x), Ok(&Value::Int(3)));
    }

    #[test]
    fn test_redefinition_is_semantic_error() {
        let mut frames = FrameStore::new();
        let x = var(FrameRole::Global, "x");
        frames.define(&x).unwrap();
        assert_eq!(frames.define(&x).unwrap_err().exit_code(), 52);
    }

    #[test]
    fn test_missing_frames() {
        let mut frames = FrameStore::new();
        let err = frames.define(&var(FrameRole::Local, "x")).unwrap_err();
        assert_eq!(err.exit_code(), 55);
        let err = frames.get(&var(FrameRole::Temporary, "x")).unwrap_err();
        assert_eq!(err.exit_code(), 55);
        assert_eq!(frames.push_temp().unwrap_err().exit_code(), 55);
        assert_eq!(frames.pop_local().unwrap_err().exit_code(), 55);
    }

    #[test]
    fn test_undefined_variable() {
        let frames = FrameStore::new();
        let err = frames.get(&var(FrameRole::Global, "nope")).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UndefinedVariable {
                name: "GF@nope".into()
            }
        );
    }

    #[test]
    fn test_temp_frame_lifecycle() {
        let mut frames = FrameStore::new();
        frames.create_temp();
        frames.define(&var(FrameRole::Temporary, "a")).unwrap();
        frames.push_temp().unwrap();
        assert!(!frames.has_temp());
        assert_eq!(frames.depth(), 2);
        assert!(frames.get(&var(FrameRole::Local, "a")).is_ok());

        frames.pop_local().unwrap();
        assert_eq!(frames.depth(), 1);
        assert!(frames.get(&var(FrameRole::Temporary, "a")).is_ok());
    }

    #[test]
    fn test_create_temp_discards_pending() {
        let mut frames = FrameStore::new();
        frames.create_temp();
        frames.define(&var(FrameRole::Temporary, "a")).unwrap();
        frames.create_temp();
        assert_eq!(
            frames.get(&var(FrameRole::Temporary, "a")).unwrap_err().exit_code(),
            54
        );
    }

    #[test]
    fn test_initialized_count_and_dump() {
        let mut frames = FrameStore::new();
        let b = var(FrameRole::Global, "b");
        frames.define(&b).unwrap();
        frames.define(&var(FrameRole::Global, "a")).unwrap();
        frames.set(&b, Value::string("hi there")).unwrap();
        assert_eq!(frames.initialized_count(), 1);
        assert_eq!(
            frames.dump(),
            "  GF: { a=<uninitialized>, b=string@hi\\032there }\n  TF: <none>\n"
        );
    }
}
