//! Label pre-pass

use crate::bytecode::{Arg, Opcode, Program};
use crate::value::RuntimeError;
use std::collections::HashMap;
use tracing::debug;

/// Label name to the index of the instruction following its `LABEL`
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    targets: HashMap<String, usize>,
}

impl LabelTable {
    /// Scan the program once; a label defined twice is a semantic error
    pub fn build(program: &Program) -> Result<Self, RuntimeError> {
        let mut targets = HashMap::new();
        for (index, instr) in program.instructions().iter().enumerate() {
            if instr.opcode != Opcode::Label {
                continue;
            }
            let Some(Arg::Label(name)) = instr.args.first() else {
                return Err(RuntimeError::Malformed {
                    msg: "LABEL without a label operand".to_string(),
                }
                .trapped(instr));
            };
            if targets.insert(name.clone(), index + 1).is_some() {
                return Err(RuntimeError::Semantics {
                    msg: format!("label '{}' is defined more than once", name),
                }
                .trapped(instr));
            }
        }
        debug!(labels = targets.len(), "built label table");
        Ok(Self { targets })
    }

    pub fn resolve(&self, name: &str) -> Result<usize, RuntimeError> {
        self.targets
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::Semantics {
                msg: format!("undefined label '{}'", name),
            })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
