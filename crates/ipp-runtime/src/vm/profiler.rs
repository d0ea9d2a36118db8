//! VM profiling and execution statistics
//!
//! The VM owns a profiler only when statistics were requested. It reports
//! every executed instruction and the current number of initialized
//! variables; nothing here touches program output or the exit code.

use crate::bytecode::{Instruction, Opcode};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;

/// VM profiler
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    /// Executed instructions, `LABEL`, `DPRINT` and `BREAK` excluded
    total_instructions: u64,
    instruction_counts: HashMap<Opcode, u64>,
    /// Executions per instruction order
    order_counts: HashMap<u32, u64>,
    max_initialized: usize,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one executed instruction
    pub fn record_instruction(&mut self, instr: &Instruction) {
        if instr.opcode.is_meta() {
            return;
        }
        self.total_instructions += 1;
        *self.instruction_counts.entry(instr.opcode).or_insert(0) += 1;
        *self.order_counts.entry(instr.order).or_insert(0) += 1;
    }

    /// Track the high-water mark of initialized variables
    pub fn update_initialized(&mut self, count: usize) {
        self.max_initialized = self.max_initialized.max(count);
    }

    /// Order of the most executed instruction, lowest order on ties
    pub fn hottest_order(&self) -> Option<u32> {
        self.order_counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(order, _)| *order)
    }

    /// Snapshot of the collected statistics
    pub fn stats(&self) -> Stats {
        let mut opcodes: Vec<OpcodeCount> = self
            .instruction_counts
            .iter()
            .map(|(opcode, count)| OpcodeCount {
                opcode: opcode.mnemonic().to_string(),
                count: *count,
            })
            .collect();
        opcodes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.opcode.cmp(&b.opcode)));

        Stats {
            instructions: self.total_instructions,
            hottest_order: self.hottest_order(),
            max_initialized_vars: self.max_initialized,
            opcodes,
        }
    }
}

/// Serializable execution statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub instructions: u64,
    pub hottest_order: Option<u32>,
    pub max_initialized_vars: usize,
    pub opcodes: Vec<OpcodeCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpcodeCount {
    pub opcode: String,
    pub count: u64,
}

impl Stats {
    pub fn render(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Total instructions executed: {}", self.instructions);
        match self.hottest_order {
            Some(order) => {
                let _ = writeln!(report, "Most executed instruction: order {}", order);
            }
            None => report.push_str("Most executed instruction: none\n"),
        }
        let _ = writeln!(
            report,
            "Max initialized variables: {}",
            self.max_initialized_vars
        );

        if self.opcodes.is_empty() {
            return report;
        }
        report.push_str("\nInstruction counts by opcode:\n");
        for entry in &self.opcodes {
            let percentage = (entry.count as f64 / self.instructions as f64) * 100.0;
            let _ = writeln!(
                report,
                "  {:<12} {:>10} ({:>6.2}%)",
                entry.opcode, entry.count, percentage
            );
        }
        report
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Arg;

    fn instr(order: u32, opcode: Opcode) -> Instruction {
        Instruction::new(order, opcode, vec![])
    }

    #[test]
    fn test_fresh_profiler_is_empty() {
        let stats = Profiler::new().stats();
        assert_eq!(stats.instructions, 0);
        assert_eq!(stats.hottest_order, None);
        assert!(stats.opcodes.is_empty());
        assert!(stats.render().contains("Most executed instruction: none"));
    }

    #[test]
    fn test_meta_instructions_not_counted() {
        let mut profiler = Profiler::new();
        profiler.record_instruction(&Instruction::new(
            1,
            Opcode::Label,
            vec![Arg::Label("l".into())],
        ));
        profiler.record_instruction(&instr(2, Opcode::Break));
        profiler.record_instruction(&instr(3, Opcode::Return));

        let stats = profiler.stats();
        assert_eq!(stats.instructions, 1);
        assert_eq!(
            stats.opcodes,
            vec![OpcodeCount {
                opcode: "RETURN".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_hottest_order_prefers_lowest_on_tie() {
        let mut profiler = Profiler::new();
        for order in [7, 3, 7, 3, 9] {
            profiler.record_instruction(&instr(order, Opcode::PushFrame));
        }
        assert_eq!(profiler.hottest_order(), Some(3));
    }

    #[test]
    fn test_max_initialized_is_high_water_mark() {
        let mut profiler = Profiler::new();
        profiler.update_initialized(2);
        profiler.update_initialized(5);
        profiler.update_initialized(1);
        assert_eq!(profiler.stats().max_initialized_vars, 5);
    }

    #[test]
    fn test_stats_json() {
        let mut profiler = Profiler::new();
        profiler.record_instruction(&instr(1, Opcode::CreateFrame));
        profiler.record_instruction(&instr(2, Opcode::PushFrame));
        profiler.record_instruction(&instr(2, Opcode::PushFrame));
        profiler.update_initialized(1);

        let stats = profiler.stats();
        assert_eq!(stats.opcodes[0].opcode, "PUSHFRAME");
        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        assert_eq!(json["instructions"], 3);
        assert_eq!(json["hottest_order"], 2);
        assert_eq!(json["max_initialized_vars"], 1);
    }

    #[test]
    fn test_render_text() {
        let mut profiler = Profiler::new();
        profiler.record_instruction(&instr(4, Opcode::PopFrame));
        let report = profiler.stats().render();
        assert!(report.starts_with("Total instructions executed: 1\n"));
        assert!(report.contains("Most executed instruction: order 4"));
        assert!(report.contains("POPFRAME"));
    }
}
