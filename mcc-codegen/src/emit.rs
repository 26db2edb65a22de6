//! Assembly printer
//!
//! Serializes a lowered program: the data section, the entry trampoline,
//! the program text and the runtime block. Labels are checked before any
//! text is produced so a broken program never reaches the output.

use crate::asm::{AsmInst, ImmOp, Reg};
use crate::data::DataItem;
use crate::runtime::{runtime_labels, runtime_support};
use log::debug;
use std::collections::BTreeSet;
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(String),

    #[error("branch to undefined label '{0}'")]
    UndefinedLabel(String),

    #[error("empty label")]
    EmptyLabel,
}

/// Entry point symbol
pub const ENTRY: &str = "__start";

/// A lowered program ready to print
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsmProgram {
    pub data: Vec<DataItem>,
    pub text: Vec<AsmInst>,
}

impl AsmProgram {
    pub fn new(data: Vec<DataItem>, text: Vec<AsmInst>) -> Self {
        Self { data, text }
    }

    /// Every label must be defined exactly once and every branch must land
    /// on a label of the program, the data section or the runtime block
    pub fn check_labels(&self) -> Result<(), EmitError> {
        let mut defined = BTreeSet::new();
        defined.insert(ENTRY.to_string());
        for label in runtime_labels() {
            defined.insert(label.to_string());
        }

        let own = self
            .data
            .iter()
            .map(|item| item.label.as_str())
            .chain(self.text.iter().filter_map(|inst| match inst {
                AsmInst::Label(label) => Some(label.as_str()),
                _ => None,
            }));
        for label in own {
            if label.is_empty() {
                return Err(EmitError::EmptyLabel);
            }
            if !defined.insert(label.to_string()) {
                return Err(EmitError::DuplicateLabel(label.to_string()));
            }
        }

        for inst in &self.text {
            if let Some(target) = inst.branch_target() {
                if !defined.contains(target) {
                    return Err(EmitError::UndefinedLabel(target.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Entry trampoline: call `main`, then exit
fn trampoline() -> Vec<AsmInst> {
    vec![
        AsmInst::Label(ENTRY.to_string()),
        AsmInst::Jal("main".to_string()),
        AsmInst::Li(Reg::V0, 10),
        AsmInst::Syscall,
    ]
}

fn write_inst(out: &mut String, inst: &AsmInst) {
    // writing to a String cannot fail
    let _ = match inst {
        AsmInst::Label(_) => writeln!(out, "{inst}"),
        _ => writeln!(out, "\t{inst}"),
    };
}

/// Print a whole program
pub fn emit_program(program: &AsmProgram) -> Result<String, EmitError> {
    program.check_labels()?;

    let mut out = String::new();
    out.push_str(".data\n");
    for item in &program.data {
        let _ = writeln!(out, "{item}");
    }

    out.push_str("\t.text\n");
    let _ = writeln!(out, "\t.globl {ENTRY}");
    for inst in trampoline().iter().chain(program.text.iter()) {
        write_inst(&mut out, inst);
    }
    out.push_str(runtime_support());

    debug!(
        "emitted {} data item(s) and {} instruction(s)",
        program.data.len(),
        program.text.len()
    );
    Ok(out)
}

/// Print instructions alone, one per line
pub fn emit_instructions(instructions: &[AsmInst]) -> String {
    let mut out = String::new();
    for inst in instructions {
        write_inst(&mut out, inst);
    }
    out
}

/// Adjust the stack pointer by `bytes`; nothing for zero
pub fn adjust_stack(bytes: i32) -> Option<AsmInst> {
    (bytes != 0).then_some(AsmInst::OpImm(ImmOp::Addiu, Reg::Sp, Reg::Sp, bytes))
}
