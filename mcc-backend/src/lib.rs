//! MIPS C Compiler - Backend
//!
//! Lowers a three-address program to MIPS32 assembly:
//!
//! - `leaders` - basic-block leaders and their labels
//! - `layout` - frame homes of the variables of a function
//! - `regmgmt` - register and address descriptors, the register pools
//! - `templates` - instruction selection table
//! - `globals` - the data section
//! - `lower` - the lowering pass

pub mod error;
pub mod globals;
pub mod layout;
pub mod leaders;
pub mod lower;
pub mod regmgmt;
pub mod templates;

pub use error::BackendError;
pub use lower::{literal_words, lower_function, lower_program};

use mcc_codegen::emit_program;
use mcc_common::{CompilerError, SymbolMap, SymbolTable};
use mcc_frontend::Translation;
use mcc_ir::TacProgram;
use serde::{Deserialize, Serialize};

/// Options for lowering
#[derive(Debug, Clone, Default)]
pub struct LoweringOptions {
    /// Print each TAC instruction as a comment ahead of its code
    pub annotate: bool,
    /// Report every spill at info level instead of debug
    pub trace_spills: bool,
}

/// A unit as handed between tools: the symbol table and its TAC program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub symbols: SymbolMap,
    pub program: TacProgram,
}

impl CompilationUnit {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Lower and print a program: data section, entry trampoline, the
/// functions and the runtime block
pub fn generate_assembly(
    program: &TacProgram,
    symbols: &dyn SymbolTable,
    options: &LoweringOptions,
) -> Result<String, BackendError> {
    let asm = lower_program(program, symbols, options)?;
    Ok(emit_program(&asm)?)
}

/// Generate assembly for a translated unit. A translation with errors is
/// refused.
pub fn compile(
    translation: &Translation,
    symbols: &dyn SymbolTable,
    options: &LoweringOptions,
) -> Result<String, CompilerError> {
    if translation.has_errors() {
        return Err(CompilerError::codegen_error(format!(
            "translation failed: {}",
            translation.reporter.summary()
        )));
    }
    Ok(generate_assembly(&translation.program, symbols, options)?)
}

#[cfg(test)]
mod tests;
