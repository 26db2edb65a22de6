//! Module Lowering - lowers a whole TAC program

use super::function::lower_function;
use crate::error::BackendError;
use crate::globals::lower_globals;
use crate::leaders::label_blocks;
use crate::LoweringOptions;
use log::info;
use mcc_codegen::AsmProgram;
use mcc_common::{LabelGenerator, SymbolTable};
use mcc_ir::{Operator, TacProgram};

/// Lower a program to an assembly program. Every instruction must belong
/// to a function and the unit must define `main`.
pub fn lower_program(
    program: &TacProgram,
    symbols: &dyn SymbolTable,
    options: &LoweringOptions,
) -> Result<AsmProgram, BackendError> {
    let labels = label_blocks(program)?;
    let data = lower_globals(symbols);
    let mut local_labels = LabelGenerator::new("_X");
    let mut text = Vec::new();
    let mut functions = Vec::new();

    let instructions = program.instructions();
    let mut start = 0;
    while let Some(begin) = instructions.get(start) {
        let name = begin
            .function_begin()
            .ok_or_else(|| BackendError::malformed(begin.id, "instruction outside of any function"))?;
        let end = instructions[start..]
            .iter()
            .position(|inst| inst.op() == Some(Operator::FuncEnd))
            .map(|offset| start + offset)
            .ok_or_else(|| BackendError::malformed(begin.id, format!("function '{name}' never ends")))?;
        if let Some(nested) = instructions[start + 1..end]
            .iter()
            .find(|inst| inst.function_begin().is_some())
        {
            return Err(BackendError::malformed(
                nested.id,
                format!("function begins inside '{name}'"),
            ));
        }

        let body = &instructions[start..=end];
        text.extend(lower_function(body, start, symbols, &labels, &mut local_labels, options)?);
        functions.push(name.to_string());
        start = end + 1;
    }

    if !functions.iter().any(|name| name == "main") {
        return Err(BackendError::MissingFunction("main".to_string()));
    }
    info!(
        "lowered {} function(s), {} data item(s), {} block label(s)",
        functions.len(),
        data.len(),
        labels.len()
    );

    let asm = AsmProgram::new(data, text);
    asm.check_labels()?;
    Ok(asm)
}
