//! Function Lowering - walks the instructions of one function
//!
//! Each TAC instruction is lowered on its own. At every leader the dirty
//! registers are written back, the block label is printed and the
//! descriptors are forgotten, so every block starts from memory.

use crate::error::BackendError;
use crate::layout::FrameLayout;
use crate::leaders::BlockLabels;
use crate::regmgmt::RegisterAllocator;
use crate::LoweringOptions;
use log::{debug, info};
use mcc_codegen::AsmInst;
use mcc_common::{LabelGenerator, ScalarType, SymbolTable};
use mcc_ir::{InstrId, Instruction, Operand};

/// Lowering state of one function
pub(super) struct FunctionLowering<'a> {
    pub(super) alloc: RegisterAllocator<'a>,
    pub(super) layout: &'a FrameLayout,
    pub(super) symbols: &'a dyn SymbolTable,
    pub(super) labels: &'a BlockLabels,
    /// Labels local to one lowered instruction (`_X{n}`), unique per unit
    pub(super) local_labels: &'a mut LabelGenerator,
    /// `param` values waiting for their call
    pub(super) pending_params: Vec<(Operand, ScalarType)>,
    /// Id of the instruction being lowered
    pub(super) position: InstrId,
    pub(super) int_scratch: usize,
    pub(super) float_scratch: usize,
}

impl FunctionLowering<'_> {
    pub(super) fn emit(&mut self, inst: AsmInst) {
        self.alloc.emit(inst);
    }

    pub(super) fn emit_all(&mut self, insts: impl IntoIterator<Item = AsmInst>) {
        for inst in insts {
            self.alloc.emit(inst);
        }
    }

    pub(super) fn malformed(&self, message: impl Into<String>) -> BackendError {
        BackendError::malformed(self.position, message)
    }

    /// Scratch registers and pins only last for one instruction
    pub(super) fn begin_step(&mut self) {
        self.int_scratch = 0;
        self.float_scratch = 0;
        self.alloc.clear_pins();
    }
}

/// Lower one function. `body` runs from its `FuncBegin` to its `FuncEnd`
/// and starts at `start` in the program.
pub fn lower_function(
    body: &[Instruction],
    start: usize,
    symbols: &dyn SymbolTable,
    labels: &BlockLabels,
    local_labels: &mut LabelGenerator,
    options: &LoweringOptions,
) -> Result<Vec<AsmInst>, BackendError> {
    let first = body
        .first()
        .ok_or_else(|| BackendError::Unsupported("empty function body".to_string()))?;
    let name = first
        .function_begin()
        .ok_or_else(|| BackendError::malformed(first.id, "function does not start with a begin marker"))?;

    let layout = FrameLayout::compute(name, body, symbols)?;
    info!(
        "lowering function '{}': {} TAC instructions, {} byte frame",
        name,
        body.len(),
        layout.frame().total_size
    );

    let mut lowering = FunctionLowering {
        alloc: RegisterAllocator::new(&layout, options.trace_spills),
        layout: &layout,
        symbols,
        labels,
        local_labels,
        pending_params: Vec::new(),
        position: first.id,
        int_scratch: 0,
        float_scratch: 0,
    };

    for (offset, instruction) in body.iter().enumerate() {
        lowering.position = instruction.id;
        match instruction.function_begin() {
            Some(entry) => lowering.emit(AsmInst::Label(entry.to_string())),
            None => {
                if let Some(label) = labels.label_at(start + offset) {
                    lowering.alloc.spill_all()?;
                    lowering.alloc.dump();
                    lowering.emit(AsmInst::Label(label.to_string()));
                    lowering.alloc.reset_block();
                }
            }
        }
        if options.annotate {
            lowering.emit(AsmInst::Comment(instruction.to_string()));
        }

        lowering.begin_step();
        lowering.lower_instruction(instruction)?;
        debug_assert!(lowering.alloc.is_consistent());
    }

    if !lowering.pending_params.is_empty() {
        return Err(lowering.malformed(format!(
            "{} parameter(s) queued without a call",
            lowering.pending_params.len()
        )));
    }

    debug!(
        "function '{}': {} spill(s), {} temporaries",
        name,
        lowering.alloc.spills(),
        layout.temp_count()
    );
    Ok(lowering.alloc.take_instructions())
}
