//! Descriptor-based register allocator
//!
//! Owns the output buffer of one function together with both register
//! pools. Every load, write-back and spill goes through here so the
//! descriptors always describe the code emitted so far.

use super::descriptors::{Half, ValueKey};
use super::pool::{Choice, RegisterPool};
use crate::error::BackendError;
use crate::layout::FrameLayout;
use log::{debug, info, trace};
use mcc_codegen::{Addr, AsmInst, CallingConvention, FloatPair, Reg, Width};
use mcc_common::ScalarType;

/// A pool register parked in its call-save slot
#[derive(Debug, Clone, PartialEq)]
pub enum SavedRegister {
    Int(Reg, Addr),
    Float(FloatPair, Addr),
}

pub struct RegisterAllocator<'a> {
    layout: &'a FrameLayout,
    ints: RegisterPool<Reg>,
    floats: RegisterPool<FloatPair>,
    instructions: Vec<AsmInst>,
    spills: usize,
    trace_spills: bool,
}

impl<'a> RegisterAllocator<'a> {
    pub fn new(layout: &'a FrameLayout, trace_spills: bool) -> Self {
        Self {
            layout,
            ints: RegisterPool::new("integer", &CallingConvention::INT_POOL),
            floats: RegisterPool::new("floating", &CallingConvention::FLOAT_POOL),
            instructions: Vec::new(),
            spills: 0,
            trace_spills,
        }
    }

    pub fn emit(&mut self, inst: AsmInst) {
        self.instructions.push(inst);
    }

    pub fn take_instructions(&mut self) -> Vec<AsmInst> {
        std::mem::take(&mut self.instructions)
    }

    /// Registers emptied by writing dirty values back
    pub fn spills(&self) -> usize {
        self.spills
    }

    /// Memory slot of one word of a value, and the type stored there
    fn slot(&self, key: &ValueKey) -> Result<(Addr, ScalarType), BackendError> {
        let home = self.layout.home(&key.var)?;
        let addr = match key.half {
            Half::Lo => home.addr.clone(),
            Half::Hi => home.addr.offset_by(4),
        };
        Ok((addr, home.ty))
    }

    fn write_back_int(&mut self, reg: Reg, key: &ValueKey) -> Result<(), BackendError> {
        let (addr, ty) = self.slot(key)?;
        self.emit(AsmInst::Store(int_width(ty), reg, addr));
        self.ints.descriptors.mark_stored(key);
        Ok(())
    }

    fn write_back_float(&mut self, pair: FloatPair, key: &ValueKey) -> Result<(), BackendError> {
        let (addr, ty) = self.slot(key)?;
        self.emit(AsmInst::StoreFloat(pair.even, addr.clone()));
        if ty == ScalarType::F64 {
            self.emit(AsmInst::StoreFloat(pair.odd, addr.offset_by(4)));
        }
        self.floats.descriptors.mark_stored(key);
        Ok(())
    }

    fn report_spill(&mut self, register: String, victims: &[ValueKey]) {
        self.spills += 1;
        let names: Vec<String> = victims.iter().map(|k| k.to_string()).collect();
        if self.trace_spills {
            info!("{}: spilling {} ({})", self.layout.function(), register, names.join(", "));
        } else {
            debug!("{}: spilling {} ({})", self.layout.function(), register, names.join(", "));
        }
    }

    /// Register for `key`; `true` when it already holds the value
    fn take_int(&mut self, key: &ValueKey, for_result: bool) -> Result<(Reg, bool), BackendError> {
        match self.ints.choose(key, for_result)? {
            Choice::Reuse(reg) => Ok((reg, true)),
            Choice::Free(reg) => Ok((reg, false)),
            Choice::Evict { reg, dirty } => {
                if !dirty.is_empty() {
                    self.report_spill(reg.to_string(), &dirty);
                }
                for victim in &dirty {
                    self.write_back_int(reg, victim)?;
                }
                self.ints.descriptors.clear_register(reg);
                Ok((reg, false))
            }
        }
    }

    fn take_float(
        &mut self,
        key: &ValueKey,
        for_result: bool,
    ) -> Result<(FloatPair, bool), BackendError> {
        match self.floats.choose(key, for_result)? {
            Choice::Reuse(pair) => Ok((pair, true)),
            Choice::Free(pair) => Ok((pair, false)),
            Choice::Evict { reg, dirty } => {
                if !dirty.is_empty() {
                    self.report_spill(reg.to_string(), &dirty);
                }
                for victim in &dirty {
                    self.write_back_float(reg, victim)?;
                }
                self.floats.descriptors.clear_register(reg);
                Ok((reg, false))
            }
        }
    }

    /// A register holding the current value of `key`, loading it if needed.
    /// The register stays pinned until the pins are cleared.
    pub fn load_int(&mut self, key: &ValueKey) -> Result<Reg, BackendError> {
        let (reg, present) = self.take_int(key, false)?;
        if !present {
            let (addr, ty) = self.slot(key)?;
            self.emit(AsmInst::Load(int_width(ty), reg, addr));
            self.ints.descriptors.bind_loaded(reg, key.clone());
        }
        self.ints.pin(reg);
        Ok(reg)
    }

    /// A register to compute a new value of `key` into. The descriptors
    /// record the new value right away; its memory copy is stale.
    pub fn result_int(&mut self, key: &ValueKey) -> Result<Reg, BackendError> {
        let (reg, _) = self.take_int(key, true)?;
        self.ints.descriptors.bind_result(reg, key.clone());
        self.ints.pin(reg);
        Ok(reg)
    }

    /// `key` takes the value `reg` already holds
    pub fn copy_int(&mut self, reg: Reg, key: &ValueKey) {
        self.ints.descriptors.bind_copy(reg, key.clone());
        self.ints.pin(reg);
    }

    pub fn load_float(&mut self, key: &ValueKey) -> Result<FloatPair, BackendError> {
        let (pair, present) = self.take_float(key, false)?;
        if !present {
            let (addr, ty) = self.slot(key)?;
            self.emit(AsmInst::LoadFloat(pair.even, addr.clone()));
            if ty == ScalarType::F64 {
                self.emit(AsmInst::LoadFloat(pair.odd, addr.offset_by(4)));
            }
            self.floats.descriptors.bind_loaded(pair, key.clone());
        }
        self.floats.pin(pair);
        Ok(pair)
    }

    pub fn result_float(&mut self, key: &ValueKey) -> Result<FloatPair, BackendError> {
        let (pair, _) = self.take_float(key, true)?;
        self.floats.descriptors.bind_result(pair, key.clone());
        self.floats.pin(pair);
        Ok(pair)
    }

    pub fn copy_float(&mut self, pair: FloatPair, key: &ValueKey) {
        self.floats.descriptors.bind_copy(pair, key.clone());
        self.floats.pin(pair);
    }

    /// Write back every value that only lives in a register. The
    /// descriptors stay valid.
    pub fn spill_all(&mut self) -> Result<(), BackendError> {
        self.write_back(|_| true)
    }

    /// Write back dirty named variables before memory is observed
    pub fn flush_named(&mut self) -> Result<(), BackendError> {
        self.write_back(|key| key.var.is_named())
    }

    fn write_back(&mut self, wanted: impl Fn(&ValueKey) -> bool) -> Result<(), BackendError> {
        for (reg, key) in self.ints.descriptors.dirty_values() {
            if wanted(&key) {
                self.write_back_int(reg, &key)?;
            }
        }
        for (pair, key) in self.floats.descriptors.dirty_values() {
            if wanted(&key) {
                self.write_back_float(pair, &key)?;
            }
        }
        Ok(())
    }

    /// Forget all register contents at a block boundary
    pub fn reset_block(&mut self) {
        trace!("{}: block boundary, descriptors cleared", self.layout.function());
        self.ints.descriptors.clear();
        self.floats.descriptors.clear();
        self.clear_pins();
    }

    /// Register copies of named variables may be stale after a store
    /// through a pointer or a call
    pub fn forget_named(&mut self) {
        self.ints.descriptors.forget_named();
        self.floats.descriptors.forget_named();
    }

    pub fn clear_pins(&mut self) {
        self.ints.clear_pins();
        self.floats.clear_pins();
    }

    /// Park every pool register holding a temporary in its call-save slot
    pub fn save_for_call(&mut self) -> Vec<SavedRegister> {
        let layout = self.layout;
        let frame = layout.frame();
        let mut saved = Vec::new();

        let ints: Vec<Reg> = self.ints.descriptors.occupied().collect();
        for reg in ints {
            let holds_temp = self.ints.descriptors.residents(reg).any(|k| !k.var.is_named());
            if let (true, Some(index)) = (holds_temp, self.ints.index_of(reg)) {
                saved.push(SavedRegister::Int(reg, frame.int_save_slot(index)));
            }
        }

        let floats: Vec<FloatPair> = self.floats.descriptors.occupied().collect();
        for pair in floats {
            let holds_temp = self.floats.descriptors.residents(pair).any(|k| !k.var.is_named());
            if let (true, Some(index)) = (holds_temp, self.floats.index_of(pair)) {
                saved.push(SavedRegister::Float(pair, frame.float_save_slot(index)));
            }
        }

        for entry in &saved {
            match entry {
                SavedRegister::Int(reg, slot) => {
                    self.emit(AsmInst::Store(Width::Word, *reg, slot.clone()));
                }
                SavedRegister::Float(pair, slot) => {
                    self.emit(AsmInst::StoreFloat(pair.even, slot.clone()));
                    self.emit(AsmInst::StoreFloat(pair.odd, slot.offset_by(4)));
                }
            }
        }
        saved
    }

    /// Reload what `save_for_call` parked; the descriptors never changed
    pub fn restore_after_call(&mut self, saved: &[SavedRegister]) {
        for entry in saved {
            match entry {
                SavedRegister::Int(reg, slot) => {
                    self.emit(AsmInst::Load(Width::Word, *reg, slot.clone()));
                }
                SavedRegister::Float(pair, slot) => {
                    self.emit(AsmInst::LoadFloat(pair.even, slot.clone()));
                    self.emit(AsmInst::LoadFloat(pair.odd, slot.offset_by(4)));
                }
            }
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.ints.descriptors.is_consistent() && self.floats.descriptors.is_consistent()
    }

    /// Register holding `key`, if any
    #[cfg(test)]
    pub fn int_register_of(&self, key: &ValueKey) -> Option<Reg> {
        self.ints.descriptors.register_of(key)
    }

    pub fn dump(&self) {
        trace!("{}: integer registers", self.layout.function());
        self.ints.descriptors.dump();
        trace!("{}: floating registers", self.layout.function());
        self.floats.descriptors.dump();
    }
}

/// Access width of one word of a value of type `ty`
fn int_width(ty: ScalarType) -> Width {
    if ty.is_wide() {
        Width::Word
    } else {
        Width::of(ty)
    }
}
