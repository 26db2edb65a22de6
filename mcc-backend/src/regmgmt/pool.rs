//! One allocatable register pool and its selection policy

use super::descriptors::{Descriptors, ValueKey};
use crate::error::BackendError;
use log::trace;
use std::collections::BTreeSet;
use std::fmt;

/// Outcome of picking a register for a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<R> {
    /// The register already holds the value
    Reuse(R),
    /// The register holds nothing
    Free(R),
    /// The register must be emptied first; `dirty` lists the values that
    /// have to be written back before it is reused
    Evict { reg: R, dirty: Vec<ValueKey> },
}

impl<R: Copy> Choice<R> {
    pub fn register(&self) -> R {
        match self {
            Choice::Reuse(reg) | Choice::Free(reg) => *reg,
            Choice::Evict { reg, .. } => *reg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterPool<R> {
    kind: &'static str,
    order: Vec<R>,
    pub descriptors: Descriptors<R>,
    /// Next register the round-robin spill considers
    cursor: usize,
    /// Registers holding operands of the instruction being lowered
    pinned: BTreeSet<R>,
}

impl<R: Copy + Ord + fmt::Debug> RegisterPool<R> {
    pub fn new(kind: &'static str, order: &[R]) -> Self {
        Self {
            kind,
            order: order.to_vec(),
            descriptors: Descriptors::new(),
            cursor: 0,
            pinned: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Position of `reg` in the pool
    pub fn index_of(&self, reg: R) -> Option<usize> {
        self.order.iter().position(|r| *r == reg)
    }

    pub fn pin(&mut self, reg: R) {
        self.pinned.insert(reg);
    }

    pub fn clear_pins(&mut self) {
        self.pinned.clear();
    }

    pub fn is_pinned(&self, reg: R) -> bool {
        self.pinned.contains(&reg)
    }

    /// Pick a register for `key`.
    ///
    /// 1. a register already holding it (exclusively, when the register is
    ///    about to receive a new value of `key`)
    /// 2. an empty register
    /// 3. a register whose values all have a current memory copy
    /// 4. the next unpinned register in round-robin order
    pub fn choose(&mut self, key: &ValueKey, for_result: bool) -> Result<Choice<R>, BackendError> {
        let holding = self.order.iter().copied().find(|reg| {
            if for_result {
                self.descriptors.holds_exclusively(*reg, key)
            } else {
                self.descriptors.holds(*reg, key)
            }
        });
        if let Some(reg) = holding {
            return Ok(Choice::Reuse(reg));
        }

        let free = self
            .order
            .iter()
            .copied()
            .find(|reg| !self.is_pinned(*reg) && self.descriptors.is_empty_register(*reg));
        if let Some(reg) = free {
            return Ok(Choice::Free(reg));
        }

        let clean = self.order.iter().copied().find(|reg| {
            !self.is_pinned(*reg) && self.descriptors.dirty_residents(*reg).is_empty()
        });
        if let Some(reg) = clean {
            trace!("{} pool: evicting clean {:?} for {}", self.kind, reg, key);
            return Ok(Choice::Evict {
                reg,
                dirty: Vec::new(),
            });
        }

        let count = self.order.len();
        for step in 0..count {
            let index = (self.cursor + step) % count;
            let reg = self.order[index];
            if self.is_pinned(reg) {
                continue;
            }
            self.cursor = (index + 1) % count;
            return Ok(Choice::Evict {
                reg,
                dirty: self.descriptors.dirty_residents(reg),
            });
        }

        Err(BackendError::OutOfRegisters(self.kind))
    }
}
