//! Register and address descriptors
//!
//! The register descriptor maps each register to the values it currently
//! holds; the address descriptor maps each value to every place holding its
//! current contents. Both are kept in step: `r` appears in a value's address
//! set exactly when that value appears in `r`'s register set.
//!
//! A value missing from the address descriptor lives in memory only.

use log::trace;
use mcc_ir::Operand;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A variable as seen by the allocator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Var {
    Temp(String),
    Named(String),
}

impl Var {
    pub fn from_operand(operand: &Operand) -> Option<Var> {
        match operand {
            Operand::Temp(name) => Some(Var::Temp(name.clone())),
            Operand::Identifier(name) => Some(Var::Named(name.clone())),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Var::Temp(name) | Var::Named(name) => name,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Var::Named(_))
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Word of a value. Everything but 64-bit integers is a single `Lo` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Half {
    Lo,
    Hi,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueKey {
    pub var: Var,
    pub half: Half,
}

impl ValueKey {
    pub fn lo(var: &Var) -> Self {
        Self {
            var: var.clone(),
            half: Half::Lo,
        }
    }

    pub fn hi(var: &Var) -> Self {
        Self {
            var: var.clone(),
            half: Half::Hi,
        }
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.half {
            Half::Lo => write!(f, "{}", self.var),
            Half::Hi => write!(f, "{}.hi", self.var),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location<R> {
    Register(R),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Descriptors<R> {
    registers: BTreeMap<R, BTreeSet<ValueKey>>,
    addresses: BTreeMap<ValueKey, BTreeSet<Location<R>>>,
}

impl<R> Default for Descriptors<R> {
    fn default() -> Self {
        Self {
            registers: BTreeMap::new(),
            addresses: BTreeMap::new(),
        }
    }
}

impl<R: Copy + Ord + fmt::Debug> Descriptors<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values currently held by `reg`
    pub fn residents(&self, reg: R) -> impl Iterator<Item = &ValueKey> {
        self.registers.get(&reg).into_iter().flatten()
    }

    pub fn is_empty_register(&self, reg: R) -> bool {
        self.registers.get(&reg).map_or(true, |set| set.is_empty())
    }

    pub fn holds(&self, reg: R, key: &ValueKey) -> bool {
        self.registers.get(&reg).is_some_and(|set| set.contains(key))
    }

    /// `reg` holds `key` and nothing else
    pub fn holds_exclusively(&self, reg: R, key: &ValueKey) -> bool {
        self.registers
            .get(&reg)
            .is_some_and(|set| set.len() == 1 && set.contains(key))
    }

    /// Some register holding the current value of `key`
    pub fn register_of(&self, key: &ValueKey) -> Option<R> {
        self.addresses.get(key)?.iter().find_map(|loc| match loc {
            Location::Register(reg) => Some(*reg),
            Location::Memory => None,
        })
    }

    /// The memory copy of `key` is current
    pub fn in_memory(&self, key: &ValueKey) -> bool {
        self.addresses
            .get(key)
            .map_or(true, |locs| locs.contains(&Location::Memory))
    }

    /// Values of `reg` that exist nowhere but in registers
    pub fn dirty_residents(&self, reg: R) -> Vec<ValueKey> {
        self.residents(reg)
            .filter(|key| !self.in_memory(key))
            .cloned()
            .collect()
    }

    /// Every value held only in registers, with one register holding it
    pub fn dirty_values(&self) -> Vec<(R, ValueKey)> {
        self.addresses
            .iter()
            .filter(|(_, locs)| !locs.contains(&Location::Memory))
            .filter_map(|(key, locs)| {
                locs.iter().find_map(|loc| match loc {
                    Location::Register(reg) => Some((*reg, key.clone())),
                    Location::Memory => None,
                })
            })
            .collect()
    }

    /// `reg` was just loaded with `key` from memory
    pub fn bind_loaded(&mut self, reg: R, key: ValueKey) {
        self.clear_register(reg);
        self.registers.entry(reg).or_default().insert(key.clone());
        let locs = self.addresses.entry(key).or_default();
        locs.insert(Location::Register(reg));
        locs.insert(Location::Memory);
        debug_assert!(self.is_consistent());
    }

    /// `reg` now holds a freshly computed `key`; every other copy is stale
    pub fn bind_result(&mut self, reg: R, key: ValueKey) {
        self.clear_register(reg);
        self.drop_value(&key);
        self.registers.entry(reg).or_default().insert(key.clone());
        self.addresses
            .insert(key, BTreeSet::from([Location::Register(reg)]));
        debug_assert!(self.is_consistent());
    }

    /// `key` becomes a copy of what `reg` already holds
    pub fn bind_copy(&mut self, reg: R, key: ValueKey) {
        self.drop_value(&key);
        self.registers.entry(reg).or_default().insert(key.clone());
        self.addresses
            .insert(key, BTreeSet::from([Location::Register(reg)]));
        debug_assert!(self.is_consistent());
    }

    /// The memory copy of `key` was just written
    pub fn mark_stored(&mut self, key: &ValueKey) {
        if let Some(locs) = self.addresses.get_mut(key) {
            locs.insert(Location::Memory);
        }
        debug_assert!(self.is_consistent());
    }

    /// Forget everything `reg` holds. Values left with memory as their only
    /// place drop out of the address descriptor.
    pub fn clear_register(&mut self, reg: R) {
        if let Some(keys) = self.registers.remove(&reg) {
            for key in keys {
                self.release(&key, reg);
            }
        }
        debug_assert!(self.is_consistent());
    }

    /// Forget every register copy of `key`
    fn drop_value(&mut self, key: &ValueKey) {
        if let Some(locs) = self.addresses.remove(key) {
            for loc in locs {
                if let Location::Register(reg) = loc {
                    if let Some(set) = self.registers.get_mut(&reg) {
                        set.remove(key);
                        if set.is_empty() {
                            self.registers.remove(&reg);
                        }
                    }
                }
            }
        }
    }

    fn release(&mut self, key: &ValueKey, reg: R) {
        if let Some(locs) = self.addresses.get_mut(key) {
            locs.remove(&Location::Register(reg));
            if locs.iter().all(|loc| *loc == Location::Memory) {
                self.addresses.remove(key);
            }
        }
    }

    /// Drop register copies of named variables
    pub fn forget_named(&mut self) {
        let named: Vec<ValueKey> = self
            .addresses
            .keys()
            .filter(|key| key.var.is_named())
            .cloned()
            .collect();
        for key in named {
            self.drop_value(&key);
        }
        debug_assert!(self.is_consistent());
    }

    pub fn clear(&mut self) {
        self.registers.clear();
        self.addresses.clear();
    }

    /// Registers that hold at least one value, in register order
    pub fn occupied(&self) -> impl Iterator<Item = R> + '_ {
        self.registers
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(reg, _)| *reg)
    }

    /// Both maps describe the same register contents
    pub fn is_consistent(&self) -> bool {
        let forward = self.registers.iter().all(|(reg, keys)| {
            keys.iter().all(|key| {
                self.addresses
                    .get(key)
                    .is_some_and(|locs| locs.contains(&Location::Register(*reg)))
            })
        });
        let backward = self.addresses.iter().all(|(key, locs)| {
            locs.iter().all(|loc| match loc {
                Location::Register(reg) => self.holds(*reg, key),
                Location::Memory => true,
            })
        });
        forward && backward
    }

    pub fn dump(&self) {
        for (reg, keys) in &self.registers {
            let names: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
            trace!("  {:?}: {{{}}}", reg, names.join(", "));
        }
    }
}
