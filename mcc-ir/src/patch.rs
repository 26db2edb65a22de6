//! Patch lists
//!
//! A patch list names the jumps whose destination is not known yet. Lists are
//! merged as control flow joins and resolved with `TacBuilder::backpatch`.

use crate::instructions::InstrId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchList(Vec<InstrId>);

impl PatchList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(id: InstrId) -> Self {
        Self(vec![id])
    }

    /// Union of two lists, keeping first-seen order
    pub fn merge(mut self, other: PatchList) -> Self {
        self.absorb(other);
        self
    }

    pub fn absorb(&mut self, other: PatchList) {
        for id in other.0 {
            if !self.0.contains(&id) {
                self.0.push(id);
            }
        }
    }

    pub fn push(&mut self, id: InstrId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    /// Move the contents out, leaving this list empty
    pub fn take(&mut self) -> PatchList {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: InstrId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = InstrId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<InstrId> for PatchList {
    fn from_iter<I: IntoIterator<Item = InstrId>>(iter: I) -> Self {
        let mut list = PatchList::new();
        for id in iter {
            list.push(id);
        }
        list
    }
}
