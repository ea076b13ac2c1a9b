// SPDX-License-Identifier: AGPL-3.0-only
//! Append-only holder set: ordered arena plus a membership index.
//!
//! Indices are stable for the lifetime of the set. Entries are never removed,
//! so a holder whose balance drops to zero keeps its slot and the enumeration
//! order is identical across distribution epochs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HolderSet {
    order: Vec<String>,
    members: BTreeSet<String>,
}

impl HolderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `addr` was newly appended.
    pub fn insert(&mut self, addr: &str) -> bool {
        if self.members.contains(addr) {
            return false;
        }
        self.members.insert(addr.to_string());
        self.order.push(addr.to_string());
        true
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.members.contains(addr)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
