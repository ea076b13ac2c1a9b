// SPDX-License-Identifier: AGPL-3.0-only
//! # Host world
//!
//! The collaborators an engine call touches: the eligibility registry, the
//! base-currency bank, and every holder ledger keyed by address. Calls are
//! totally ordered; [`Host::atomic`] gives each entry point all-or-nothing
//! semantics over the host state.

use crate::bank::NativeBank;
use crate::error::{EngineError, EngineResult};
use crate::ledger::TokenLedger;
use crate::roles::{EligibilityGate, Registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-call environment: who is calling, what base value is attached, and
/// the host timestamp (Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: String,
    #[serde(default, with = "crate::u128_str")]
    pub value: u128,
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: &str, now: u64) -> Self {
        Self {
            caller: caller.to_string(),
            value: 0,
            now,
        }
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub registry: Registry,
    pub bank: NativeBank,
    ledgers: BTreeMap<String, TokenLedger>,
}

impl Host {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            bank: NativeBank::new(),
            ledgers: BTreeMap::new(),
        }
    }

    pub fn add_ledger(&mut self, ledger: TokenLedger) -> Result<(), String> {
        if self.ledgers.contains_key(&ledger.address) {
            return Err(format!("Ledger {} already exists", ledger.address));
        }
        self.ledgers.insert(ledger.address.clone(), ledger);
        Ok(())
    }

    pub fn gate(&self) -> &dyn EligibilityGate {
        &self.registry
    }

    pub fn ledger(&self, addr: &str) -> EngineResult<&TokenLedger> {
        self.ledgers
            .get(addr)
            .ok_or_else(|| EngineError::InvalidInput(format!("Unknown ledger {}", addr)))
    }

    pub fn ledger_mut(&mut self, addr: &str) -> EngineResult<&mut TokenLedger> {
        self.ledgers
            .get_mut(addr)
            .ok_or_else(|| EngineError::InvalidInput(format!("Unknown ledger {}", addr)))
    }

    /// Run `f` against the host; if it fails, restore the host to exactly its
    /// state before the call.
    pub fn atomic<T, F>(&mut self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Host) -> EngineResult<T>,
    {
        let snapshot = self.clone();
        match f(self) {
            Ok(v) => Ok(v),
            Err(e) => {
                *self = snapshot;
                Err(e)
            }
        }
    }
}
