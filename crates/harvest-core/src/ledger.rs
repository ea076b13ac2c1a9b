// SPDX-License-Identifier: AGPL-3.0-only
//! # Holder Ledger
//!
//! Balance-and-holder-set store for a fungible accounting unit. The sale mints
//! through it, the distribution engine walks its holder set, and the secondary
//! purchase currency is itself a `TokenLedger`.
//!
//! ## Invariants
//! - `total_supply` equals the sum of all balances
//! - `total_supply <= cap` whenever `cap > 0`
//! - an address joins the holder set on its first positive balance and never
//!   leaves it
//!
//! All amounts are atomic `u128` units; every mutation uses checked arithmetic
//! and rejects instead of saturating.

use crate::holders::HolderSet;
use crate::roles::EligibilityGate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read/write surface the engine consumes from a holder ledger.
pub trait HolderLedger {
    fn address(&self) -> &str;
    fn balance_of(&self, addr: &str) -> u128;
    fn allowance(&self, owner: &str, spender: &str) -> u128;
    fn total_supply(&self) -> u128;
    /// Maximum supply (0 = uncapped).
    fn cap(&self) -> u128;
    fn holder_count(&self) -> usize;
    fn holder_at(&self, index: usize) -> Option<&str>;

    fn mint(&mut self, caller: &str, to: &str, amount: u128) -> Result<(), String>;
    fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<(), String>;
    fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), String>;

    /// Sum of balances across the holder set, skipping special holders.
    /// `None` if the sum does not fit in `u128`.
    fn aggregate_balance_excluding_special(&self, gate: &dyn EligibilityGate) -> Option<u128> {
        let mut total: u128 = 0;
        for i in 0..self.holder_count() {
            let holder = match self.holder_at(i) {
                Some(h) => h,
                None => continue,
            };
            if gate.is_special(holder) {
                continue;
            }
            total = total.checked_add(self.balance_of(holder))?;
        }
        Some(total)
    }
}

// ─────────────────────────────────────────────────────────────
// REFERENCE IMPLEMENTATION
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    pub address: String,
    pub symbol: String,
    /// Sole minter; administration moves with `transfer_ownership`.
    pub owner: String,
    cap: u128,
    total_supply: u128,
    balances: BTreeMap<String, u128>,
    /// (owner, spender) → allowance
    allowances: BTreeMap<(String, String), u128>,
    holders: HolderSet,
}

impl TokenLedger {
    pub fn new(address: &str, symbol: &str, owner: &str, cap: u128) -> Result<Self, String> {
        if address.is_empty() || owner.is_empty() {
            return Err("Ledger address and owner must not be empty".to_string());
        }
        if symbol.is_empty() || symbol.len() > 8 {
            return Err("Symbol must be 1-8 characters".to_string());
        }
        Ok(Self {
            address: address.to_string(),
            symbol: symbol.to_string(),
            owner: owner.to_string(),
            cap,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            holders: HolderSet::new(),
        })
    }

    pub fn approve(&mut self, owner: &str, spender: &str, amount: u128) -> Result<(), String> {
        if spender.is_empty() {
            return Err("Approve: spender address is empty".to_string());
        }
        self.allowances
            .insert((owner.to_string(), spender.to_string()), amount);
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &str, new_owner: &str) -> Result<(), String> {
        if caller != self.owner {
            return Err(format!("{}: only owner can transfer ownership", self.symbol));
        }
        if new_owner.is_empty() {
            return Err("New owner address is empty".to_string());
        }
        log::info!(
            "{} ownership {} → {}",
            self.symbol,
            self.owner,
            new_owner
        );
        self.owner = new_owner.to_string();
        Ok(())
    }

    /// Move `amount` without authorization checks. Callers have already
    /// authorized the movement.
    fn move_balance(&mut self, from: &str, to: &str, amount: u128) -> Result<(), String> {
        if amount == 0 {
            return Err("Transfer: amount must be > 0".to_string());
        }
        if to.is_empty() {
            return Err("Transfer: recipient address is empty".to_string());
        }
        let from_balance = self.balance_of(from);
        let new_from = from_balance.checked_sub(amount).ok_or_else(|| {
            format!(
                "Insufficient {} balance: {} has {} need {}",
                self.symbol, from, from_balance, amount
            )
        })?;
        if from == to {
            return Ok(());
        }
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| "Transfer: recipient balance overflow".to_string())?;
        self.balances.insert(from.to_string(), new_from);
        self.balances.insert(to.to_string(), new_to);
        self.holders.insert(to);
        Ok(())
    }
}

impl HolderLedger for TokenLedger {
    fn address(&self) -> &str {
        &self.address
    }

    fn balance_of(&self, addr: &str) -> u128 {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.allowances
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn cap(&self) -> u128 {
        self.cap
    }

    fn holder_count(&self) -> usize {
        self.holders.len()
    }

    fn holder_at(&self, index: usize) -> Option<&str> {
        self.holders.get(index)
    }

    fn mint(&mut self, caller: &str, to: &str, amount: u128) -> Result<(), String> {
        if caller != self.owner {
            return Err(format!("{}: only owner can mint", self.symbol));
        }
        if to.is_empty() {
            return Err("Mint: recipient address is empty".to_string());
        }
        if amount == 0 {
            return Err("Mint: amount must be > 0".to_string());
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| "Mint: total supply overflow".to_string())?;
        if self.cap > 0 && new_supply > self.cap {
            return Err(format!(
                "Mint: {} would exceed cap {} (supply {})",
                amount, self.cap, self.total_supply
            ));
        }
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| "Mint: balance overflow".to_string())?;
        self.total_supply = new_supply;
        self.balances.insert(to.to_string(), new_balance);
        self.holders.insert(to);
        Ok(())
    }

    fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<(), String> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), String> {
        let allowance = self.allowance(from, spender);
        let remaining = allowance.checked_sub(amount).ok_or_else(|| {
            format!("Allowance exceeded: have {} need {}", allowance, amount)
        })?;
        self.move_balance(from, to, amount)?;
        self.allowances
            .insert((from.to_string(), spender.to_string()), remaining);
        Ok(())
    }
}
