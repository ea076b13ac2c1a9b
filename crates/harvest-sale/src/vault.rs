// SPDX-License-Identifier: AGPL-3.0-only
//! # Funding Vault
//!
//! Escrows sale contributions per contributor in two parallel currencies
//! (base currency in the bank, secondary unit in its ledger) until the sale
//! is finalized.
//!
//! ```text
//!   Active ──close(true)──▶ Closed      (everything swept to wallet)
//!     │
//!     └───close(false)──▶ Refunding   (each contributor pulls back deposits)
//! ```
//!
//! Only the controlling sale may deposit or close. Refunds are paid to the
//! contributor, requested by the contributor or by the owner on their behalf.

use harvest_core::{CallContext, EngineError, EngineResult, HolderLedger, Host};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultState {
    Active,
    Closed,
    Refunding,
}

/// One contributor's escrowed amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(with = "harvest_core::u128_str")]
    pub base: u128,
    #[serde(with = "harvest_core::u128_str")]
    pub secondary: u128,
}

impl Deposit {
    pub fn is_empty(&self) -> bool {
        self.base == 0 && self.secondary == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingVault {
    pub address: String,
    /// May request a refund on a contributor's behalf
    pub owner: String,
    /// The sale account; sole depositor and closer
    pub controller: String,
    pub secondary_ledger: String,
    state: VaultState,
    deposits: BTreeMap<String, Deposit>,
    escrowed_base: u128,
    escrowed_secondary: u128,
}

impl FundingVault {
    pub fn new(address: &str, owner: &str, controller: &str, secondary_ledger: &str) -> Self {
        Self {
            address: address.to_string(),
            owner: owner.to_string(),
            controller: controller.to_string(),
            secondary_ledger: secondary_ledger.to_string(),
            state: VaultState::Active,
            deposits: BTreeMap::new(),
            escrowed_base: 0,
            escrowed_secondary: 0,
        }
    }

    pub fn state(&self) -> VaultState {
        self.state
    }

    pub fn deposit_of(&self, contributor: &str) -> Deposit {
        self.deposits.get(contributor).copied().unwrap_or_default()
    }

    /// (base, secondary) currently held in escrow.
    pub fn escrowed(&self) -> (u128, u128) {
        (self.escrowed_base, self.escrowed_secondary)
    }

    fn ensure_controller(&self, caller: &str) -> EngineResult<()> {
        if caller != self.controller {
            return Err(EngineError::State(format!(
                "vault is controlled by {}, not {}",
                self.controller, caller
            )));
        }
        Ok(())
    }

    /// Record a contribution. The funds themselves are moved into
    /// `self.address` by the controller in the same call.
    pub fn deposit(
        &mut self,
        caller: &str,
        contributor: &str,
        base: u128,
        secondary: u128,
    ) -> EngineResult<()> {
        self.ensure_controller(caller)?;
        if self.state != VaultState::Active {
            return Err(EngineError::State(format!(
                "vault not accepting deposits ({:?})",
                self.state
            )));
        }
        if base == 0 && secondary == 0 {
            return Err(EngineError::InvalidInput("empty deposit".to_string()));
        }

        let current = self.deposit_of(contributor);
        let updated = Deposit {
            base: current
                .base
                .checked_add(base)
                .ok_or_else(|| EngineError::overflow("contributor base deposit"))?,
            secondary: current
                .secondary
                .checked_add(secondary)
                .ok_or_else(|| EngineError::overflow("contributor secondary deposit"))?,
        };
        let escrowed_base = self
            .escrowed_base
            .checked_add(base)
            .ok_or_else(|| EngineError::overflow("escrowed base"))?;
        let escrowed_secondary = self
            .escrowed_secondary
            .checked_add(secondary)
            .ok_or_else(|| EngineError::overflow("escrowed secondary"))?;

        self.deposits.insert(contributor.to_string(), updated);
        self.escrowed_base = escrowed_base;
        self.escrowed_secondary = escrowed_secondary;
        log::debug!(
            "vault {} deposit {} base={} secondary={}",
            self.address,
            contributor,
            base,
            secondary
        );
        Ok(())
    }

    /// Close the escrow. On success sweep everything to `wallet` and return
    /// the swept (base, secondary); on failure enter refund mode and return
    /// the amounts now claimable.
    pub fn close(
        &mut self,
        caller: &str,
        host: &mut Host,
        success: bool,
        wallet: &str,
    ) -> EngineResult<(u128, u128)> {
        self.ensure_controller(caller)?;
        if self.state != VaultState::Active {
            return Err(EngineError::State(format!(
                "vault already closed ({:?})",
                self.state
            )));
        }

        let (base, secondary) = self.escrowed();
        if !success {
            self.state = VaultState::Refunding;
            log::info!("vault {} entered refund mode", self.address);
            return Ok((base, secondary));
        }

        if wallet.is_empty() {
            return Err(EngineError::InvalidInput("wallet is empty".to_string()));
        }
        let vault_addr = self.address.clone();
        let secondary_ledger = self.secondary_ledger.clone();
        host.atomic(|h| {
            if base > 0 {
                h.bank
                    .transfer(&vault_addr, wallet, base)
                    .map_err(EngineError::Transfer)?;
            }
            if secondary > 0 {
                h.ledger_mut(&secondary_ledger)?
                    .transfer(&vault_addr, wallet, secondary)
                    .map_err(EngineError::Transfer)?;
            }
            Ok(())
        })?;

        self.state = VaultState::Closed;
        self.escrowed_base = 0;
        self.escrowed_secondary = 0;
        self.deposits.clear();
        log::info!(
            "vault {} swept base={} secondary={} to {}",
            self.address,
            base,
            secondary,
            wallet
        );
        Ok((base, secondary))
    }

    /// Pay back a contributor's full deposits and zero their record.
    pub fn refund(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        contributor: &str,
    ) -> EngineResult<Deposit> {
        if self.state != VaultState::Refunding {
            return Err(EngineError::State(format!(
                "refunds not enabled ({:?})",
                self.state
            )));
        }
        if ctx.caller != contributor && ctx.caller != self.owner {
            return Err(EngineError::Unauthorized {
                caller: ctx.caller.clone(),
                required: harvest_core::Role::Owner,
            });
        }
        let owed = self.deposit_of(contributor);
        if owed.is_empty() {
            return Err(EngineError::State(format!(
                "nothing to refund for {}",
                contributor
            )));
        }

        let vault_addr = self.address.clone();
        let secondary_ledger = self.secondary_ledger.clone();
        host.atomic(|h| {
            if owed.base > 0 {
                h.bank
                    .transfer(&vault_addr, contributor, owed.base)
                    .map_err(EngineError::Transfer)?;
            }
            if owed.secondary > 0 {
                h.ledger_mut(&secondary_ledger)?
                    .transfer(&vault_addr, contributor, owed.secondary)
                    .map_err(EngineError::Transfer)?;
            }
            Ok(())
        })?;

        self.deposits.insert(contributor.to_string(), Deposit::default());
        self.escrowed_base -= owed.base;
        self.escrowed_secondary -= owed.secondary;
        log::info!(
            "vault {} refunded {} base={} secondary={}",
            self.address,
            contributor,
            owed.base,
            owed.secondary
        );
        Ok(owed)
    }
}
