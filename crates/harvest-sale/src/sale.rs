// SPDX-License-Identifier: AGPL-3.0-only
//! # Sale State Machine
//!
//! Accepts contributions in the base currency and in a secondary fungible
//! unit, mints the purchased tokens to the beneficiary, and ends in either a
//! successful sweep to the payout wallet or a full refund.
//!
//! ```text
//!   Pending ──start_time──▶ Open ──end_time / cap hit──▶ Ended ──finalize()──┬─▶ FinalizedSuccess
//!                           │  ▲                                             └─▶ FinalizedRefunding
//!                     pause │  │ unpause
//!                           ▼  │
//!                          Paused
//! ```
//!
//! Every purchase entry point validates, in order: eligibility, the checked
//! `amount × rate` conversion, the minimum purchase (base-currency
//! equivalent), then the remaining cap. There is no partial fill: a purchase
//! larger than the remaining cap is rejected whole, an exact fit is accepted
//! and ends the sale.

use crate::events::{Currency, SaleEvent};
use crate::vault::{Deposit, FundingVault};
use harvest_core::math::{checked_product, checked_sum, mul_div_floor};
use harvest_core::{
    authorize, require_registered, CallContext, EngineError, EngineResult, HolderLedger, Host,
    Role, SaleConfig,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalePhase {
    Pending,
    Open,
    /// Inside the window but halted by a manager
    Paused,
    Ended,
    FinalizedSuccess,
    FinalizedRefunding,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleState {
    #[serde(with = "harvest_core::u128_str")]
    pub base_raised: u128,
    #[serde(with = "harvest_core::u128_str")]
    pub secondary_raised: u128,
    #[serde(with = "harvest_core::u128_str")]
    pub tokens_sold: u128,
    pub paused: bool,
    pub finalized: bool,
    pub refunds_enabled: bool,
    pub managed_minted: bool,
}

/// Result of converting a payment at the configured rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(with = "harvest_core::u128_str")]
    pub tokens: u128,
    /// `tokens / base_rate`, floor
    #[serde(with = "harvest_core::u128_str")]
    pub base_equivalent: u128,
}

/// How a purchase is funded.
#[derive(Debug, Clone, Copy)]
enum Funding {
    /// Attached base-currency payment
    Base(u128),
    /// Secondary units the payer approved to the sale
    SecondaryApproval(u128),
    /// Secondary units already sitting at the sale address
    SecondaryDirect(u128),
}

impl Funding {
    fn amount(&self) -> u128 {
        match self {
            Funding::Base(a) | Funding::SecondaryApproval(a) | Funding::SecondaryDirect(a) => *a,
        }
    }

    fn currency(&self) -> Currency {
        match self {
            Funding::Base(_) => Currency::Base,
            Funding::SecondaryApproval(_) | Funding::SecondaryDirect(_) => Currency::Secondary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSale {
    config: SaleConfig,
    state: SaleState,
    vault: FundingVault,
    events: Vec<SaleEvent>,
}

impl TokenSale {
    /// Deploy a sale. The sale address must already own (mint) the token
    /// ledger, and the ledger cap must leave room for the hard cap plus the
    /// managed allocation.
    pub fn new(config: SaleConfig, host: &Host) -> EngineResult<Self> {
        config.validate().map_err(EngineError::InvalidInput)?;
        if config.token_ledger == config.secondary_ledger {
            return Err(EngineError::InvalidInput(
                "token and secondary ledgers must differ".to_string(),
            ));
        }
        host.ledger(&config.secondary_ledger)?;
        let token = host.ledger(&config.token_ledger)?;
        if token.owner != config.sale_address {
            return Err(EngineError::InvalidInput(format!(
                "{} must own ledger {} to mint",
                config.sale_address, config.token_ledger
            )));
        }
        let needed = checked_sum(
            config.max_cap,
            config.managed_allocation,
            "max_cap + managed allocation",
        )?;
        let room = token.cap().saturating_sub(token.total_supply());
        if token.cap() > 0 && needed > room {
            return Err(EngineError::InvalidInput(format!(
                "ledger cap leaves room for {} tokens, sale needs {}",
                room, needed
            )));
        }

        let vault = FundingVault::new(
            &config.vault_address,
            &config.owner,
            &config.sale_address,
            &config.secondary_ledger,
        );
        log::info!(
            "sale {} deployed: window [{}, {}) max_cap={} min_cap={}",
            config.sale_address,
            config.start_time,
            config.end_time,
            config.max_cap,
            config.min_cap
        );
        Ok(Self {
            config,
            state: SaleState::default(),
            vault,
            events: Vec::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────
    // QUERIES
    // ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &SaleConfig {
        &self.config
    }

    pub fn state(&self) -> &SaleState {
        &self.state
    }

    pub fn vault(&self) -> &FundingVault {
        &self.vault
    }

    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    pub fn phase(&self, now: u64) -> SalePhase {
        if self.state.finalized {
            return if self.state.refunds_enabled {
                SalePhase::FinalizedRefunding
            } else {
                SalePhase::FinalizedSuccess
            };
        }
        if now < self.config.start_time {
            return SalePhase::Pending;
        }
        if self.has_ended(now) {
            return SalePhase::Ended;
        }
        if self.state.paused {
            return SalePhase::Paused;
        }
        SalePhase::Open
    }

    pub fn has_ended(&self, now: u64) -> bool {
        now >= self.config.end_time || self.state.tokens_sold >= self.config.max_cap
    }

    pub fn remaining_cap(&self) -> u128 {
        self.config.max_cap.saturating_sub(self.state.tokens_sold)
    }

    /// Soft cap reached. `min_cap` is in token units, so this is the
    /// base-equivalent raise scaled by `base_rate`.
    pub fn goal_reached(&self) -> bool {
        self.state.tokens_sold >= self.config.min_cap
    }

    /// Base raised plus the secondary raise converted at the configured rates.
    pub fn raised_base_equivalent(&self) -> EngineResult<u128> {
        let secondary = mul_div_floor(
            self.state.secondary_raised,
            self.config.secondary_rate,
            self.config.base_rate,
        )?;
        checked_sum(self.state.base_raised, secondary, "raised base equivalent")
    }

    pub fn quote_base(&self, amount: u128) -> EngineResult<Quote> {
        self.quote(amount, self.config.base_rate)
    }

    pub fn quote_secondary(&self, amount: u128) -> EngineResult<Quote> {
        self.quote(amount, self.config.secondary_rate)
    }

    pub fn deposits_of(&self, contributor: &str) -> Deposit {
        self.vault.deposit_of(contributor)
    }

    fn quote(&self, amount: u128, rate: u128) -> EngineResult<Quote> {
        let tokens = checked_product(amount, rate, "amount × rate")?;
        Ok(Quote {
            tokens,
            base_equivalent: tokens / self.config.base_rate,
        })
    }

    // ─────────────────────────────────────────────────────────────
    // PURCHASES
    // ─────────────────────────────────────────────────────────────

    /// Buy with the base-currency payment attached to the call.
    pub fn contribute_base(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        beneficiary: &str,
    ) -> EngineResult<u128> {
        self.purchase(ctx, host, beneficiary, Funding::Base(ctx.value))
    }

    /// Buy with the full secondary amount the caller approved to the sale.
    pub fn contribute_secondary_via_approval(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        beneficiary: &str,
    ) -> EngineResult<u128> {
        let approved = host
            .ledger(&self.config.secondary_ledger)?
            .allowance(&ctx.caller, &self.config.sale_address);
        self.purchase(ctx, host, beneficiary, Funding::SecondaryApproval(approved))
    }

    /// Owner path for secondary funds already transferred to the sale address
    /// (purchases settled off-engine).
    pub fn contribute_secondary_via_transfer(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        beneficiary: &str,
        amount: u128,
    ) -> EngineResult<u128> {
        authorize(host.gate(), &self.config.owner, &ctx.caller, Role::Owner)?;
        self.purchase(ctx, host, beneficiary, Funding::SecondaryDirect(amount))
    }

    fn ensure_open(&self, now: u64) -> EngineResult<()> {
        match self.phase(now) {
            SalePhase::Open => Ok(()),
            SalePhase::Pending => Err(EngineError::Window(format!(
                "sale opens at {}",
                self.config.start_time
            ))),
            SalePhase::Ended => Err(EngineError::Window("sale has ended".to_string())),
            SalePhase::Paused => Err(EngineError::State("sale is paused".to_string())),
            SalePhase::FinalizedSuccess | SalePhase::FinalizedRefunding => {
                Err(EngineError::State("sale is finalized".to_string()))
            }
        }
    }

    fn purchase(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        beneficiary: &str,
        funding: Funding,
    ) -> EngineResult<u128> {
        self.ensure_open(ctx.now)?;

        let payer = ctx.caller.as_str();
        require_registered(host.gate(), beneficiary)?;
        if !matches!(funding, Funding::SecondaryDirect(_)) {
            require_registered(host.gate(), payer)?;
        }

        let amount = funding.amount();
        if amount == 0 {
            return Err(EngineError::InvalidInput(
                "purchase amount must be > 0".to_string(),
            ));
        }
        let currency = funding.currency();
        let quote = match currency {
            Currency::Base => self.quote_base(amount)?,
            Currency::Secondary => self.quote_secondary(amount)?,
        };
        if quote.base_equivalent < self.config.min_purchase_base {
            return Err(EngineError::Threshold {
                value: quote.base_equivalent,
                minimum: self.config.min_purchase_base,
            });
        }
        let remaining = self.remaining_cap();
        if quote.tokens > remaining {
            return Err(EngineError::Cap {
                requested: quote.tokens,
                remaining,
            });
        }

        // Stage every local change before touching the host
        let mut state = self.state.clone();
        state.tokens_sold += quote.tokens;
        let (base, secondary) = match currency {
            Currency::Base => {
                state.base_raised = checked_sum(state.base_raised, amount, "base raised")?;
                (amount, 0)
            }
            Currency::Secondary => {
                state.secondary_raised =
                    checked_sum(state.secondary_raised, amount, "secondary raised")?;
                (0, amount)
            }
        };
        let contributor = match funding {
            Funding::SecondaryDirect(_) => beneficiary,
            _ => payer,
        };
        let mut vault = self.vault.clone();
        vault.deposit(&self.config.sale_address, contributor, base, secondary)?;

        let config = &self.config;
        host.atomic(|h| {
            match funding {
                Funding::Base(a) => h
                    .bank
                    .transfer(payer, &config.vault_address, a)
                    .map_err(EngineError::Transfer)?,
                Funding::SecondaryApproval(a) => h
                    .ledger_mut(&config.secondary_ledger)?
                    .transfer_from(&config.sale_address, payer, &config.vault_address, a)
                    .map_err(EngineError::Transfer)?,
                Funding::SecondaryDirect(a) => h
                    .ledger_mut(&config.secondary_ledger)?
                    .transfer(&config.sale_address, &config.vault_address, a)
                    .map_err(EngineError::Transfer)?,
            }
            h.ledger_mut(&config.token_ledger)?
                .mint(&config.sale_address, beneficiary, quote.tokens)
                .map_err(EngineError::Transfer)
        })?;

        self.state = state;
        self.vault = vault;
        log::info!(
            "purchase: {} paid {} {:?} → {} tokens to {} (sold {}/{})",
            payer,
            amount,
            currency,
            quote.tokens,
            beneficiary,
            self.state.tokens_sold,
            self.config.max_cap
        );
        self.events.push(SaleEvent::TokenPurchase {
            purchaser: payer.to_string(),
            beneficiary: beneficiary.to_string(),
            currency,
            paid: amount,
            tokens: quote.tokens,
        });
        Ok(quote.tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // FINALIZATION
    // ─────────────────────────────────────────────────────────────

    /// Close the sale once it has ended. Returns whether the goal was met.
    pub fn finalize(&mut self, ctx: &CallContext, host: &mut Host) -> EngineResult<bool> {
        authorize(host.gate(), &self.config.owner, &ctx.caller, Role::Owner)?;
        if self.state.finalized {
            return Err(EngineError::State("sale already finalized".to_string()));
        }
        let phase = self.phase(ctx.now);
        if phase != SalePhase::Ended {
            return Err(EngineError::Window(format!(
                "sale has not ended ({:?})",
                phase
            )));
        }

        let success = self.goal_reached();
        let mut vault = self.vault.clone();
        let sale_addr = self.config.sale_address.clone();

        if success {
            let wallet = self.config.wallet.clone();
            let owner = self.config.owner.clone();
            let token_ledger = self.config.token_ledger.clone();
            let (base, secondary) = host.atomic(|h| {
                let swept = vault.close(&sale_addr, h, true, &wallet)?;
                h.ledger_mut(&token_ledger)?
                    .transfer_ownership(&sale_addr, &owner)
                    .map_err(EngineError::Transfer)?;
                Ok(swept)
            })?;
            self.vault = vault;
            self.state.finalized = true;
            self.events.push(SaleEvent::Finalized {
                success: true,
                tokens_sold: self.state.tokens_sold,
            });
            self.events.push(SaleEvent::VaultClosed {
                wallet,
                base,
                secondary,
            });
        } else {
            vault.close(&sale_addr, host, false, "")?;
            self.vault = vault;
            self.state.finalized = true;
            self.state.refunds_enabled = true;
            self.events.push(SaleEvent::Finalized {
                success: false,
                tokens_sold: self.state.tokens_sold,
            });
            self.events.push(SaleEvent::RefundsEnabled);
        }

        log::info!(
            "sale {} finalized: success={} tokens_sold={} min_cap={}",
            sale_addr,
            success,
            self.state.tokens_sold,
            self.config.min_cap
        );
        Ok(success)
    }

    /// Return a contributor's deposits after a failed sale.
    pub fn claim_refund(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        contributor: &str,
    ) -> EngineResult<Deposit> {
        if !self.state.refunds_enabled {
            return Err(EngineError::State("refunds are not enabled".to_string()));
        }
        let paid = self.vault.refund(ctx, host, contributor)?;
        self.events.push(SaleEvent::Refunded {
            contributor: contributor.to_string(),
            base: paid.base,
            secondary: paid.secondary,
        });
        Ok(paid)
    }

    /// Mint the fixed management allocation. One-shot, before finalization.
    pub fn mint_managed_tokens(&mut self, ctx: &CallContext, host: &mut Host) -> EngineResult<u128> {
        authorize(host.gate(), &self.config.owner, &ctx.caller, Role::Owner)?;
        if self.state.managed_minted {
            return Err(EngineError::State(
                "managed tokens already minted".to_string(),
            ));
        }
        self.ensure_not_finalized()?;
        let amount = self.config.managed_allocation;
        if amount == 0 {
            return Err(EngineError::State(
                "no managed allocation configured".to_string(),
            ));
        }

        host.ledger_mut(&self.config.token_ledger)?
            .mint(
                &self.config.sale_address,
                &self.config.management_wallet,
                amount,
            )
            .map_err(EngineError::Transfer)?;

        self.state.managed_minted = true;
        log::info!(
            "managed allocation {} minted to {}",
            amount,
            self.config.management_wallet
        );
        self.events.push(SaleEvent::ManagedTokensMinted {
            to: self.config.management_wallet.clone(),
            amount,
        });
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────────
    // ADMINISTRATION (manager role, before finalization)
    // ─────────────────────────────────────────────────────────────

    fn ensure_manager(&self, ctx: &CallContext, host: &Host) -> EngineResult<()> {
        authorize(host.gate(), &self.config.owner, &ctx.caller, Role::Manager)
    }

    fn ensure_not_finalized(&self) -> EngineResult<()> {
        if self.state.finalized {
            return Err(EngineError::State("sale is finalized".to_string()));
        }
        Ok(())
    }

    /// Takes effect immediately; extending can reopen a sale that had ended
    /// by time.
    pub fn set_end_time(
        &mut self,
        ctx: &CallContext,
        host: &Host,
        end_time: u64,
    ) -> EngineResult<()> {
        self.ensure_manager(ctx, host)?;
        self.ensure_not_finalized()?;
        if end_time <= self.config.start_time {
            return Err(EngineError::InvalidInput(format!(
                "end_time {} must be after start_time {}",
                end_time, self.config.start_time
            )));
        }
        let old = self.config.end_time;
        self.config.end_time = end_time;
        log::info!("sale end_time {} → {}", old, end_time);
        self.events
            .push(SaleEvent::EndTimeChanged { old, new: end_time });
        Ok(())
    }

    pub fn set_wallet(&mut self, ctx: &CallContext, host: &Host, wallet: &str) -> EngineResult<()> {
        self.ensure_manager(ctx, host)?;
        self.ensure_not_finalized()?;
        if wallet.is_empty() {
            return Err(EngineError::InvalidInput("wallet is empty".to_string()));
        }
        let old = std::mem::replace(&mut self.config.wallet, wallet.to_string());
        log::info!("sale wallet {} → {}", old, wallet);
        self.events.push(SaleEvent::WalletChanged {
            old,
            new: wallet.to_string(),
        });
        Ok(())
    }

    pub fn set_min_purchase(
        &mut self,
        ctx: &CallContext,
        host: &Host,
        min_purchase_base: u128,
    ) -> EngineResult<()> {
        self.ensure_manager(ctx, host)?;
        self.ensure_not_finalized()?;
        let old = self.config.min_purchase_base;
        self.config.min_purchase_base = min_purchase_base;
        self.events.push(SaleEvent::MinPurchaseChanged {
            old,
            new: min_purchase_base,
        });
        Ok(())
    }

    pub fn pause(&mut self, ctx: &CallContext, host: &Host) -> EngineResult<()> {
        self.ensure_manager(ctx, host)?;
        self.ensure_not_finalized()?;
        if self.state.paused {
            return Err(EngineError::State("sale already paused".to_string()));
        }
        self.state.paused = true;
        log::info!("sale {} paused by {}", self.config.sale_address, ctx.caller);
        self.events.push(SaleEvent::Paused);
        Ok(())
    }

    pub fn unpause(&mut self, ctx: &CallContext, host: &Host) -> EngineResult<()> {
        self.ensure_manager(ctx, host)?;
        self.ensure_not_finalized()?;
        if !self.state.paused {
            return Err(EngineError::State("sale is not paused".to_string()));
        }
        self.state.paused = false;
        log::info!("sale {} unpaused by {}", self.config.sale_address, ctx.caller);
        self.events.push(SaleEvent::Unpaused);
        Ok(())
    }
}
