// SPDX-License-Identifier: AGPL-3.0-only
//! Events emitted by the sale. Append-only, observed off-engine by indexers.

use serde::{Deserialize, Serialize};

/// Which currency paid for a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Base,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SaleEvent {
    TokenPurchase {
        purchaser: String,
        beneficiary: String,
        currency: Currency,
        #[serde(with = "harvest_core::u128_str")]
        paid: u128,
        #[serde(with = "harvest_core::u128_str")]
        tokens: u128,
    },
    /// `success = false` means the goal was missed and refunds are enabled.
    Finalized {
        success: bool,
        #[serde(with = "harvest_core::u128_str")]
        tokens_sold: u128,
    },
    RefundsEnabled,
    VaultClosed {
        wallet: String,
        #[serde(with = "harvest_core::u128_str")]
        base: u128,
        #[serde(with = "harvest_core::u128_str")]
        secondary: u128,
    },
    Refunded {
        contributor: String,
        #[serde(with = "harvest_core::u128_str")]
        base: u128,
        #[serde(with = "harvest_core::u128_str")]
        secondary: u128,
    },
    ManagedTokensMinted {
        to: String,
        #[serde(with = "harvest_core::u128_str")]
        amount: u128,
    },
    EndTimeChanged {
        old: u64,
        new: u64,
    },
    WalletChanged {
        old: String,
        new: String,
    },
    MinPurchaseChanged {
        #[serde(with = "harvest_core::u128_str")]
        old: u128,
        #[serde(with = "harvest_core::u128_str")]
        new: u128,
    },
    Paused,
    Unpaused,
}
