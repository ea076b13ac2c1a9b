// SPDX-License-Identifier: AGPL-3.0-only
//! Events emitted by the profit distributor.

use crate::payout::PayoutKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DistributionEvent {
    /// One per distribution call; `holders[i]` received `shares[i]`.
    ProfitDistributed {
        epoch: u64,
        target_ledger: String,
        payout: PayoutKind,
        #[serde(with = "harvest_core::u128_str")]
        total_profit: u128,
        holders: Vec<String>,
        #[serde(with = "harvest_core::u128_vec_str")]
        shares: Vec<u128>,
    },
    IncomeWithdrawn {
        holder: String,
        #[serde(with = "harvest_core::u128_str")]
        amount: u128,
    },
    /// Full balance paid out by an owner or operator on the holder's behalf.
    IncomeTransferred {
        holder: String,
        by: String,
        #[serde(with = "harvest_core::u128_str")]
        amount: u128,
    },
}
