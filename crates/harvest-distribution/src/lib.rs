// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HARVEST - DISTRIBUTION MODULE
//
// Pro-rata profit distribution over a holder ledger. Base-currency profits
// become withdrawable income credits (pull); token profits are transferred
// to each holder directly (push). Shares are floor(profit × balance / total),
// computed with checked u128 arithmetic; special and unregistered holders
// receive nothing.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod actions;
pub mod engine;
pub mod events;
pub mod income;
pub mod payout;
pub mod shares;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{DistributionAction, DistributionResponse};
pub use engine::{DistributionReceipt, ProfitDistributor};
pub use events::DistributionEvent;
pub use income::IncomeLedger;
pub use payout::{Payout, PayoutKind, PullCredit, PushTransfer};
pub use shares::{compute_shares, ShareTable};
