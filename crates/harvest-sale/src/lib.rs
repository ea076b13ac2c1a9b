// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HARVEST - SALE MODULE
//
// Time-boxed token sale accepting a base currency and a secondary fungible
// unit at fixed rates. Contributions are escrowed in the funding vault and
// either released to the payout wallet (goal reached) or refunded.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod actions;
pub mod events;
pub mod sale;
pub mod vault;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{SaleAction, SaleResponse};
pub use events::{Currency, SaleEvent};
pub use sale::{Quote, SalePhase, SaleState, TokenSale};
pub use vault::{Deposit, FundingVault, VaultState};
