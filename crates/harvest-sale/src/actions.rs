// SPDX-License-Identifier: AGPL-3.0-only
//! JSON action dispatch for the sale.
//!
//! A host forwards each call as a `SaleAction` tagged by `"action"` and gets
//! back a `SaleResponse` carrying the events emitted by that call only.

use crate::events::{Currency, SaleEvent};
use crate::sale::TokenSale;
use harvest_core::{CallContext, EngineResult, ErrorKind, Host};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum SaleAction {
    /// Buy with the attached base-currency value.
    ContributeBase { beneficiary: String },
    /// Buy with the caller's full secondary approval to the sale.
    ContributeSecondaryViaApproval { beneficiary: String },
    /// Owner only: account for secondary units already at the sale address.
    ContributeSecondaryViaTransfer {
        beneficiary: String,
        #[serde(with = "harvest_core::u128_str")]
        amount: u128,
    },
    Finalize,
    ClaimRefund { contributor: String },
    MintManagedTokens,
    SetEndTime { end_time: u64 },
    SetWallet { wallet: String },
    SetMinPurchase {
        #[serde(with = "harvest_core::u128_str")]
        min_purchase_base: u128,
    },
    Pause,
    Unpause,

    // Read-only
    Phase,
    Status,
    DepositsOf { contributor: String },
    Quote {
        currency: Currency,
        #[serde(with = "harvest_core::u128_str")]
        amount: u128,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleResponse {
    pub success: bool,
    /// JSON-encoded return data
    #[serde(default)]
    pub data: Option<String>,
    pub message: String,
    /// Set when `success` is false
    #[serde(default)]
    pub error: Option<ErrorKind>,
    #[serde(default)]
    pub events: Vec<SaleEvent>,
}

/// Status snapshot returned by `SaleAction::Status`.
#[derive(Debug, Serialize)]
struct StatusView<'a> {
    phase: crate::sale::SalePhase,
    state: &'a crate::sale::SaleState,
    #[serde(with = "harvest_core::u128_str")]
    remaining_cap: u128,
    goal_reached: bool,
}

fn to_json<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_string(value).ok()
}

impl TokenSale {
    /// Execute one action on behalf of `ctx.caller`.
    pub fn execute(&mut self, ctx: &CallContext, host: &mut Host, action: SaleAction) -> SaleResponse {
        let mark = self.events().len();
        let outcome = self.dispatch(ctx, host, action);
        let events = self.events()[mark..].to_vec();
        match outcome {
            Ok((message, data)) => SaleResponse {
                success: true,
                data,
                message,
                error: None,
                events,
            },
            Err(e) => {
                log::debug!("sale action from {} rejected: {}", ctx.caller, e);
                SaleResponse {
                    success: false,
                    data: None,
                    message: e.to_string(),
                    error: Some(e.kind()),
                    events: Vec::new(),
                }
            }
        }
    }

    fn dispatch(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        action: SaleAction,
    ) -> EngineResult<(String, Option<String>)> {
        match action {
            SaleAction::ContributeBase { beneficiary } => {
                let tokens = self.contribute_base(ctx, host, &beneficiary)?;
                Ok((
                    format!("Purchased {} tokens for {}", tokens, beneficiary),
                    Some(tokens.to_string()),
                ))
            }
            SaleAction::ContributeSecondaryViaApproval { beneficiary } => {
                let tokens = self.contribute_secondary_via_approval(ctx, host, &beneficiary)?;
                Ok((
                    format!("Purchased {} tokens for {}", tokens, beneficiary),
                    Some(tokens.to_string()),
                ))
            }
            SaleAction::ContributeSecondaryViaTransfer {
                beneficiary,
                amount,
            } => {
                let tokens =
                    self.contribute_secondary_via_transfer(ctx, host, &beneficiary, amount)?;
                Ok((
                    format!("Purchased {} tokens for {}", tokens, beneficiary),
                    Some(tokens.to_string()),
                ))
            }
            SaleAction::Finalize => {
                let success = self.finalize(ctx, host)?;
                let message = if success {
                    "Sale finalized: goal reached, funds released".to_string()
                } else {
                    "Sale finalized: goal missed, refunds enabled".to_string()
                };
                Ok((message, Some(success.to_string())))
            }
            SaleAction::ClaimRefund { contributor } => {
                let paid = self.claim_refund(ctx, host, &contributor)?;
                Ok((format!("Refunded {}", contributor), to_json(&paid)))
            }
            SaleAction::MintManagedTokens => {
                let amount = self.mint_managed_tokens(ctx, host)?;
                Ok((
                    format!("Minted {} managed tokens", amount),
                    Some(amount.to_string()),
                ))
            }
            SaleAction::SetEndTime { end_time } => {
                self.set_end_time(ctx, host, end_time)?;
                Ok((format!("End time set to {}", end_time), None))
            }
            SaleAction::SetWallet { wallet } => {
                self.set_wallet(ctx, host, &wallet)?;
                Ok((format!("Wallet set to {}", wallet), None))
            }
            SaleAction::SetMinPurchase { min_purchase_base } => {
                self.set_min_purchase(ctx, host, min_purchase_base)?;
                Ok((format!("Minimum purchase set to {}", min_purchase_base), None))
            }
            SaleAction::Pause => {
                self.pause(ctx, host)?;
                Ok(("Sale paused".to_string(), None))
            }
            SaleAction::Unpause => {
                self.unpause(ctx, host)?;
                Ok(("Sale unpaused".to_string(), None))
            }
            SaleAction::Phase => {
                let phase = self.phase(ctx.now);
                Ok((format!("{:?}", phase), to_json(&phase)))
            }
            SaleAction::Status => {
                let view = StatusView {
                    phase: self.phase(ctx.now),
                    state: self.state(),
                    remaining_cap: self.remaining_cap(),
                    goal_reached: self.goal_reached(),
                };
                Ok(("Sale status".to_string(), to_json(&view)))
            }
            SaleAction::DepositsOf { contributor } => {
                let deposit = self.deposits_of(&contributor);
                Ok((format!("Deposits of {}", contributor), to_json(&deposit)))
            }
            SaleAction::Quote { currency, amount } => {
                let quote = match currency {
                    Currency::Base => self.quote_base(amount)?,
                    Currency::Secondary => self.quote_secondary(amount)?,
                };
                Ok((format!("{} tokens", quote.tokens), to_json(&quote)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn test_action_json_shape() {
        let json = r#"{"action":"ContributeSecondaryViaTransfer","beneficiary":"HRVbob","amount":"25"}"#;
        let action: SaleAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            SaleAction::ContributeSecondaryViaTransfer {
                beneficiary: "HRVbob".to_string(),
                amount: 25,
            }
        );
        let unit: SaleAction = serde_json::from_str(r#"{"action":"Finalize"}"#).unwrap();
        assert_eq!(unit, SaleAction::Finalize);
    }

    #[test]
    fn test_execute_returns_only_new_events() {
        let (mut host, mut sale) = make_sale();
        let ctx = CallContext::new(ALICE, START).with_value(100);
        let action = SaleAction::ContributeBase {
            beneficiary: ALICE.to_string(),
        };
        let first = sale.execute(&ctx, &mut host, action.clone());
        assert!(first.success, "{}", first.message);
        assert_eq!(first.data.as_deref(), Some("1000"));
        assert_eq!(first.events.len(), 1);

        let second = sale.execute(&ctx, &mut host, action);
        assert!(second.success);
        assert_eq!(second.events.len(), 1);
        assert_eq!(sale.events().len(), 2);
    }

    #[test]
    fn test_execute_reports_error_kind() {
        let (mut host, mut sale) = make_sale();
        let ctx = CallContext::new(ALICE, START - 1).with_value(100);
        let resp = sale.execute(
            &ctx,
            &mut host,
            SaleAction::ContributeBase {
                beneficiary: ALICE.to_string(),
            },
        );
        assert!(!resp.success);
        assert_eq!(resp.error, Some(ErrorKind::Window));
        assert!(resp.events.is_empty());
    }

    #[test]
    fn test_status_query() {
        let (mut host, mut sale) = make_sale();
        let ctx = CallContext::new(ALICE, START);
        let resp = sale.execute(&ctx, &mut host, SaleAction::Status);
        assert!(resp.success);
        let data: serde_json::Value = serde_json::from_str(&resp.data.unwrap()).unwrap();
        assert_eq!(data["phase"], "Open");
        assert_eq!(data["remaining_cap"], MAX_CAP.to_string());
        assert_eq!(data["goal_reached"], false);
    }
}
