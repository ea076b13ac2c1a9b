// SPDX-License-Identifier: AGPL-3.0-only
//! JSON action dispatch for the profit distributor.

use crate::engine::ProfitDistributor;
use crate::events::DistributionEvent;
use harvest_core::{CallContext, EngineResult, ErrorKind, Host};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum DistributionAction {
    /// Split the attached base-currency value as income credits.
    DistributeProfitBase { target_ledger: String },
    /// Split the caller's approval on `payout_ledger` by direct transfer.
    DistributeProfitToken {
        payout_ledger: String,
        target_ledger: String,
    },
    Withdraw {
        #[serde(with = "harvest_core::u128_str")]
        amount: u128,
    },
    DoTransfer { holder: String },
    GetIncome { holder: String },
    Epoch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<String>,
    pub message: String,
    #[serde(default)]
    pub error: Option<ErrorKind>,
    #[serde(default)]
    pub events: Vec<DistributionEvent>,
}

impl ProfitDistributor {
    /// Execute one action on behalf of `ctx.caller`.
    pub fn execute(
        &mut self,
        ctx: &CallContext,
        host: &mut Host,
        action: DistributionAction,
    ) -> DistributionResponse {
        let mark = self.events().len();
        match self.dispatch(ctx, host, action) {
            Ok((message, data)) => DistributionResponse {
                success: true,
                data,
                message,
                error: None,
                events: self.events()[mark..].to_vec(),
            },
            Err(e) => {
                log::debug!("distribution action from {} rejected: {}", ctx.caller, e);
                DistributionResponse {
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
        action: DistributionAction,
    ) -> EngineResult<(String, Option<String>)> {
        match action {
            DistributionAction::DistributeProfitBase { target_ledger } => {
                let receipt = self.distribute_profit_base(ctx, host, &target_ledger)?;
                Ok((
                    format!(
                        "Epoch {}: credited {} of {}",
                        receipt.epoch, receipt.distributed, receipt.total_profit
                    ),
                    serde_json::to_string(&receipt).ok(),
                ))
            }
            DistributionAction::DistributeProfitToken {
                payout_ledger,
                target_ledger,
            } => {
                let receipt =
                    self.distribute_profit_token(ctx, host, &payout_ledger, &target_ledger)?;
                Ok((
                    format!(
                        "Epoch {}: transferred {} of {}",
                        receipt.epoch, receipt.distributed, receipt.total_profit
                    ),
                    serde_json::to_string(&receipt).ok(),
                ))
            }
            DistributionAction::Withdraw { amount } => {
                self.withdraw(ctx, host, amount)?;
                Ok((format!("Withdrew {}", amount), None))
            }
            DistributionAction::DoTransfer { holder } => {
                let paid = self.do_transfer(ctx, host, &holder)?;
                Ok((format!("Paid {} to {}", paid, holder), Some(paid.to_string())))
            }
            DistributionAction::GetIncome { holder } => {
                let owed = self.get_income(&holder);
                Ok((format!("{} owed {}", holder, owed), Some(owed.to_string())))
            }
            DistributionAction::Epoch => Ok((
                format!("Epoch {}", self.epoch()),
                Some(self.epoch().to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn test_distribute_then_withdraw_via_actions() {
        let (mut host, mut dist) = make_distributor();
        let json = r#"{"action":"DistributeProfitBase","target_ledger":"HRVshares"}"#;
        let action: DistributionAction = serde_json::from_str(json).unwrap();
        let ctx = CallContext::new(MANAGER, 1).with_value(4);
        let resp = dist.execute(&ctx, &mut host, action);
        assert!(resp.success, "{}", resp.message);
        assert_eq!(resp.events.len(), 1);

        let income = dist.execute(
            &CallContext::new(H3, 2),
            &mut host,
            DistributionAction::GetIncome {
                holder: H3.to_string(),
            },
        );
        assert_eq!(income.data.as_deref(), Some("2"));

        let json = r#"{"action":"Withdraw","amount":"2"}"#;
        let action: DistributionAction = serde_json::from_str(json).unwrap();
        let resp = dist.execute(&CallContext::new(H3, 2), &mut host, action);
        assert!(resp.success);
        assert_eq!(
            resp.events,
            vec![DistributionEvent::IncomeWithdrawn {
                holder: H3.to_string(),
                amount: 2,
            }]
        );
    }

    #[test]
    fn test_rejected_action_reports_kind() {
        let (mut host, mut dist) = make_distributor();
        let resp = dist.execute(
            &CallContext::new(H4, 2),
            &mut host,
            DistributionAction::Withdraw { amount: 1 },
        );
        assert!(!resp.success);
        assert_eq!(resp.error, Some(ErrorKind::State));
    }
}
