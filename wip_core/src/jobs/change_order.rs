//! # Change Orders
//!
//! A change order carries the same five breakdowns as a job and is billed
//! the same two ways, so it is costed through the same [`Ledger`] functions.
//!
//! Status changes stamp `approved_date` and `completed_date` the first time
//! the order reaches that status. Later transitions never overwrite a stamp.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{JobBilling, Ledger, LedgerAmounts};
use crate::breakdown::CostBreakdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrderStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl ChangeOrderStatus {
    /// Approved and completed orders count toward the adjusted contract
    pub fn is_approved(self) -> bool {
        matches!(self, ChangeOrderStatus::Approved | ChangeOrderStatus::Completed)
    }
}

/// A change to the scope of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeOrder {
    pub id: Uuid,

    /// Parent job
    pub job_id: Uuid,

    /// Change order number (e.g., "CO-003")
    pub co_number: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ChangeOrderStatus,

    /// Billing model; mirrors the job types
    pub billing: JobBilling,

    #[serde(flatten)]
    pub amounts: LedgerAmounts,

    #[serde(default)]
    pub requested_date: Option<NaiveDate>,

    /// Set once, when the status first becomes approved
    #[serde(default)]
    pub approved_date: Option<DateTime<Utc>>,

    /// Set once, when the status first becomes completed
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
}

impl ChangeOrder {
    /// Create a pending change order with zeroed breakdowns.
    pub fn new(job_id: Uuid, co_number: impl Into<String>, billing: JobBilling) -> Self {
        ChangeOrder {
            id: Uuid::new_v4(),
            job_id,
            co_number: co_number.into(),
            description: String::new(),
            status: ChangeOrderStatus::Pending,
            billing,
            amounts: LedgerAmounts::default(),
            requested_date: None,
            approved_date: None,
            completed_date: None,
        }
    }

    /// Move to a new status, stamping the transition time where required.
    pub fn set_status(&mut self, status: ChangeOrderStatus, at: DateTime<Utc>) {
        match status {
            ChangeOrderStatus::Approved if self.approved_date.is_none() => {
                self.approved_date = Some(at);
            }
            ChangeOrderStatus::Completed if self.completed_date.is_none() => {
                self.completed_date = Some(at);
            }
            _ => {}
        }
        self.status = status;
    }
}

impl Ledger for ChangeOrder {
    fn billing(&self) -> &JobBilling {
        &self.billing
    }

    fn amounts(&self) -> &LedgerAmounts {
        &self.amounts
    }
}

/// Approved change-order totals for one job.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeOrderRollup {
    pub approved_contract: CostBreakdown,
    pub approved_budget: CostBreakdown,
    pub approved_costs: CostBreakdown,
    pub approved_invoiced: CostBreakdown,
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub completed_count: usize,
}

/// Sum approved and completed change orders, and count every status.
pub fn change_order_rollup<'a>(change_orders: impl IntoIterator<Item = &'a ChangeOrder>) -> ChangeOrderRollup {
    let mut rollup = ChangeOrderRollup::default();
    for co in change_orders {
        match co.status {
            ChangeOrderStatus::Pending => rollup.pending_count += 1,
            ChangeOrderStatus::Approved => rollup.approved_count += 1,
            ChangeOrderStatus::Rejected => rollup.rejected_count += 1,
            ChangeOrderStatus::Completed => rollup.completed_count += 1,
        }
        if co.status.is_approved() {
            rollup.approved_contract += co.amounts.contract;
            rollup.approved_budget += co.amounts.budget;
            rollup.approved_costs += co.amounts.costs;
            rollup.approved_invoiced += co.amounts.invoiced;
        }
    }
    rollup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::calculate_earned_revenue;
    use chrono::TimeZone;

    fn co(status: ChangeOrderStatus, contract_labor: f64) -> ChangeOrder {
        let mut co = ChangeOrder::new(Uuid::nil(), "CO-001", JobBilling::fixed_price());
        co.status = status;
        co.amounts.contract = CostBreakdown::new(contract_labor, 0.0, 0.0);
        co
    }

    #[test]
    fn test_status_stamps_set_once() {
        let mut co = ChangeOrder::new(Uuid::nil(), "CO-001", JobBilling::fixed_price());
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();

        co.set_status(ChangeOrderStatus::Approved, first);
        assert_eq!(co.approved_date, Some(first));
        assert_eq!(co.completed_date, None);

        co.set_status(ChangeOrderStatus::Pending, later);
        co.set_status(ChangeOrderStatus::Approved, later);
        assert_eq!(co.approved_date, Some(first));

        co.set_status(ChangeOrderStatus::Completed, later);
        assert_eq!(co.completed_date, Some(later));
        assert_eq!(co.status, ChangeOrderStatus::Completed);
    }

    #[test]
    fn test_rejected_sets_no_stamp() {
        let mut co = ChangeOrder::new(Uuid::nil(), "CO-002", JobBilling::fixed_price());
        co.set_status(ChangeOrderStatus::Rejected, Utc::now());
        assert!(co.approved_date.is_none());
        assert!(co.completed_date.is_none());
    }

    #[test]
    fn test_rollup_only_counts_approved() {
        let orders = vec![
            co(ChangeOrderStatus::Pending, 1_000.0),
            co(ChangeOrderStatus::Approved, 2_000.0),
            co(ChangeOrderStatus::Rejected, 4_000.0),
            co(ChangeOrderStatus::Completed, 8_000.0),
        ];
        let rollup = change_order_rollup(&orders);
        assert_eq!(rollup.approved_contract.total(), 10_000.0);
        assert_eq!(rollup.pending_count, 1);
        assert_eq!(rollup.approved_count, 1);
        assert_eq!(rollup.rejected_count, 1);
        assert_eq!(rollup.completed_count, 1);
    }

    #[test]
    fn test_change_order_uses_job_calculator() {
        let mut co = ChangeOrder::new(Uuid::nil(), "CO-003", JobBilling::time_and_material());
        co.amounts.costs = CostBreakdown::new(1_000.0, 0.0, 0.0);
        assert_eq!(calculate_earned_revenue(&co).total, 1_500.0);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&ChangeOrderStatus::Approved).unwrap(), "\"approved\"");
    }
}
