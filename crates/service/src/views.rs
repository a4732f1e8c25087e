use serde::{Deserialize, Serialize};

use motocrm_core::CustomerId;
use motocrm_customers::OrderNumber;
use motocrm_ledger::Balance;
use motocrm_store::CustomerAggregate;

/// Full read projection of a single customer.
///
/// Balances are computed at read time from the stored purchase, payments and
/// receipts — never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerView {
    pub aggregate: CustomerAggregate,
    pub balance: Balance,
    /// Ready for the delivery process: invoice and registration on file and
    /// nothing outstanding.
    pub is_ready_for_process: bool,
}

/// A customer row with children and its derived balance (approved listings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerWithBalance {
    pub aggregate: CustomerAggregate,
    pub balance: Balance,
}

/// Minimal balance lookup by order number (cashier-facing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub customer_id: CustomerId,
    pub order_number: OrderNumber,
    pub name: String,
    pub balance: Balance,
}
