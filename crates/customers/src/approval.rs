use serde::{Deserialize, Serialize};

use crate::children::{Holder, Payment, Purchase, Receipt};
use crate::customer::{Distributor, SaleState};

/// Payload of the sale-approval transaction.
///
/// The purchase is required; the three child arrays default to empty. The
/// whole child set replaces whatever was recorded by a previous approval —
/// there is no merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Requested sale state. Only `APROBADO` promotes the customer; any other
    /// value leaves the stored sale state untouched.
    pub sale_state: SaleState,
    pub distributor: Distributor,
    pub purchase: Purchase,
    #[serde(default)]
    pub holders: Vec<Holder>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub receipts: Vec<Receipt>,
}

impl ApprovalRequest {
    pub fn is_approving(&self) -> bool {
        self.sale_state == SaleState::Aprobado
    }
}
