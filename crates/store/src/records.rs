use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motocrm_core::UserId;
use motocrm_customers::{
    Comment, CustomerRecord, Distributor, Holder, Invoice, OrderNumber, Payment, Purchase,
    Receipt, Registration, SaleState,
};

/// Directory record of an advisor (or any assignable staff member).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A customer row together with every dependent record set.
///
/// This is a read projection: child rows are addressed only by their parent
/// and carry no identity of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    pub customer: CustomerRecord,
    pub purchase: Option<Purchase>,
    pub holders: Vec<Holder>,
    pub payments: Vec<Payment>,
    pub receipts: Vec<Receipt>,
    pub invoice: Option<Invoice>,
    pub registration: Option<Registration>,
    pub comments: Vec<Comment>,
}

impl CustomerAggregate {
    pub fn has_invoice(&self) -> bool {
        self.invoice.is_some()
    }

    pub fn has_registration(&self) -> bool {
        self.registration.is_some()
    }
}

/// The write-set an approval decision produces.
///
/// Built by the orchestrator's decision function inside the store's critical
/// section and applied as one unit: the customer row update plus the full
/// replacement of holders, payments, receipts and the purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalWrite {
    pub sale_state: SaleState,
    /// The order number the customer must hold after the commit (kept or
    /// freshly allocated). Uniqueness is enforced at commit.
    pub order_number: Option<OrderNumber>,
    pub distributor: Option<Distributor>,
    pub approval_date: Option<DateTime<Utc>>,
    pub purchase: Purchase,
    pub holders: Vec<Holder>,
    pub payments: Vec<Payment>,
    pub receipts: Vec<Receipt>,
}
