use chrono::{DateTime, Utc};
use thiserror::Error;

use motocrm_core::{CustomerId, DomainError, UserId};
use motocrm_customers::{
    Comment, CustomerRecord, Invoice, OrderNumber, Receipt, Registration, SaleState, Stage,
    StageId,
};

use crate::records::{Advisor, ApprovalWrite, CustomerAggregate};

/// Store operation error.
///
/// Constraint violations are surfaced as their own variants so callers can
/// distinguish a retryable race (duplicate order number under concurrent
/// approvals) from plain bad input. Decision-callback failures pass through
/// untranslated in `Domain`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("customer not found")]
    NotFound,

    #[error("a customer with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("order number '{0}' is already assigned")]
    DuplicateOrderNumber(OrderNumber),

    /// A read-modify-write decision function rejected the operation; the
    /// enclosing unit was discarded.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Transactional store for the customer aggregate.
///
/// ## Atomicity contract
///
/// The closure-taking methods (`update_customer`, `commit_approval`,
/// `upsert_invoice`, `upsert_registration`) execute load → decide → write as
/// one isolated unit: the decision function sees a snapshot that cannot
/// change before the write lands, and a decision error discards the unit
/// with no partial effects observable.
///
/// `commit_approval` additionally exposes the current global maximum order
/// number to the decision function — read inside the same unit as the
/// eventual write, so two concurrent approvals can never both derive the
/// same "next" number from a stale read. A duplicate order number at commit
/// is reported as `DuplicateOrderNumber`, never silently absorbed.
///
/// Implementations must serialize conflicting units (same customer, or any
/// two approvals); units touching different customers may run concurrently.
pub trait CustomerStore: Send + Sync {
    // ── Reads ────────────────────────────────────────────────────────────

    fn customer(&self, id: CustomerId) -> Result<Option<CustomerRecord>, StoreError>;

    fn aggregate(&self, id: CustomerId) -> Result<Option<CustomerAggregate>, StoreError>;

    /// Every customer with its dependent record sets. Ordering is the
    /// caller's concern.
    fn aggregates(&self) -> Result<Vec<CustomerAggregate>, StoreError>;

    fn find_by_order_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<CustomerAggregate>, StoreError>;

    fn find_by_email(&self, email: &str) -> Result<Option<CustomerRecord>, StoreError>;

    /// Numerically greatest order number held by any customer, approved or
    /// not. (Numeric, not lexicographic: `MRS10000` > `MRS9999`.)
    fn max_order_number(&self) -> Result<Option<OrderNumber>, StoreError>;

    // ── Customer writes ──────────────────────────────────────────────────

    /// Insert a fully-built customer row. Enforces email uniqueness.
    fn insert_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, StoreError>;

    /// Atomic read-modify-write of one customer row. `apply` receives the
    /// current row and returns the row to persist; `updated_at` is stamped
    /// by the store.
    fn update_customer<F>(&self, id: CustomerId, apply: F) -> Result<CustomerRecord, StoreError>
    where
        F: FnOnce(&CustomerRecord) -> Result<CustomerRecord, DomainError>;

    /// Remove the customer and every dependent record.
    fn delete_customer(&self, id: CustomerId) -> Result<(), StoreError>;

    /// Append a comment, optionally applying a sale-state side effect the
    /// caller has already authorized, as one unit.
    fn add_comment(
        &self,
        id: CustomerId,
        comment: Comment,
        sale_state: Option<SaleState>,
    ) -> Result<Comment, StoreError>;

    /// Point the listed customers at an advisor, stamping `assigned_at`.
    /// Returns how many rows were updated.
    fn assign_advisor(
        &self,
        ids: &[CustomerId],
        advisor_id: UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<usize, StoreError>;

    // ── Approval transaction ─────────────────────────────────────────────

    /// Execute the sale-approval transaction.
    ///
    /// Loads the customer and the current maximum order number, calls
    /// `decide`, and — if it accepts — applies the returned write-set:
    /// customer row update plus destroy-and-recreate of the purchase,
    /// holders, payments and receipts. All-or-nothing.
    fn commit_approval<F>(
        &self,
        id: CustomerId,
        decide: F,
    ) -> Result<CustomerRecord, StoreError>
    where
        F: FnOnce(&CustomerRecord, Option<&OrderNumber>) -> Result<ApprovalWrite, DomainError>;

    // ── Receipts ─────────────────────────────────────────────────────────

    /// Append a receipt outside the approval transaction (back-office payment
    /// registration).
    fn append_receipt(&self, id: CustomerId, receipt: Receipt) -> Result<Receipt, StoreError>;

    // ── Invoice / registration (single authoritative record) ────────────

    /// Create or replace the customer's invoice. `decide` sees the current
    /// record (if any) and returns the record to persist.
    fn upsert_invoice<F>(&self, id: CustomerId, decide: F) -> Result<Invoice, StoreError>
    where
        F: FnOnce(Option<&Invoice>) -> Result<Invoice, DomainError>;

    fn upsert_registration<F>(
        &self,
        id: CustomerId,
        decide: F,
    ) -> Result<Registration, StoreError>
    where
        F: FnOnce(Option<&Registration>) -> Result<Registration, DomainError>;

    // ── Reference data ───────────────────────────────────────────────────

    fn insert_stage(&self, stage: Stage) -> Result<(), StoreError>;

    fn stage(&self, id: StageId) -> Result<Option<Stage>, StoreError>;

    fn stage_by_name(&self, name: &str) -> Result<Option<Stage>, StoreError>;

    fn insert_advisor(&self, advisor: Advisor) -> Result<(), StoreError>;

    fn advisor(&self, id: UserId) -> Result<Option<Advisor>, StoreError>;

    fn advisors(&self) -> Result<Vec<Advisor>, StoreError>;
}

impl<S> CustomerStore for std::sync::Arc<S>
where
    S: CustomerStore,
{
    fn customer(&self, id: CustomerId) -> Result<Option<CustomerRecord>, StoreError> {
        (**self).customer(id)
    }

    fn aggregate(&self, id: CustomerId) -> Result<Option<CustomerAggregate>, StoreError> {
        (**self).aggregate(id)
    }

    fn aggregates(&self) -> Result<Vec<CustomerAggregate>, StoreError> {
        (**self).aggregates()
    }

    fn find_by_order_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<CustomerAggregate>, StoreError> {
        (**self).find_by_order_number(order_number)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<CustomerRecord>, StoreError> {
        (**self).find_by_email(email)
    }

    fn max_order_number(&self) -> Result<Option<OrderNumber>, StoreError> {
        (**self).max_order_number()
    }

    fn insert_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, StoreError> {
        (**self).insert_customer(record)
    }

    fn update_customer<F>(&self, id: CustomerId, apply: F) -> Result<CustomerRecord, StoreError>
    where
        F: FnOnce(&CustomerRecord) -> Result<CustomerRecord, DomainError>,
    {
        (**self).update_customer(id, apply)
    }

    fn delete_customer(&self, id: CustomerId) -> Result<(), StoreError> {
        (**self).delete_customer(id)
    }

    fn add_comment(
        &self,
        id: CustomerId,
        comment: Comment,
        sale_state: Option<SaleState>,
    ) -> Result<Comment, StoreError> {
        (**self).add_comment(id, comment, sale_state)
    }

    fn assign_advisor(
        &self,
        ids: &[CustomerId],
        advisor_id: UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        (**self).assign_advisor(ids, advisor_id, assigned_at)
    }

    fn commit_approval<F>(&self, id: CustomerId, decide: F) -> Result<CustomerRecord, StoreError>
    where
        F: FnOnce(&CustomerRecord, Option<&OrderNumber>) -> Result<ApprovalWrite, DomainError>,
    {
        (**self).commit_approval(id, decide)
    }

    fn append_receipt(&self, id: CustomerId, receipt: Receipt) -> Result<Receipt, StoreError> {
        (**self).append_receipt(id, receipt)
    }

    fn upsert_invoice<F>(&self, id: CustomerId, decide: F) -> Result<Invoice, StoreError>
    where
        F: FnOnce(Option<&Invoice>) -> Result<Invoice, DomainError>,
    {
        (**self).upsert_invoice(id, decide)
    }

    fn upsert_registration<F>(
        &self,
        id: CustomerId,
        decide: F,
    ) -> Result<Registration, StoreError>
    where
        F: FnOnce(Option<&Registration>) -> Result<Registration, DomainError>,
    {
        (**self).upsert_registration(id, decide)
    }

    fn insert_stage(&self, stage: Stage) -> Result<(), StoreError> {
        (**self).insert_stage(stage)
    }

    fn stage(&self, id: StageId) -> Result<Option<Stage>, StoreError> {
        (**self).stage(id)
    }

    fn stage_by_name(&self, name: &str) -> Result<Option<Stage>, StoreError> {
        (**self).stage_by_name(name)
    }

    fn insert_advisor(&self, advisor: Advisor) -> Result<(), StoreError> {
        (**self).insert_advisor(advisor)
    }

    fn advisor(&self, id: UserId) -> Result<Option<Advisor>, StoreError> {
        (**self).advisor(id)
    }

    fn advisors(&self) -> Result<Vec<Advisor>, StoreError> {
        (**self).advisors()
    }
}
