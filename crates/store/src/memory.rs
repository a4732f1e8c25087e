use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use motocrm_core::{CustomerId, DomainError, UserId};
use motocrm_customers::{
    Comment, CustomerRecord, Holder, Invoice, OrderNumber, Payment, Purchase, Receipt,
    Registration, SaleState, Stage, StageId, DEFAULT_STAGE_NAME,
};

use crate::records::{Advisor, ApprovalWrite, CustomerAggregate};
use crate::store::{CustomerStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    customers: HashMap<CustomerId, CustomerRecord>,
    purchases: HashMap<CustomerId, Purchase>,
    holders: HashMap<CustomerId, Vec<Holder>>,
    payments: HashMap<CustomerId, Vec<Payment>>,
    receipts: HashMap<CustomerId, Vec<Receipt>>,
    invoices: HashMap<CustomerId, Invoice>,
    registrations: HashMap<CustomerId, Registration>,
    comments: HashMap<CustomerId, Vec<Comment>>,
    stages: HashMap<StageId, Stage>,
    advisors: HashMap<UserId, Advisor>,
}

/// In-memory customer store.
///
/// Intended for tests/dev. A single `RwLock` serializes every write unit, so
/// the approval transaction's read of the maximum order number and its
/// eventual write are trivially isolated from concurrent approvals.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    inner: RwLock<Inner>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the standard funnel stages, including the
    /// default intake stage and the sale-review stage.
    pub fn with_default_stages() -> Self {
        let mut inner = Inner::default();
        let stages = [
            Stage { id: StageId(1), name: DEFAULT_STAGE_NAME.to_string() },
            Stage { id: StageId(7), name: "NO INTERESADO".to_string() },
            Stage { id: StageId(8), name: "REPORTADO".to_string() },
            Stage { id: StageId(9), name: "FUERA DE CUNDINAMARCA".to_string() },
            Stage { id: StageId::SALE_REVIEW, name: "Venta".to_string() },
        ];
        for stage in stages {
            inner.stages.insert(stage.id, stage);
        }
        Self { inner: RwLock::new(inner) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

fn aggregate_of(inner: &Inner, customer: &CustomerRecord) -> CustomerAggregate {
    let id = customer.id;
    CustomerAggregate {
        customer: customer.clone(),
        purchase: inner.purchases.get(&id).cloned(),
        holders: inner.holders.get(&id).cloned().unwrap_or_default(),
        payments: inner.payments.get(&id).cloned().unwrap_or_default(),
        receipts: inner.receipts.get(&id).cloned().unwrap_or_default(),
        invoice: inner.invoices.get(&id).cloned(),
        registration: inner.registrations.get(&id).cloned(),
        comments: inner.comments.get(&id).cloned().unwrap_or_default(),
    }
}

fn max_order_number_of(inner: &Inner) -> Option<OrderNumber> {
    inner
        .customers
        .values()
        .filter_map(|c| c.order_number.as_ref())
        .max_by_key(|n| n.sequence())
        .cloned()
}

fn email_taken(inner: &Inner, email: &str, except: Option<CustomerId>) -> bool {
    inner
        .customers
        .values()
        .any(|c| Some(c.id) != except && c.email.as_deref() == Some(email))
}

impl CustomerStore for InMemoryCustomerStore {
    fn customer(&self, id: CustomerId) -> Result<Option<CustomerRecord>, StoreError> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    fn aggregate(&self, id: CustomerId) -> Result<Option<CustomerAggregate>, StoreError> {
        let inner = self.read()?;
        Ok(inner.customers.get(&id).map(|c| aggregate_of(&inner, c)))
    }

    fn aggregates(&self) -> Result<Vec<CustomerAggregate>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .customers
            .values()
            .map(|c| aggregate_of(&inner, c))
            .collect())
    }

    fn find_by_order_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<CustomerAggregate>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .customers
            .values()
            .find(|c| c.order_number.as_ref() == Some(order_number))
            .map(|c| aggregate_of(&inner, c)))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<CustomerRecord>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .customers
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    fn max_order_number(&self) -> Result<Option<OrderNumber>, StoreError> {
        Ok(max_order_number_of(&*self.read()?))
    }

    fn insert_customer(&self, record: CustomerRecord) -> Result<CustomerRecord, StoreError> {
        let mut inner = self.write()?;

        if let Some(email) = record.email.as_deref() {
            if email_taken(&inner, email, None) {
                return Err(StoreError::DuplicateEmail(email.to_string()));
            }
        }

        inner.customers.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_customer<F>(&self, id: CustomerId, apply: F) -> Result<CustomerRecord, StoreError>
    where
        F: FnOnce(&CustomerRecord) -> Result<CustomerRecord, DomainError>,
    {
        let mut inner = self.write()?;

        let current = inner.customers.get(&id).ok_or(StoreError::NotFound)?;
        let mut updated = apply(current)?;
        updated.id = id;

        if let Some(email) = updated.email.as_deref() {
            if email_taken(&inner, email, Some(id)) {
                return Err(StoreError::DuplicateEmail(email.to_string()));
            }
        }

        updated.updated_at = Utc::now();
        inner.customers.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete_customer(&self, id: CustomerId) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        inner.customers.remove(&id).ok_or(StoreError::NotFound)?;
        inner.purchases.remove(&id);
        inner.holders.remove(&id);
        inner.payments.remove(&id);
        inner.receipts.remove(&id);
        inner.invoices.remove(&id);
        inner.registrations.remove(&id);
        inner.comments.remove(&id);
        Ok(())
    }

    fn add_comment(
        &self,
        id: CustomerId,
        comment: Comment,
        sale_state: Option<SaleState>,
    ) -> Result<Comment, StoreError> {
        let mut inner = self.write()?;

        let customer = inner.customers.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(state) = sale_state {
            customer.sale_state = state;
        }
        customer.updated_at = Utc::now();

        inner.comments.entry(id).or_default().push(comment.clone());
        Ok(comment)
    }

    fn assign_advisor(
        &self,
        ids: &[CustomerId],
        advisor_id: UserId,
        assigned_at: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut inner = self.write()?;

        let mut updated = 0;
        for id in ids {
            if let Some(customer) = inner.customers.get_mut(id) {
                customer.advisor_id = Some(advisor_id);
                customer.assigned_at = Some(assigned_at);
                customer.updated_at = Utc::now();
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn commit_approval<F>(&self, id: CustomerId, decide: F) -> Result<CustomerRecord, StoreError>
    where
        F: FnOnce(&CustomerRecord, Option<&OrderNumber>) -> Result<ApprovalWrite, DomainError>,
    {
        let mut inner = self.write()?;

        let current = inner.customers.get(&id).ok_or(StoreError::NotFound)?.clone();
        let max = max_order_number_of(&inner);

        let write = decide(&current, max.as_ref())?;

        // Invariant: once assigned, the order number never changes.
        if let Some(existing) = current.order_number.as_ref() {
            if write.order_number.as_ref() != Some(existing) {
                return Err(DomainError::invariant("order number is immutable once assigned").into());
            }
        }

        if let Some(n) = write.order_number.as_ref() {
            let taken = inner
                .customers
                .values()
                .any(|c| c.id != id && c.order_number.as_ref() == Some(n));
            if taken {
                return Err(StoreError::DuplicateOrderNumber(n.clone()));
            }
        }

        // No fallible step beyond this point: apply the whole write-set.
        let mut updated = current;
        updated.sale_state = write.sale_state;
        updated.order_number = write.order_number;
        updated.distributor = write.distributor;
        updated.approval_date = write.approval_date;
        updated.updated_at = Utc::now();

        inner.customers.insert(id, updated.clone());
        inner.purchases.insert(id, write.purchase);
        inner.holders.insert(id, write.holders);
        inner.payments.insert(id, write.payments);
        inner.receipts.insert(id, write.receipts);

        Ok(updated)
    }

    fn append_receipt(&self, id: CustomerId, receipt: Receipt) -> Result<Receipt, StoreError> {
        let mut inner = self.write()?;

        if !inner.customers.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        inner.receipts.entry(id).or_default().push(receipt.clone());
        Ok(receipt)
    }

    fn upsert_invoice<F>(&self, id: CustomerId, decide: F) -> Result<Invoice, StoreError>
    where
        F: FnOnce(Option<&Invoice>) -> Result<Invoice, DomainError>,
    {
        let mut inner = self.write()?;

        if !inner.customers.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        let invoice = decide(inner.invoices.get(&id))?;
        inner.invoices.insert(id, invoice.clone());
        Ok(invoice)
    }

    fn upsert_registration<F>(&self, id: CustomerId, decide: F) -> Result<Registration, StoreError>
    where
        F: FnOnce(Option<&Registration>) -> Result<Registration, DomainError>,
    {
        let mut inner = self.write()?;

        if !inner.customers.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        let registration = decide(inner.registrations.get(&id))?;
        inner.registrations.insert(id, registration.clone());
        Ok(registration)
    }

    fn insert_stage(&self, stage: Stage) -> Result<(), StoreError> {
        self.write()?.stages.insert(stage.id, stage);
        Ok(())
    }

    fn stage(&self, id: StageId) -> Result<Option<Stage>, StoreError> {
        Ok(self.read()?.stages.get(&id).cloned())
    }

    fn stage_by_name(&self, name: &str) -> Result<Option<Stage>, StoreError> {
        let inner = self.read()?;
        Ok(inner.stages.values().find(|s| s.name == name).cloned())
    }

    fn insert_advisor(&self, advisor: Advisor) -> Result<(), StoreError> {
        self.write()?.advisors.insert(advisor.id, advisor);
        Ok(())
    }

    fn advisor(&self, id: UserId) -> Result<Option<Advisor>, StoreError> {
        Ok(self.read()?.advisors.get(&id).cloned())
    }

    fn advisors(&self) -> Result<Vec<Advisor>, StoreError> {
        Ok(self.read()?.advisors.values().cloned().collect())
    }
}
