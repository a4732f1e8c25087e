//! Customer operations.
//!
//! Every operation takes the acting user and runs its capability check
//! through `motocrm_auth::authorize` before touching the store. Mutations
//! that depend on current state go through the store's atomic
//! read-modify-write methods so no decision is ever made on a stale row.

use chrono::Utc;

use motocrm_auth::{allows, authorize, Actor, Capability, Role};
use motocrm_core::{CustomerId, DomainError, UserId};
use motocrm_customers::{
    resolve_sale_state, ApprovalRequest, Comment, CustomerChanges, CustomerRecord, Invoice,
    NewCustomer, NewInvoice, NewRegistration, OrderNumber, Receipt, Registration, SaleState,
    StageId, ADVISOR_EXCLUDED_STAGES, DEFAULT_STAGE_NAME,
};
use motocrm_ledger::balance;
use motocrm_store::{ApprovalWrite, CustomerAggregate, CustomerStore};

use crate::error::ServiceError;
use crate::views::{BalanceSummary, CustomerView, CustomerWithBalance};

/// Application service over a transactional customer store.
pub struct CustomerService<S> {
    store: S,
}

impl<S: CustomerStore> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Intake & profile ────────────────────────────────────────────────

    /// Create a customer.
    ///
    /// Advisors are always self-assigned (without an assignment timestamp);
    /// supervisors assigning an advisor stamp `assigned_at`. The sale state
    /// from the payload is honored only for supervisors.
    pub fn create_customer(
        &self,
        new: NewCustomer,
        actor: Actor,
    ) -> Result<CustomerRecord, ServiceError> {
        let now = Utc::now();

        let (advisor_id, assigned_at) = match actor.role {
            Role::Asesor => (Some(actor.user_id), None),
            role if role.is_supervisor() && new.advisor_id.is_some() => {
                (new.advisor_id, Some(now))
            }
            _ => (new.advisor_id, None),
        };

        let stage_id = match new.stage_id {
            Some(id) => id,
            None => {
                self.store
                    .stage_by_name(DEFAULT_STAGE_NAME)?
                    .ok_or_else(|| {
                        ServiceError::Validation(format!(
                            "default stage '{DEFAULT_STAGE_NAME}' is not seeded"
                        ))
                    })?
                    .id
            }
        };

        let sale_state = if actor.role.is_supervisor() {
            new.sale_state.unwrap_or(SaleState::Na)
        } else {
            SaleState::Na
        };

        let record = CustomerRecord {
            id: CustomerId::new(),
            advisor_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            city: new.city,
            department: new.department,
            document: new.document,
            birthdate: new.birthdate,
            stage_id,
            sale_state,
            delivery_state: None,
            sale_date: new.sale_date,
            delivery_date: None,
            order_number: None,
            plate_number: None,
            origin: new.origin.unwrap_or_default(),
            distributor: None,
            assigned_at,
            approval_date: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_customer(record)?;
        tracing::info!(customer_id = %created.id, stage_id = %created.stage_id, "customer created");
        Ok(created)
    }

    /// Apply a partial update, resolving the sale state through the state
    /// machine inside the store's atomic unit.
    pub fn update_customer(
        &self,
        id: CustomerId,
        changes: CustomerChanges,
        _actor: Actor,
    ) -> Result<CustomerRecord, ServiceError> {
        let updated = self.store.update_customer(id, |current| {
            let sale_state = resolve_sale_state(current, &changes)?;

            let mut updated = current.clone();
            if let Some(name) = changes.name {
                updated.name = name;
            }
            if let Some(email) = changes.email {
                updated.email = Some(email);
            }
            if let Some(phone) = changes.phone {
                updated.phone = phone;
            }
            if let Some(address) = changes.address {
                updated.address = Some(address);
            }
            if let Some(city) = changes.city {
                updated.city = Some(city);
            }
            if let Some(department) = changes.department {
                updated.department = Some(department);
            }
            if let Some(document) = changes.document {
                updated.document = Some(document);
            }
            if let Some(birthdate) = changes.birthdate {
                updated.birthdate = Some(birthdate);
            }
            if let Some(advisor_id) = changes.advisor_id {
                updated.advisor_id = Some(advisor_id);
            }
            if let Some(stage_id) = changes.stage_id {
                updated.stage_id = stage_id;
            }
            if let Some(delivery_state) = changes.delivery_state {
                updated.delivery_state = Some(delivery_state);
            }
            if let Some(sale_date) = changes.sale_date {
                updated.sale_date = Some(sale_date);
            }
            if let Some(delivery_date) = changes.delivery_date {
                updated.delivery_date = Some(delivery_date);
            }
            if let Some(plate_number) = changes.plate_number {
                updated.plate_number = Some(plate_number);
            }
            if let Some(origin) = changes.origin {
                updated.origin = origin;
            }
            updated.sale_state = sale_state;

            Ok(updated)
        })?;

        Ok(updated)
    }

    pub fn delete_customer(&self, id: CustomerId, actor: Actor) -> Result<(), ServiceError> {
        authorize(actor.role, Capability::DeleteCustomer)?;
        self.store.delete_customer(id)?;
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    /// Record a comment. A `RECHAZADO` sale state riding on the comment is
    /// applied only when the actor may change sale states; otherwise the
    /// comment is stored without mutating the customer.
    pub fn add_comment(
        &self,
        id: CustomerId,
        description: String,
        sale_state: Option<SaleState>,
        actor: Actor,
    ) -> Result<Comment, ServiceError> {
        let side_effect = match sale_state {
            Some(SaleState::Rechazado) if allows(actor.role, Capability::ChangeSaleState) => {
                Some(SaleState::Rechazado)
            }
            _ => None,
        };

        let comment = Comment {
            description,
            created_by: actor.user_id,
            created_at: Utc::now(),
        };

        let stored = self.store.add_comment(id, comment, side_effect)?;
        if side_effect.is_some() {
            tracing::info!(customer_id = %id, "sale rejected via review comment");
        }
        Ok(stored)
    }

    // ── Assignment ──────────────────────────────────────────────────────

    pub fn assign_advisor(
        &self,
        id: CustomerId,
        advisor_id: UserId,
        actor: Actor,
    ) -> Result<CustomerRecord, ServiceError> {
        authorize(actor.role, Capability::AssignAdvisor)?;

        let updated = self.store.assign_advisor(&[id], advisor_id, Utc::now())?;
        if updated == 0 {
            return Err(ServiceError::NotFound);
        }
        self.store.customer(id)?.ok_or(ServiceError::NotFound)
    }

    /// Bulk reassignment. Unknown ids are skipped; the count of rows actually
    /// pointed at the advisor is returned.
    pub fn assign_many(
        &self,
        ids: &[CustomerId],
        advisor_id: UserId,
        actor: Actor,
    ) -> Result<usize, ServiceError> {
        authorize(actor.role, Capability::AssignAdvisor)?;
        Ok(self.store.assign_advisor(ids, advisor_id, Utc::now())?)
    }

    // ── Approval transaction ────────────────────────────────────────────

    /// Execute the sale-approval transaction: allocate the order number when
    /// first approving, update the customer row, and atomically replace the
    /// purchase, holders, payments and receipts from the request payload.
    pub fn approve_customer(
        &self,
        id: CustomerId,
        request: ApprovalRequest,
        actor: Actor,
    ) -> Result<CustomerRecord, ServiceError> {
        authorize(actor.role, Capability::ApproveSale)?;

        let now = Utc::now();
        let updated = self.store.commit_approval(id, move |current, max| {
            let approving = request.is_approving();

            let order_number = match (&current.order_number, approving) {
                (Some(existing), _) => Some(existing.clone()),
                (None, true) => Some(OrderNumber::next(max)),
                (None, false) => None,
            };

            Ok(ApprovalWrite {
                // A non-approval request through this path never downgrades
                // the stored sale state.
                sale_state: if approving {
                    SaleState::Aprobado
                } else {
                    current.sale_state
                },
                order_number,
                distributor: Some(request.distributor),
                approval_date: if approving { Some(now) } else { None },
                purchase: request.purchase,
                holders: request.holders,
                payments: request.payments,
                receipts: request.receipts,
            })
        })?;

        tracing::info!(
            customer_id = %id,
            sale_state = %updated.sale_state,
            order_number = updated.order_number.as_ref().map(|n| n.as_str()),
            "approval committed"
        );
        Ok(updated)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// A single customer with children and computed balances. Advisors may
    /// only read their own customers.
    pub fn customer_with_ledger(
        &self,
        id: CustomerId,
        actor: Actor,
    ) -> Result<CustomerView, ServiceError> {
        let aggregate = self.store.aggregate(id)?.ok_or(ServiceError::NotFound)?;

        if actor.role == Role::Asesor && aggregate.customer.advisor_id != Some(actor.user_id) {
            return Err(ServiceError::Forbidden);
        }

        Ok(view_of(aggregate))
    }

    /// Active funnel customers: everything except fully delivered ones.
    ///
    /// Supervisors see all, newest activity first. Advisors see their own
    /// portfolio minus closed-lead stages, with not-yet-contacted customers
    /// first (most recently assigned on top), then the rest by activity.
    pub fn active_customers(&self, actor: Actor) -> Result<Vec<CustomerRecord>, ServiceError> {
        let mut customers: Vec<CustomerRecord> = self
            .store
            .aggregates()?
            .into_iter()
            .map(|a| a.customer)
            .filter(|c| !c.is_finalized())
            .collect();

        if allows(actor.role, Capability::ViewAllCustomers) {
            customers.sort_by(|a, b| {
                (b.updated_at, b.created_at).cmp(&(a.updated_at, a.created_at))
            });
            return Ok(customers);
        }

        customers.retain(|c| c.advisor_id == Some(actor.user_id));

        let mut excluded_stage_ids: Vec<StageId> = Vec::new();
        for name in ADVISOR_EXCLUDED_STAGES {
            if let Some(stage) = self.store.stage_by_name(name)? {
                excluded_stage_ids.push(stage.id);
            }
        }
        let default_stage_id = self.store.stage_by_name(DEFAULT_STAGE_NAME)?.map(|s| s.id);
        customers.retain(|c| !excluded_stage_ids.contains(&c.stage_id));

        let (mut uncontacted, mut rest): (Vec<_>, Vec<_>) = customers
            .into_iter()
            .partition(|c| Some(c.stage_id) == default_stage_id);

        uncontacted.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        rest.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        uncontacted.extend(rest);
        Ok(uncontacted)
    }

    /// Fully delivered customers (sale-review stage with a plate on file).
    pub fn delivered_customers(
        &self,
        actor: Actor,
    ) -> Result<Vec<CustomerAggregate>, ServiceError> {
        let mut delivered: Vec<CustomerAggregate> = self
            .store
            .aggregates()?
            .into_iter()
            .filter(|a| a.customer.is_finalized())
            .filter(|a| {
                allows(actor.role, Capability::ViewAllCustomers)
                    || a.customer.advisor_id == Some(actor.user_id)
            })
            .collect();

        delivered.sort_by(|a, b| b.customer.updated_at.cmp(&a.customer.updated_at));
        Ok(delivered)
    }

    /// Approved, not-yet-delivered customers with computed balances.
    pub fn approved_customers(
        &self,
        actor: Actor,
    ) -> Result<Vec<CustomerWithBalance>, ServiceError> {
        authorize(actor.role, Capability::ViewApprovedCustomers)?;

        let mut approved: Vec<CustomerAggregate> = self
            .store
            .aggregates()?
            .into_iter()
            .filter(|a| a.customer.is_approved() && !a.customer.is_delivered())
            .filter(|a| {
                actor.role != Role::Asesor || a.customer.advisor_id == Some(actor.user_id)
            })
            .collect();

        approved.sort_by(|a, b| b.customer.updated_at.cmp(&a.customer.updated_at));

        Ok(approved
            .into_iter()
            .map(|aggregate| {
                let balance = balance_of(&aggregate);
                CustomerWithBalance { aggregate, balance }
            })
            .collect())
    }

    /// Customers waiting in the sale-review queue.
    pub fn sale_queue(&self, actor: Actor) -> Result<Vec<CustomerRecord>, ServiceError> {
        authorize(actor.role, Capability::ViewSaleQueue)?;

        let mut queue: Vec<CustomerRecord> = self
            .store
            .aggregates()?
            .into_iter()
            .map(|a| a.customer)
            .filter(|c| {
                c.stage_id == StageId::SALE_REVIEW
                    && matches!(
                        c.sale_state,
                        SaleState::PendientePorAprobar | SaleState::Rechazado
                    )
                    && !c.is_delivered()
            })
            .collect();

        queue.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(queue)
    }

    /// Balance lookup by order number.
    pub fn customer_by_order_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<BalanceSummary, ServiceError> {
        let aggregate = self
            .store
            .find_by_order_number(order_number)?
            .ok_or(ServiceError::NotFound)?;

        let balance = balance_of(&aggregate);
        Ok(BalanceSummary {
            customer_id: aggregate.customer.id,
            order_number: order_number.clone(),
            name: aggregate.customer.name,
            balance,
        })
    }

    // ── Back office: receipts, invoice, registration ────────────────────

    /// Register a cash payment as a receipt against the customer.
    pub fn register_payment(
        &self,
        id: CustomerId,
        receipt: Receipt,
        actor: Actor,
    ) -> Result<Receipt, ServiceError> {
        authorize(actor.role, Capability::RegisterPayment)?;
        Ok(self.store.append_receipt(id, receipt)?)
    }

    pub fn invoice_by_order_number(
        &self,
        order_number: &OrderNumber,
        actor: Actor,
    ) -> Result<Option<Invoice>, ServiceError> {
        authorize(actor.role, Capability::ViewInvoice)?;

        let aggregate = self
            .store
            .find_by_order_number(order_number)?
            .ok_or(ServiceError::NotFound)?;
        Ok(aggregate.invoice)
    }

    /// Create the customer's invoice, or update it when one exists.
    /// Creation is open to the back office; updating is reserved to the
    /// super admin. The existence check and the write happen in one unit.
    pub fn upsert_invoice_by_order_number(
        &self,
        order_number: &OrderNumber,
        new: NewInvoice,
        actor: Actor,
    ) -> Result<Invoice, ServiceError> {
        let customer = self
            .store
            .find_by_order_number(order_number)?
            .ok_or(ServiceError::NotFound)?
            .customer;

        let now = Utc::now();
        let invoice = self.store.upsert_invoice(customer.id, move |current| {
            let capability = if current.is_some() {
                Capability::UpdateInvoice
            } else {
                Capability::CreateInvoice
            };
            if !allows(actor.role, capability) {
                return Err(DomainError::Forbidden);
            }

            Ok(Invoice {
                invoice_number: new.invoice_number,
                date: new.date,
                value: new.value,
                chassis_number: new.chassis_number,
                engine_number: new.engine_number,
                created_at: current.map(|i| i.created_at).unwrap_or(now),
            })
        })?;

        Ok(invoice)
    }

    pub fn registration_by_order_number(
        &self,
        order_number: &OrderNumber,
        actor: Actor,
    ) -> Result<Option<Registration>, ServiceError> {
        authorize(actor.role, Capability::ViewRegistration)?;

        let aggregate = self
            .store
            .find_by_order_number(order_number)?
            .ok_or(ServiceError::NotFound)?;
        Ok(aggregate.registration)
    }

    /// Create or update the customer's vehicle registration, mirroring the
    /// invoice rules.
    pub fn upsert_registration_by_order_number(
        &self,
        order_number: &OrderNumber,
        new: NewRegistration,
        actor: Actor,
    ) -> Result<Registration, ServiceError> {
        let customer = self
            .store
            .find_by_order_number(order_number)?
            .ok_or(ServiceError::NotFound)?
            .customer;

        let now = Utc::now();
        let registration = self
            .store
            .upsert_registration(customer.id, move |current| {
                let capability = if current.is_some() {
                    Capability::UpdateRegistration
                } else {
                    Capability::CreateRegistration
                };
                if !allows(actor.role, capability) {
                    return Err(DomainError::Forbidden);
                }

                Ok(Registration {
                    plate: new.plate,
                    date: new.date,
                    soat_value: new.soat_value,
                    register_value: new.register_value,
                    created_at: current.map(|r| r.created_at).unwrap_or(now),
                })
            })?;

        Ok(registration)
    }
}

fn balance_of(aggregate: &CustomerAggregate) -> motocrm_ledger::Balance {
    balance(
        aggregate.purchase.as_ref().map(|p| p.total_value),
        &aggregate.payments,
        &aggregate.receipts,
    )
}

fn view_of(aggregate: CustomerAggregate) -> CustomerView {
    let balance = balance_of(&aggregate);
    let is_ready_for_process =
        aggregate.has_invoice() && aggregate.has_registration() && balance.outstanding == 0;

    CustomerView {
        aggregate,
        balance,
        is_ready_for_process,
    }
}
