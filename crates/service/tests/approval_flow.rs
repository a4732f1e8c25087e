//! Black-box tests of the sale-approval transaction through the service.

use std::thread;

use chrono::Utc;

use motocrm_auth::{Actor, Role};
use motocrm_core::UserId;
use motocrm_customers::{
    ApprovalRequest, CustomerRecord, Distributor, FinancialEntity, Holder, NewCustomer,
    OrderNumber, Payment, Purchase, Receipt, SaleState,
};
use motocrm_service::{CustomerService, ServiceError};
use motocrm_store::{CustomerStore, InMemoryCustomerStore};

fn service() -> CustomerService<InMemoryCustomerStore> {
    motocrm_observability::init();
    CustomerService::new(InMemoryCustomerStore::with_default_stages())
}

fn supervisor() -> Actor {
    Actor::new(UserId::new(), Role::Admin)
}

fn advisor() -> Actor {
    Actor::new(UserId::new(), Role::Asesor)
}

fn new_customer(name: &str, email: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: "3200000000".to_string(),
        address: None,
        city: None,
        department: None,
        document: None,
        birthdate: None,
        advisor_id: None,
        stage_id: None,
        sale_state: None,
        sale_date: None,
        origin: None,
    }
}

fn purchase(total_value: i64) -> Purchase {
    Purchase {
        brand: "AKT".to_string(),
        reference: "NKD 125".to_string(),
        main_color: "Negro".to_string(),
        optional_color: None,
        commercial_value: total_value - 500_000,
        process_value: 500_000,
        total_value,
    }
}

fn holder(full_name: &str) -> Holder {
    Holder {
        full_name: full_name.to_string(),
        document: "100200300".to_string(),
        email: None,
        phone: None,
        address: None,
        city: None,
        financial_entity: FinancialEntity::new("Banco Uno"),
    }
}

fn payment(total_payment: i64, aval: i64) -> Payment {
    Payment {
        financial_entity: FinancialEntity::new("Banco Uno"),
        total_payment,
        aval,
        approval_date: None,
    }
}

fn approval_request(sale_state: SaleState, total_value: i64) -> ApprovalRequest {
    ApprovalRequest {
        sale_state,
        distributor: Distributor::new("Distribuidor Centro"),
        purchase: purchase(total_value),
        holders: vec![],
        payments: vec![],
        receipts: vec![],
    }
}

fn create(service: &CustomerService<InMemoryCustomerStore>, name: &str) -> CustomerRecord {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    service
        .create_customer(new_customer(name, &email), supervisor())
        .unwrap()
}

#[test]
fn first_approval_allocates_mrs0001_and_stamps_approval_date() {
    let service = service();
    let customer = create(&service, "Ana");

    let approved = service
        .approve_customer(
            customer.id,
            approval_request(SaleState::Aprobado, 10_000_000),
            supervisor(),
        )
        .unwrap();

    assert_eq!(approved.sale_state, SaleState::Aprobado);
    assert_eq!(approved.order_number.as_ref().unwrap().as_str(), "MRS0001");
    assert!(approved.approval_date.is_some());
}

#[test]
fn approvals_allocate_sequential_order_numbers() {
    let service = service();

    for (i, name) in ["Ana", "Bruno", "Carla"].iter().enumerate() {
        let customer = create(&service, name);
        let approved = service
            .approve_customer(
                customer.id,
                approval_request(SaleState::Aprobado, 10_000_000),
                supervisor(),
            )
            .unwrap();

        let expected = OrderNumber::from_sequence(i as u64 + 1);
        assert_eq!(approved.order_number, Some(expected));
    }
}

#[test]
fn re_approval_keeps_the_existing_order_number() {
    let service = service();
    let customer = create(&service, "Ana");

    let first = service
        .approve_customer(
            customer.id,
            approval_request(SaleState::Aprobado, 10_000_000),
            supervisor(),
        )
        .unwrap();

    let second = service
        .approve_customer(
            customer.id,
            approval_request(SaleState::Aprobado, 12_000_000),
            supervisor(),
        )
        .unwrap();

    assert_eq!(second.order_number, first.order_number);
}

#[test]
fn approval_replaces_children_atomically() {
    let service = service();
    let customer = create(&service, "Ana");

    let mut request = approval_request(SaleState::Aprobado, 10_000_000);
    request.holders = vec![holder("Titular Uno"), holder("Titular Dos")];
    request.payments = vec![payment(8_000_000, 500_000)];
    service
        .approve_customer(customer.id, request, supervisor())
        .unwrap();

    let view = service
        .customer_with_ledger(customer.id, supervisor())
        .unwrap();
    assert_eq!(view.aggregate.holders.len(), 2);
    assert_eq!(view.aggregate.payments.len(), 1);
    assert_eq!(view.aggregate.receipts.len(), 0);
    assert!(view.aggregate.purchase.is_some());

    // Second approval with a different child set: the old set is gone.
    let mut request = approval_request(SaleState::Aprobado, 10_000_000);
    request.receipts = vec![Receipt {
        receipt_number: "RC-1".to_string(),
        date: Utc::now(),
        amount: 1_000_000,
    }];
    service
        .approve_customer(customer.id, request, supervisor())
        .unwrap();

    let view = service
        .customer_with_ledger(customer.id, supervisor())
        .unwrap();
    assert_eq!(view.aggregate.holders.len(), 0);
    assert_eq!(view.aggregate.payments.len(), 0);
    assert_eq!(view.aggregate.receipts.len(), 1);
    assert_eq!(
        view.aggregate.purchase.as_ref().unwrap().total_value,
        10_000_000
    );
}

#[test]
fn non_approval_request_keeps_sale_state_and_allocates_nothing() {
    let service = service();
    let customer = create(&service, "Ana");

    let updated = service
        .approve_customer(
            customer.id,
            approval_request(SaleState::Rechazado, 10_000_000),
            supervisor(),
        )
        .unwrap();

    assert_eq!(updated.sale_state, customer.sale_state);
    assert_eq!(updated.order_number, None);
    assert_eq!(updated.approval_date, None);

    // The child replacement still happened.
    let view = service
        .customer_with_ledger(customer.id, supervisor())
        .unwrap();
    assert!(view.aggregate.purchase.is_some());
}

#[test]
fn approval_requires_the_capability() {
    let service = service();
    let customer = create(&service, "Ana");

    let err = service
        .approve_customer(
            customer.id,
            approval_request(SaleState::Aprobado, 10_000_000),
            advisor(),
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden));

    let err = service
        .approve_customer(
            customer.id,
            approval_request(SaleState::Aprobado, 10_000_000),
            Actor::new(UserId::new(), Role::Auxiliar),
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden));
}

#[test]
fn approving_a_missing_customer_is_not_found() {
    let service = service();

    let err = service
        .approve_customer(
            motocrm_core::CustomerId::new(),
            approval_request(SaleState::Aprobado, 10_000_000),
            supervisor(),
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
}

#[test]
fn concurrent_first_approvals_never_share_an_order_number() {
    let store = InMemoryCustomerStore::with_default_stages();
    let service = CustomerService::new(store);

    let ana = create(&service, "Ana");
    let bruno = create(&service, "Bruno");

    thread::scope(|scope| {
        let approve = |id| {
            let service = &service;
            scope.spawn(move || {
                service
                    .approve_customer(
                        id,
                        approval_request(SaleState::Aprobado, 10_000_000),
                        supervisor(),
                    )
                    .unwrap()
            })
        };

        let first = approve(ana.id);
        let second = approve(bruno.id);
        first.join().unwrap();
        second.join().unwrap();
    });

    let ana_number = service
        .store()
        .customer(ana.id)
        .unwrap()
        .unwrap()
        .order_number
        .unwrap();
    let bruno_number = service
        .store()
        .customer(bruno.id)
        .unwrap()
        .unwrap()
        .order_number
        .unwrap();

    assert_ne!(ana_number, bruno_number);
    let mut numbers = [ana_number.as_str().to_string(), bruno_number.as_str().to_string()];
    numbers.sort();
    assert_eq!(numbers, ["MRS0001".to_string(), "MRS0002".to_string()]);
}

#[test]
fn ledger_reflects_the_latest_approved_child_set() {
    let service = service();
    let customer = create(&service, "Ana");

    let mut request = approval_request(SaleState::Aprobado, 10_000_000);
    request.payments = vec![payment(8_000_000, 500_000)];
    request.receipts = vec![Receipt {
        receipt_number: "RC-1".to_string(),
        date: Utc::now(),
        amount: 1_000_000,
    }];
    service
        .approve_customer(customer.id, request, supervisor())
        .unwrap();

    let view = service
        .customer_with_ledger(customer.id, supervisor())
        .unwrap();
    assert_eq!(view.balance.outstanding, 1_500_000);
    assert_eq!(view.balance.credit, 0);

    // Registering one more receipt closes the balance on the next read.
    service
        .register_payment(
            customer.id,
            Receipt {
                receipt_number: "RC-2".to_string(),
                date: Utc::now(),
                amount: 1_500_000,
            },
            Actor::new(UserId::new(), Role::Auxiliar),
        )
        .unwrap();

    let view = service
        .customer_with_ledger(customer.id, supervisor())
        .unwrap();
    assert_eq!(view.balance.outstanding, 0);
    assert_eq!(view.balance.credit, 0);
}
