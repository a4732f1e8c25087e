use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use motocrm_auth::{Actor, Role};
use motocrm_core::UserId;
use motocrm_customers::{
    ApprovalRequest, Distributor, FinancialEntity, NewCustomer, Payment, Purchase, Receipt,
    SaleState,
};
use motocrm_ledger::balance;
use motocrm_service::CustomerService;
use motocrm_store::InMemoryCustomerStore;

fn supervisor() -> Actor {
    Actor::new(UserId::new(), Role::Admin)
}

fn new_customer(i: usize) -> NewCustomer {
    NewCustomer {
        name: format!("Cliente {i}"),
        email: Some(format!("cliente{i}@example.com")),
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

fn approval_request(payments: usize) -> ApprovalRequest {
    ApprovalRequest {
        sale_state: SaleState::Aprobado,
        distributor: Distributor::new("Distribuidor Centro"),
        purchase: Purchase {
            brand: "AKT".to_string(),
            reference: "NKD 125".to_string(),
            main_color: "Negro".to_string(),
            optional_color: None,
            commercial_value: 9_500_000,
            process_value: 500_000,
            total_value: 10_000_000,
        },
        holders: vec![],
        payments: (0..payments)
            .map(|_| Payment {
                financial_entity: FinancialEntity::new("Banco Uno"),
                total_payment: 1_000_000,
                aval: 50_000,
                approval_date: None,
            })
            .collect(),
        receipts: vec![],
    }
}

/// Latency of one full approval transaction (allocation + child replacement)
/// against a store already holding a realistic customer population.
fn bench_approval_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("approval_commit");
    group.throughput(Throughput::Elements(1));

    for population in [10usize, 1_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(population),
            &population,
            |b, &population| {
                let service = CustomerService::new(InMemoryCustomerStore::with_default_stages());
                let actor = supervisor();

                let ids: Vec<_> = (0..population)
                    .map(|i| service.create_customer(new_customer(i), actor).unwrap().id)
                    .collect();
                for id in &ids[..population / 2] {
                    service
                        .approve_customer(*id, approval_request(2), actor)
                        .unwrap();
                }

                let mut next = population;
                b.iter_batched(
                    || {
                        next += 1;
                        service.create_customer(new_customer(next), actor).unwrap().id
                    },
                    |id| {
                        black_box(
                            service
                                .approve_customer(id, approval_request(2), actor)
                                .unwrap(),
                        )
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Pure ledger computation over growing payment/receipt sets.
fn bench_balance_computation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_balance");

    for records in [2usize, 20, 200] {
        let payments: Vec<Payment> = (0..records)
            .map(|_| Payment {
                financial_entity: FinancialEntity::new("Banco Uno"),
                total_payment: 1_000_000,
                aval: 50_000,
                approval_date: None,
            })
            .collect();
        let receipts: Vec<Receipt> = (0..records)
            .map(|i| Receipt {
                receipt_number: format!("RC-{i}"),
                date: Utc::now(),
                amount: 250_000,
            })
            .collect();

        group.throughput(Throughput::Elements(records as u64 * 2));
        group.bench_with_input(
            BenchmarkId::from_parameter(records),
            &records,
            |b, _| {
                b.iter(|| {
                    black_box(balance(
                        black_box(Some(10_000_000)),
                        black_box(&payments),
                        black_box(&receipts),
                    ))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_approval_commit, bench_balance_computation);
criterion_main!(benches);
