//! `motocrm-customers` — the customer sale/delivery domain.
//!
//! Holds the customer record and its value-like child records, the funnel
//! stages, the sale/delivery state machine, and the order-number allocator.
//! Everything here is pure: persistence lives in `motocrm-store`,
//! orchestration in `motocrm-service`.

pub mod approval;
pub mod children;
pub mod customer;
pub mod order_number;
pub mod stage;
pub mod state_machine;

pub use approval::ApprovalRequest;
pub use children::{Comment, Holder, Invoice, NewInvoice, NewRegistration, Payment, Purchase, Receipt, Registration};
pub use customer::{
    CustomerChanges, CustomerRecord, DeliveryState, Distributor, FinancialEntity, NewCustomer,
    Origin, SaleState,
};
pub use order_number::OrderNumber;
pub use stage::{Stage, StageId, ADVISOR_EXCLUDED_STAGES, DEFAULT_STAGE_NAME};
pub use state_machine::resolve_sale_state;
