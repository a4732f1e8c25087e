//! `motocrm-service` — application-level orchestration.
//!
//! Composes the state machine, the order-number allocator and the store's
//! transactional contract into the operations the API layer consumes. This
//! crate contains no IO of its own beyond the injected store.

pub mod customers;
pub mod error;
pub mod statistics;
pub mod views;

pub use customers::CustomerService;
pub use error::ServiceError;
pub use statistics::{AdvisorCount, StatisticsQuery};
pub use views::{BalanceSummary, CustomerView, CustomerWithBalance};
