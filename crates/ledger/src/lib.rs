//! `motocrm-ledger` — derived financial balances.
//!
//! Pure computation over a customer's purchase, payments and receipts.
//! Balances are recomputed on every read and never persisted, so they always
//! reflect the latest recorded payment/receipt set.

pub mod balance;

pub use balance::{balance, Balance};
