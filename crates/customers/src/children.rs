//! Value-like child records owned exclusively by a customer.
//!
//! Holders, payments, receipts and the purchase have no identity that
//! survives an approval: the whole set is destroyed and recreated from the
//! request payload on every approval call. Invoice and registration are the
//! single authoritative per-customer records governed by their own
//! get-or-create-or-update rule and are never touched by the approval
//! transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motocrm_core::UserId;

use crate::customer::FinancialEntity;

/// The vehicle purchase attached to a customer. Exactly one per customer at
/// any time after the first approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub brand: String,
    pub reference: String,
    pub main_color: String,
    #[serde(default)]
    pub optional_color: Option<String>,
    /// Amounts in the smallest currency unit.
    pub commercial_value: i64,
    pub process_value: i64,
    /// Basis of the outstanding-balance computation.
    pub total_value: i64,
}

/// A credit holder backing the purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub full_name: String,
    pub document: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub financial_entity: FinancialEntity,
}

/// A financing payment. `aval` is the guarantee amount subtracted from this
/// payment's contribution to the outstanding balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub financial_entity: FinancialEntity,
    pub total_payment: i64,
    pub aval: i64,
    #[serde(default)]
    pub approval_date: Option<DateTime<Utc>>,
}

impl Payment {
    /// Contribution of this payment to payments-received.
    pub fn net_contribution(&self) -> i64 {
        self.total_payment - self.aval
    }
}

/// A cash receipt. Contributes fully (no aval deduction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub date: DateTime<Utc>,
    pub amount: i64,
}

/// The authoritative invoice for a customer's vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub date: DateTime<Utc>,
    pub value: i64,
    pub chassis_number: String,
    pub engine_number: String,
    pub created_at: DateTime<Utc>,
}

/// Invoice intake payload (creation timestamp is assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub date: DateTime<Utc>,
    pub value: i64,
    pub chassis_number: String,
    pub engine_number: String,
}

/// The authoritative vehicle registration for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub plate: String,
    pub date: DateTime<Utc>,
    pub soat_value: i64,
    pub register_value: i64,
    pub created_at: DateTime<Utc>,
}

/// Registration intake payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub plate: String,
    pub date: DateTime<Utc>,
    pub soat_value: i64,
    pub register_value: i64,
}

/// A free-text note on a customer, with an optional sale-state side effect
/// handled by the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub description: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}
