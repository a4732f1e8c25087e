use serde::{Deserialize, Serialize};

use motocrm_customers::{Payment, Receipt};

/// Outstanding/credit balance of a customer.
///
/// At most one side is ever non-zero: a customer either still owes money or
/// has overpaid, never both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Amount still owed toward the total purchase value.
    pub outstanding: i64,
    /// Amount overpaid relative to the total purchase value.
    pub credit: i64,
}

/// Compute the outstanding and credit balance.
///
/// `net = total_purchase − (Σ(total_payment − aval) + Σ receipt.amount)`;
/// `outstanding = max(net, 0)`, `credit = max(−net, 0)`. A customer without
/// a purchase record contributes a total of zero. Sums are commutative, so
/// the result does not depend on record ordering.
///
/// Accumulation is widened to i128 so pathological inputs cannot overflow
/// mid-sum; the result saturates back into i64.
pub fn balance(total_purchase_value: Option<i64>, payments: &[Payment], receipts: &[Receipt]) -> Balance {
    let total_purchase = i128::from(total_purchase_value.unwrap_or(0));

    let total_payments: i128 = payments
        .iter()
        .map(|p| i128::from(p.total_payment) - i128::from(p.aval))
        .sum();

    let total_receipts: i128 = receipts.iter().map(|r| i128::from(r.amount)).sum();

    let net = total_purchase - (total_payments + total_receipts);

    Balance {
        outstanding: clamp_non_negative(net),
        credit: clamp_non_negative(-net),
    }
}

fn clamp_non_negative(value: i128) -> i64 {
    value.clamp(0, i128::from(i64::MAX)) as i64
}
