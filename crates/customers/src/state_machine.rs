//! Sale/delivery state transitions.
//!
//! Every mutation path (create, update, comment, approval) funnels its
//! sale-state decision through this module so the precedence rules live in
//! one place instead of being repeated per call site.

use motocrm_core::{DomainError, DomainResult};

use crate::customer::{CustomerChanges, CustomerRecord, DeliveryState, SaleState};
use crate::stage::StageId;

/// Resolve the sale state a partial update must persist.
///
/// Precedence, highest first:
/// 1. Delivery moving to `ENTREGADO`: the sale state is retained as-is.
///    Requires a plate number, either in the same update or already on file.
/// 2. Delivery moving to `PENDIENTE_ENTREGA`: review is reopened, the sale
///    state is forced back to `PENDIENTE_POR_APROBAR`.
/// 3. Entering the sale-review stage: forced to `PENDIENTE_POR_APROBAR`,
///    overriding any explicit `sale_state` in the same payload.
/// 4. Otherwise: the requested sale state, defaulting to the current one.
///
/// `APROBADO` cannot be reached here; only the approval transaction promotes
/// a customer, and an explicit `APROBADO` in a plain update is rejected
/// unless it merely restates the stored value.
pub fn resolve_sale_state(
    current: &CustomerRecord,
    changes: &CustomerChanges,
) -> DomainResult<SaleState> {
    let delivery_transition = changes
        .delivery_state
        .filter(|_| changes.changes_delivery_state(current));

    match delivery_transition {
        Some(DeliveryState::Entregado) => {
            let has_plate = changes.plate_number.is_some() || current.plate_number.is_some();
            if !has_plate {
                return Err(DomainError::validation(
                    "a delivered customer must have a plate number",
                ));
            }
            Ok(current.sale_state)
        }
        Some(DeliveryState::PendienteEntrega) => Ok(SaleState::PendientePorAprobar),
        None => {
            if changes.stage_id == Some(StageId::SALE_REVIEW) {
                return Ok(SaleState::PendientePorAprobar);
            }

            match changes.sale_state {
                Some(SaleState::Aprobado) if current.sale_state != SaleState::Aprobado => {
                    Err(DomainError::invariant(
                        "sale state APROBADO is only reachable through the approval transaction",
                    ))
                }
                Some(requested) => Ok(requested),
                None => Ok(current.sale_state),
            }
        }
    }
}
