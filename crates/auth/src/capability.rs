use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// An operation a caller may or may not perform.
///
/// Every mutation path checks its capability here instead of repeating
/// role-list literals per call site, so the role → operation matrix lives in
/// exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ApproveSale,
    ChangeSaleState,
    AssignAdvisor,
    DeleteCustomer,
    RegisterPayment,
    CreateInvoice,
    UpdateInvoice,
    ViewInvoice,
    CreateRegistration,
    UpdateRegistration,
    ViewRegistration,
    ViewSaleQueue,
    ViewApprovedCustomers,
    ViewAllCustomers,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ApproveSale => "approve_sale",
            Capability::ChangeSaleState => "change_sale_state",
            Capability::AssignAdvisor => "assign_advisor",
            Capability::DeleteCustomer => "delete_customer",
            Capability::RegisterPayment => "register_payment",
            Capability::CreateInvoice => "create_invoice",
            Capability::UpdateInvoice => "update_invoice",
            Capability::ViewInvoice => "view_invoice",
            Capability::CreateRegistration => "create_registration",
            Capability::UpdateRegistration => "update_registration",
            Capability::ViewRegistration => "view_registration",
            Capability::ViewSaleQueue => "view_sale_queue",
            Capability::ViewApprovedCustomers => "view_approved_customers",
            Capability::ViewAllCustomers => "view_all_customers",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks capability '{capability}'")]
    Forbidden { role: Role, capability: Capability },
}

/// Roles granted a capability.
///
/// Sale approval and state changes belong to funnel supervisors; payment,
/// invoice and registration intake belong to the back office (auxiliar),
/// with updates of already-registered invoices/registrations reserved to the
/// super admin.
pub fn required_roles(capability: Capability) -> &'static [Role] {
    use Role::*;

    match capability {
        Capability::ApproveSale
        | Capability::ChangeSaleState
        | Capability::AssignAdvisor
        | Capability::ViewAllCustomers => &[SuperAdmin, Admin, Coordinador],

        Capability::DeleteCustomer
        | Capability::UpdateInvoice
        | Capability::UpdateRegistration => &[SuperAdmin],

        Capability::RegisterPayment
        | Capability::CreateInvoice
        | Capability::ViewInvoice
        | Capability::CreateRegistration
        | Capability::ViewRegistration => &[SuperAdmin, Auxiliar],

        Capability::ViewSaleQueue => &[SuperAdmin, Admin, Coordinador, Auxiliar],

        Capability::ViewApprovedCustomers => {
            &[SuperAdmin, Admin, Coordinador, Auxiliar, Asesor]
        }
    }
}

/// Whether `role` holds `capability`.
pub fn allows(role: Role, capability: Capability) -> bool {
    required_roles(capability).contains(&role)
}

/// Authorize a role for a capability.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(role: Role, capability: Capability) -> Result<(), AuthzError> {
    if allows(role, capability) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { role, capability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_holds_every_capability() {
        let all = [
            Capability::ApproveSale,
            Capability::ChangeSaleState,
            Capability::AssignAdvisor,
            Capability::DeleteCustomer,
            Capability::RegisterPayment,
            Capability::CreateInvoice,
            Capability::UpdateInvoice,
            Capability::ViewInvoice,
            Capability::CreateRegistration,
            Capability::UpdateRegistration,
            Capability::ViewRegistration,
            Capability::ViewSaleQueue,
            Capability::ViewApprovedCustomers,
            Capability::ViewAllCustomers,
        ];

        for capability in all {
            assert!(
                allows(Role::SuperAdmin, capability),
                "SUPER_ADMIN should hold {capability}"
            );
        }
    }

    #[test]
    fn advisor_cannot_approve_or_see_sale_queue() {
        assert!(!allows(Role::Asesor, Capability::ApproveSale));
        assert!(!allows(Role::Asesor, Capability::ViewSaleQueue));
        assert!(allows(Role::Asesor, Capability::ViewApprovedCustomers));
    }

    #[test]
    fn invoice_update_is_reserved_to_super_admin() {
        assert!(allows(Role::Auxiliar, Capability::CreateInvoice));
        assert!(!allows(Role::Auxiliar, Capability::UpdateInvoice));
        assert!(!allows(Role::Admin, Capability::UpdateInvoice));
        assert!(allows(Role::SuperAdmin, Capability::UpdateInvoice));
    }

    #[test]
    fn authorize_reports_role_and_capability() {
        let err = authorize(Role::Asesor, Capability::ApproveSale).unwrap_err();
        match err {
            AuthzError::Forbidden { role, capability } => {
                assert_eq!(role, Role::Asesor);
                assert_eq!(capability, Capability::ApproveSale);
            }
        }
    }
}
