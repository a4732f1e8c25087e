use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use motocrm_core::{CustomerId, UserId};

use crate::order_number::OrderNumber;
use crate::stage::StageId;

/// Sale-approval workflow state.
///
/// `Aprobado` is only ever reached through the approval transaction; every
/// other transition goes through `state_machine::resolve_sale_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleState {
    Na,
    PendientePorAprobar,
    Aprobado,
    Rechazado,
}

impl SaleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleState::Na => "NA",
            SaleState::PendientePorAprobar => "PENDIENTE_POR_APROBAR",
            SaleState::Aprobado => "APROBADO",
            SaleState::Rechazado => "RECHAZADO",
        }
    }
}

impl core::fmt::Display for SaleState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical handover state. Absent (`None` on the record) until the vehicle
/// enters the delivery pipeline; `Entregado` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryState {
    PendienteEntrega,
    Entregado,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::PendienteEntrega => "PENDIENTE_ENTREGA",
            DeliveryState::Entregado => "ENTREGADO",
        }
    }
}

impl core::fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! opaque_string_newtype {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Cow<'static, str>);

        impl $t {
            pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_string_newtype!(
    /// Distributor the approved vehicle is sourced from.
    ///
    /// The distributor catalog is deployment data, so this stays an opaque
    /// string at the domain layer.
    Distributor
);

opaque_string_newtype!(
    /// Financial entity backing a payment or a holder.
    FinancialEntity
);

opaque_string_newtype!(
    /// Acquisition channel of a customer record.
    Origin
);

impl Default for Origin {
    fn default() -> Self {
        Self(Cow::Borrowed("CRM"))
    }
}

/// The customer row: identity and lifecycle anchor of the sale funnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub advisor_id: Option<UserId>,
    pub name: String,
    /// Unique when present.
    pub email: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub department: Option<String>,
    pub document: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub stage_id: StageId,
    pub sale_state: SaleState,
    pub delivery_state: Option<DeliveryState>,
    pub sale_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    /// Set exactly once, by the first approval. Globally unique.
    pub order_number: Option<OrderNumber>,
    /// Required once the vehicle is delivered.
    pub plate_number: Option<String>,
    pub origin: Origin,
    pub distributor: Option<Distributor>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub approval_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerRecord {
    /// Fully delivered: in the sale-review stage with a plate on file.
    /// Finalized customers are excluded from active funnel views.
    pub fn is_finalized(&self) -> bool {
        self.stage_id == StageId::SALE_REVIEW && self.plate_number.is_some()
    }

    pub fn is_delivered(&self) -> bool {
        self.delivery_state == Some(DeliveryState::Entregado)
    }

    pub fn is_approved(&self) -> bool {
        self.sale_state == SaleState::Aprobado
    }
}

/// Intake payload for a new customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub advisor_id: Option<UserId>,
    #[serde(default)]
    pub stage_id: Option<StageId>,
    #[serde(default)]
    pub sale_state: Option<SaleState>,
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub origin: Option<Origin>,
}

/// Partial update of a customer row.
///
/// `None` means "leave the field unchanged". The resulting sale state is never
/// taken from `sale_state` directly; it goes through the state machine first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub advisor_id: Option<UserId>,
    #[serde(default)]
    pub stage_id: Option<StageId>,
    #[serde(default)]
    pub sale_state: Option<SaleState>,
    #[serde(default)]
    pub delivery_state: Option<DeliveryState>,
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub origin: Option<Origin>,
}

impl CustomerChanges {
    /// Whether this update actually changes the delivery state relative to
    /// `current`. Re-sending the current value is not a transition.
    pub fn changes_delivery_state(&self, current: &CustomerRecord) -> bool {
        match self.delivery_state {
            Some(requested) => current.delivery_state != Some(requested),
            None => false,
        }
    }
}
