use serde::{Deserialize, Serialize};

/// Funnel stage identifier.
///
/// Stages are reference data seeded by the deployment; their numeric ids are
/// stable across environments, which is why the sale-review stage can be a
/// constant here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub u32);

impl StageId {
    /// The sale-review stage: entering it forces the sale state to
    /// pending-approval (see `state_machine`).
    pub const SALE_REVIEW: StageId = StageId(19);
}

impl core::fmt::Display for StageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A funnel stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
}

/// Name of the stage every new customer starts in.
pub const DEFAULT_STAGE_NAME: &str = "Sin Contactar";

/// Stage names hidden from advisor-facing listings (closed leads).
pub const ADVISOR_EXCLUDED_STAGES: &[&str] =
    &["NO INTERESADO", "REPORTADO", "FUERA DE CUNDINAMARCA"];
