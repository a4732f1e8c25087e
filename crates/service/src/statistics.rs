//! Advisor performance counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use motocrm_auth::Actor;
use motocrm_core::UserId;
use motocrm_customers::StageId;
use motocrm_store::CustomerStore;

use crate::customers::CustomerService;
use crate::error::ServiceError;

/// Parameters of an advisor statistics query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsQuery {
    pub advisors: Vec<UserId>,
    pub stage_id: StageId,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// Customers counted for one advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorCount {
    pub advisor_id: UserId,
    pub name: String,
    pub quantity: usize,
}

impl<S: CustomerStore> CustomerService<S> {
    /// Count customers per advisor in a given stage, optionally bounded by
    /// creation date. Advisors missing from the directory are reported under
    /// a placeholder name rather than dropped.
    pub fn advisor_statistics(
        &self,
        query: StatisticsQuery,
        _actor: Actor,
    ) -> Result<Vec<AdvisorCount>, ServiceError> {
        let stage = self
            .store()
            .stage(query.stage_id)?
            .ok_or(ServiceError::NotFound)?;

        let customers: Vec<_> = self
            .store()
            .aggregates()?
            .into_iter()
            .map(|a| a.customer)
            .filter(|c| c.stage_id == stage.id)
            .filter(|c| match c.advisor_id {
                Some(id) => query.advisors.contains(&id),
                None => false,
            })
            .filter(|c| query.start_date.is_none_or(|start| c.created_at >= start))
            .filter(|c| query.end_date.is_none_or(|end| c.created_at <= end))
            .collect();

        query
            .advisors
            .iter()
            .map(|&advisor_id| {
                let name = self
                    .store()
                    .advisor(advisor_id)?
                    .map(|a| a.name)
                    .unwrap_or_else(|| format!("Asesor {advisor_id}"));
                let quantity = customers
                    .iter()
                    .filter(|c| c.advisor_id == Some(advisor_id))
                    .count();

                Ok(AdvisorCount {
                    advisor_id,
                    name,
                    quantity,
                })
            })
            .collect()
    }
}
