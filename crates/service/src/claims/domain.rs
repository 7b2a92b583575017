use models::enums::ClaimStatus;
use models::{office_service, service_node};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::domain::StepDetail;

/// Office-specific overrides. `Some(None)` clears a value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimOverrides {
    pub custom_description: Option<Option<String>>,
    pub custom_fees: Option<Option<String>>,
    pub custom_requirements: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimSummary {
    pub claim: office_service::Model,
    pub service_code: String,
    pub service_name: String,
}

/// A claimed service as an office presents it: overrides layered over the shared definition.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveService {
    pub claim_id: Uuid,
    pub office_id: Uuid,
    pub status: ClaimStatus,
    pub service: service_node::Model,
    pub steps: Vec<StepDetail>,
    pub description: Option<String>,
    pub fees_note: Option<String>,
    pub requirements_note: Option<String>,
    pub notes: Option<String>,
    pub customized: bool,
}

impl EffectiveService {
    pub fn merge(claim: office_service::Model, service: service_node::Model, steps: Vec<StepDetail>) -> Self {
        let customized =
            claim.custom_description.is_some() || claim.custom_fees.is_some() || claim.custom_requirements.is_some();
        let description = claim.custom_description.clone().or_else(|| service.description.clone());
        Self {
            claim_id: claim.id,
            office_id: claim.office_id,
            status: claim.status,
            service,
            steps,
            description,
            fees_note: claim.custom_fees,
            requirements_note: claim.custom_requirements,
            notes: claim.notes,
            customized,
        }
    }
}
