use models::enums::{RequestStatus, ServicePriority};
use models::{office_service, service_node, service_request};

use crate::catalog::domain::time_token;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proposal for a new root-level service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewServiceRequest {
    pub service_name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Option<ServicePriority>,
    pub justification: Option<String>,
    /// Defaults to the submitter's own office.
    pub office_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub requested_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub request: service_request::Model,
    pub service: service_node::Model,
    pub claim: Option<office_service::Model>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

/// `<slugified name>-<time token>`, with the name part capped so the result stays a valid slug.
pub fn approval_slug(service_name: &str, millis: u128) -> String {
    let base = service_node::slugify(service_name);
    let mut base: String = base.chars().take(140).collect();
    while base.ends_with('-') { base.pop(); }
    if base.is_empty() { base.push_str("service"); }
    format!("{base}-{}", time_token(millis))
}
