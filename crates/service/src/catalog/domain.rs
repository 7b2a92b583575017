use std::collections::HashSet;

use models::enums::{AuthorityRole, DocumentType, FeeType, ServicePriority, Weekday};
use models::{service_node, step_authority, step_document, step_fee, step_time_requirement, step_working_hours, service_step};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Input for `CatalogService::create_service`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewService {
    pub parent_id: Option<Uuid>,
    /// Human readable id; generated when absent.
    pub service_code: Option<String>,
    /// Derived from `name` when absent.
    pub slug: Option<String>,
    pub name: String,
    pub name_local: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: ServicePriority,
    #[serde(default)]
    pub is_online_available: bool,
    pub online_url: Option<String>,
    pub eligibility: Option<String>,
    pub validity_period: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
    #[serde(default)]
    pub steps: Vec<StepInput>,
}

/// Partial update. `steps`, when present, replaces every existing step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUpdate {
    /// `Some(None)` moves the node to the root.
    pub parent_id: Option<Option<Uuid>>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub name_local: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub priority: Option<ServicePriority>,
    pub is_online_available: Option<bool>,
    pub online_url: Option<Option<String>>,
    pub eligibility: Option<Option<String>>,
    pub validity_period: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub category_ids: Option<Vec<Uuid>>,
    pub steps: Option<Vec<StepInput>>,
}

/// One procedural step. Its number is its 1-based position in the submitted list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInput {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
    #[serde(default)]
    pub fees: Vec<FeeInput>,
    pub time_requirement: Option<TimeRequirementInput>,
    #[serde(default)]
    pub working_hours: Vec<WorkingHoursInput>,
    #[serde(default)]
    pub authorities: Vec<AuthorityInput>,
    #[serde(default)]
    pub office_category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub name: String,
    pub name_local: Option<String>,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default = "yes")]
    pub is_mandatory: bool,
    #[serde(default = "one")]
    pub quantity: i32,
    pub notes: Option<String>,
}

fn yes() -> bool { true }
fn one() -> i32 { 1 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeInput {
    #[serde(default)]
    pub fee_type: FeeType,
    pub label: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub is_refundable: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRequirementInput {
    pub min_duration: Option<String>,
    pub avg_duration: Option<String>,
    pub max_duration: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHoursInput {
    pub day: Weekday,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorityContact {
    pub position: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// An authority is attached to its step in exactly one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorityInput {
    Responsible(AuthorityContact),
    Complaint(AuthorityContact),
}

impl AuthorityInput {
    pub fn role(&self) -> AuthorityRole {
        match self {
            AuthorityInput::Responsible(_) => AuthorityRole::Responsible,
            AuthorityInput::Complaint(_) => AuthorityRole::Complaint,
        }
    }

    pub fn contact(&self) -> &AuthorityContact {
        match self {
            AuthorityInput::Responsible(c) | AuthorityInput::Complaint(c) => c,
        }
    }
}

impl StepInput {
    pub fn validate(&self, number: usize) -> Result<(), ServiceError> {
        let at = |msg: String| ServiceError::Validation(format!("step {number}: {msg}"));
        if self.title.trim().is_empty() {
            return Err(at("title required".into()));
        }
        for doc in &self.documents {
            if doc.name.trim().is_empty() { return Err(at("document name required".into())); }
            models::step_document::validate_quantity(doc.quantity).map_err(|e| at(e.to_string()))?;
        }
        for fee in &self.fees {
            if fee.label.trim().is_empty() { return Err(at("fee label required".into())); }
            models::step_fee::validate_amount(fee.amount).map_err(|e| at(e.to_string()))?;
            models::step_fee::validate_currency(&fee.currency).map_err(|e| at(e.to_string()))?;
        }
        let mut days = HashSet::new();
        for wh in &self.working_hours {
            if !days.insert(wh.day) {
                return Err(at(format!("duplicate working hours for {:?}", wh.day)));
            }
            for t in [&wh.open_time, &wh.close_time].into_iter().flatten() {
                models::step_working_hours::validate_clock(t).map_err(|e| at(e.to_string()))?;
            }
            if let (Some(open), Some(close)) = (&wh.open_time, &wh.close_time) {
                // zero-padded HH:MM compares correctly as text
                if open >= close { return Err(at(format!("{:?} opens at or after it closes", wh.day))); }
            }
        }
        for a in &self.authorities {
            if a.contact().position.trim().is_empty() { return Err(at("authority position required".into())); }
        }
        Ok(())
    }
}

pub fn validate_steps(steps: &[StepInput]) -> Result<(), ServiceError> {
    steps.iter().enumerate().try_for_each(|(i, s)| s.validate(i + 1))
}

/// A step with all of its detail rows, authorities split by role.
#[derive(Debug, Clone, Serialize)]
pub struct StepDetail {
    pub step: service_step::Model,
    pub documents: Vec<step_document::Model>,
    pub fees: Vec<step_fee::Model>,
    pub time_requirement: Option<step_time_requirement::Model>,
    pub working_hours: Vec<step_working_hours::Model>,
    pub responsible_authorities: Vec<step_authority::Model>,
    pub complaint_authorities: Vec<step_authority::Model>,
    pub office_category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDetail {
    pub service: service_node::Model,
    pub category_ids: Vec<Uuid>,
    pub has_children: bool,
    pub steps: Vec<StepDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreadcrumbEntry {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub level: i32,
}

/// Base-36 rendering of a millisecond timestamp, used to keep generated slugs unique.
pub fn time_token(millis: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if millis == 0 { return "0".into(); }
    let mut n = millis;
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Slug for a service created without an explicit one. Names with nothing
/// slugifiable (e.g. Devanagari only) fall back to `service-<time token>`.
pub fn default_slug(name: &str, millis: u128) -> String {
    let slug: String = service_node::slugify(name).chars().take(160).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        format!("service-{}", time_token(millis))
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_base36() {
        assert_eq!(time_token(0), "0");
        assert_eq!(time_token(35), "z");
        assert_eq!(time_token(36), "10");
    }

    #[test]
    fn default_slug_never_empty() {
        assert_eq!(default_slug("Passport Renewal", 7), "passport-renewal");
        assert_eq!(default_slug("नागरिकता प्रमाणपत्र", 36), "service-10");
        service_node::validate_slug(&default_slug(&"ab ".repeat(100), 1)).unwrap();
    }

    fn step(title: &str) -> StepInput {
        StepInput { title: title.into(), ..Default::default() }
    }

    #[test]
    fn rejects_blank_title_with_position() {
        let err = validate_steps(&[step("Apply"), step("  ")]).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.starts_with("step 2")));
    }

    #[test]
    fn rejects_duplicate_weekday() {
        let mut s = step("Submit");
        let monday = WorkingHoursInput { day: Weekday::Monday, open_time: Some("10:00".into()), close_time: Some("17:00".into()), is_closed: false };
        s.working_hours = vec![monday.clone(), monday];
        assert!(s.validate(1).is_err());
    }

    #[test]
    fn rejects_zero_quantity_and_negative_fee() {
        let mut s = step("Pay");
        s.documents.push(DocumentInput { name: "Citizenship".into(), name_local: None, document_type: DocumentType::Photocopy, is_mandatory: true, quantity: 0, notes: None });
        assert!(s.validate(1).is_err());

        let mut s = step("Pay");
        s.fees.push(FeeInput { fee_type: FeeType::GovernmentFee, label: "Fee".into(), amount: -5.0, currency: "NPR".into(), is_refundable: false, notes: None });
        assert!(s.validate(1).is_err());
    }

    #[test]
    fn authority_role_is_carried_by_variant() {
        let json = r#"{"role":"COMPLAINT","position":"Chief District Officer","department":null,"phone":null,"email":null}"#;
        let a: AuthorityInput = serde_json::from_str(json).unwrap();
        assert_eq!(a.role(), AuthorityRole::Complaint);
        assert_eq!(a.contact().position, "Chief District Officer");
    }
}
