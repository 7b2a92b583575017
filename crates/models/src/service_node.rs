//! A node of the service catalog forest.
//!
//! Children point at their parent through `parent_id`; a parent never stores its
//! children. `level` is written together with `parent_id` and is never derived lazily.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::ServicePriority;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_node")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human readable identifier (`SRV-...`), unique across the catalog.
    #[sea_orm(unique)]
    pub service_code: String,
    pub parent_id: Option<Uuid>,
    pub slug: String,
    pub name: String,
    pub name_local: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub level: i32,
    pub priority: ServicePriority,
    pub is_online_available: bool,
    pub online_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub eligibility: Option<String>,
    pub validity_period: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Parent,
    Steps,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Parent => Entity::belongs_to(Entity)
                .from(Column::ParentId)
                .to(Column::Id)
                .into(),
            Relation::Steps => Entity::has_many(crate::service_step::Entity).into(),
        }
    }
}

impl Related<crate::service_step::Entity> for Entity {
    fn to() -> RelationDef { Relation::Steps.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lower-case, ASCII-alphanumeric words joined by single dashes.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() { out.push('-'); }
            out.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    out
}

pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    if slug.is_empty() || slug.len() > 160 {
        return Err(ModelError::Validation("slug must be 1..=160 characters".into()));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(ModelError::Validation("slug may only contain a-z, 0-9 and '-'".into()));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(ModelError::Validation("slug must not start or end with '-'".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() { return Err(ModelError::Validation("name required".into())); }
    if trimmed.len() > 255 { return Err(ModelError::Validation("name too long (<=255)".into())); }
    Ok(())
}

pub fn validate_service_code(code: &str) -> Result<(), ModelError> {
    if code.trim().is_empty() || code.len() > 64 {
        return Err(ModelError::Validation("service code must be 1..=64 characters".into()));
    }
    Ok(())
}

pub fn validate_online_url(url: &str) -> Result<(), ModelError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ModelError::Validation("online_url must start with http(s)".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Vehicle Tax  Renewal"), "vehicle-tax-renewal");
        assert_eq!(slugify("  Birth / Death Registration! "), "birth-death-registration");
        assert_eq!(slugify("PAN-2 (Individual)"), "pan-2-individual");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn slug_validation() {
        assert!(validate_slug("citizenship-certificate").is_ok());
        assert!(validate_slug("Citizenship").is_err());
        assert!(validate_slug("-lead").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn online_url_requires_scheme() {
        assert!(validate_online_url("https://portal.gov.np").is_ok());
        assert!(validate_online_url("portal.gov.np").is_err());
    }
}
