use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::{RequestStatus, ServicePriority};
use crate::errors::ModelError;

/// Proposal from an office admin to add a new root-level service.
///
/// `rejection_reason` is only set for `REJECTED`, `approved_service_id` only for `APPROVED`.
/// `category_id` is stored as requested and resolved at approval time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub requested_by: Uuid,
    pub office_id: Option<Uuid>,
    pub service_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Option<ServicePriority>,
    #[sea_orm(column_type = "Text", nullable)]
    pub justification: Option<String>,
    pub status: RequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub review_notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub approved_service_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ApprovedService }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ApprovedService => Entity::belongs_to(crate::service_node::Entity)
                .from(Column::ApprovedServiceId)
                .to(crate::service_node::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_service_name(name: &str) -> Result<(), ModelError> {
    let trimmed = name.trim();
    if trimmed.len() < 3 {
        return Err(ModelError::Validation("service name must be at least 3 characters".into()));
    }
    if trimmed.len() > 255 {
        return Err(ModelError::Validation("service name too long (<=255)".into()));
    }
    Ok(())
}
