//! Claim ledger row: office `office_id` performs leaf service `service_id`.
//!
//! `(office_id, service_id)` is unique; a revoked row is reused on re-claim.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::ClaimStatus;
use crate::{office, service_node};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "office_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub office_id: Uuid,
    pub service_id: Uuid,
    pub status: ClaimStatus,
    pub claimed_by: Option<Uuid>,
    pub claimed_at: Option<DateTimeWithTimeZone>,
    pub revoked_by: Option<Uuid>,
    pub revoked_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_fees: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_requirements: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Office, Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Office => Entity::belongs_to(office::Entity)
                .from(Column::OfficeId)
                .to(office::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service_node::Entity)
                .from(Column::ServiceId)
                .to(service_node::Column::Id)
                .into(),
        }
    }
}

impl Related<service_node::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl Related<office::Entity> for Entity {
    fn to() -> RelationDef { Relation::Office.def() }
}

impl ActiveModelBehavior for ActiveModel {}
