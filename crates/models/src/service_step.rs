use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::service_node;

/// One procedural step of a service; `(service_id, step_number)` is unique and
/// numbering is 1-based and contiguous.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_step")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub step_number: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
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

impl ActiveModelBehavior for ActiveModel {}
