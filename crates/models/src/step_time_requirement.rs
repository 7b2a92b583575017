use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::service_step;

/// Free-text duration bands; at most one row per step.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "step_time_requirement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub step_id: Uuid,
    pub min_duration: Option<String>,
    pub avg_duration: Option<String>,
    pub max_duration: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Step }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Step => Entity::belongs_to(service_step::Entity)
                .from(Column::StepId)
                .to(service_step::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
