use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::AuthorityRole;
use crate::service_step;

/// Officer attached to a step, either as the responsible authority or as the
/// place to complain. `role` replaces a pair of mutually exclusive back-references.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "step_authority")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub step_id: Uuid,
    pub role: AuthorityRole,
    pub position: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub sort_order: i32,
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
