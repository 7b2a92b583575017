//! Which categories of office are expected to execute a step.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{office_category, service_step};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "step_office_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub step_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub office_category_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Step, OfficeCategory }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Step => Entity::belongs_to(service_step::Entity)
                .from(Column::StepId)
                .to(service_step::Column::Id)
                .into(),
            Relation::OfficeCategory => Entity::belongs_to(office_category::Entity)
                .from(Column::OfficeCategoryId)
                .to(office_category::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
