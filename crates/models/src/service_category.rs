//! Many-to-many link between catalog services and categories.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{category, service_node};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub category_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service, Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service_node::Entity)
                .from(Column::ServiceId)
                .to(service_node::Column::Id)
                .into(),
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
