use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::DocumentType;
use crate::errors::ModelError;
use crate::service_step;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "step_document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub step_id: Uuid,
    pub name: String,
    pub name_local: Option<String>,
    pub document_type: DocumentType,
    pub is_mandatory: bool,
    pub quantity: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Position within the step's document list.
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

pub fn validate_quantity(quantity: i32) -> Result<(), ModelError> {
    if quantity < 1 { return Err(ModelError::Validation("document quantity must be >= 1".into())); }
    Ok(())
}
