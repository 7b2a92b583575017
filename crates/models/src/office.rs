use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::LocationKind;
use crate::errors::ModelError;
use crate::office_category;

/// A physical office. The location attachment is the pair
/// `(location_kind, location_id)`: both set or both null.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "office")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub office_code: String,
    pub name: String,
    pub name_local: Option<String>,
    pub address: Option<String>,
    pub address_local: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category_id: Uuid,
    pub location_kind: Option<LocationKind>,
    pub location_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(office_category::Entity)
                .from(Column::CategoryId)
                .to(office_category::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_office_code(code: &str) -> Result<(), ModelError> {
    if code.trim().is_empty() || code.len() > 64 {
        return Err(ModelError::Validation("office code must be 1..=64 characters".into()));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(ModelError::Validation("office code must not contain whitespace".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ModelError::Validation("invalid email".into()));
    };
    if local.is_empty() || !domain.contains('.') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}
