use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::UserRole;
use crate::office;

/// Directory user. An `OFFICE_ADMIN` is linked one-to-one with its office
/// through the unique `office_id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[sea_orm(unique)]
    pub office_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Office }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Office => Entity::belongs_to(office::Entity)
                .from(Column::OfficeId)
                .to(office::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
