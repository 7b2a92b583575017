use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::Weekday;
use crate::errors::ModelError;
use crate::service_step;

/// Opening hours of a step for one weekday; `(step_id, day)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "step_working_hours")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub step_id: Uuid,
    pub day: Weekday,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_closed: bool,
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

/// `HH:MM`, 24h clock.
pub fn validate_clock(value: &str) -> Result<(), ModelError> {
    let bad = || ModelError::Validation(format!("invalid time '{value}', expected HH:MM"));
    let (h, m) = value.split_once(':').ok_or_else(bad)?;
    if h.len() != 2 || m.len() != 2 { return Err(bad()); }
    let h: u8 = h.parse().map_err(|_| bad())?;
    let m: u8 = m.parse().map_err(|_| bad())?;
    if h > 23 || m > 59 { return Err(bad()); }
    Ok(())
}
