use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::FeeType;
use crate::errors::ModelError;
use crate::service_step;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "step_fee")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub step_id: Uuid,
    pub fee_type: FeeType,
    pub label: String,
    pub amount: f64,
    pub currency: String,
    pub is_refundable: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
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

pub fn validate_amount(amount: f64) -> Result<(), ModelError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ModelError::Validation("fee amount must be a finite number >= 0".into()));
    }
    Ok(())
}

/// ISO-4217 style: three upper-case ASCII letters.
pub fn validate_currency(currency: &str) -> Result<(), ModelError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ModelError::Validation(format!("invalid currency code '{currency}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_bounds() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(1500.5).is_ok());
        assert!(validate_amount(-1.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_currency("NPR").is_ok());
        assert!(validate_currency("npr").is_err());
        assert!(validate_currency("RUPEE").is_err());
    }
}
