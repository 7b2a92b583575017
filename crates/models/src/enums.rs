//! String-backed enums shared by several tables.
//!
//! Values are stored upper-case so rows stay readable from `psql`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServicePriority {
    #[sea_orm(string_value = "LOW")]
    Low,
    #[sea_orm(string_value = "MEDIUM")]
    #[default]
    Medium,
    #[sea_orm(string_value = "HIGH")]
    High,
    #[sea_orm(string_value = "URGENT")]
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    #[sea_orm(string_value = "ORIGINAL")]
    #[default]
    Original,
    #[sea_orm(string_value = "PHOTOCOPY")]
    Photocopy,
    #[sea_orm(string_value = "NOTARIZED_COPY")]
    NotarizedCopy,
    #[sea_orm(string_value = "CERTIFIED_COPY")]
    CertifiedCopy,
    #[sea_orm(string_value = "DIGITAL")]
    Digital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeType {
    #[sea_orm(string_value = "GOVERNMENT_FEE")]
    #[default]
    GovernmentFee,
    #[sea_orm(string_value = "SERVICE_CHARGE")]
    ServiceCharge,
    #[sea_orm(string_value = "PENALTY")]
    Penalty,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    #[sea_orm(string_value = "SUNDAY")]
    Sunday,
    #[sea_orm(string_value = "MONDAY")]
    Monday,
    #[sea_orm(string_value = "TUESDAY")]
    Tuesday,
    #[sea_orm(string_value = "WEDNESDAY")]
    Wednesday,
    #[sea_orm(string_value = "THURSDAY")]
    Thursday,
    #[sea_orm(string_value = "FRIDAY")]
    Friday,
    #[sea_orm(string_value = "SATURDAY")]
    Saturday,
}

/// Which back-reference an authority row represents for its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorityRole {
    #[sea_orm(string_value = "RESPONSIBLE")]
    Responsible,
    #[sea_orm(string_value = "COMPLAINT")]
    Complaint,
}

/// Level of the location node an office is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationKind {
    #[sea_orm(string_value = "WARD")]
    Ward,
    #[sea_orm(string_value = "MUNICIPALITY")]
    Municipality,
    #[sea_orm(string_value = "DISTRICT")]
    District,
    #[sea_orm(string_value = "PROVINCE")]
    Province,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    #[sea_orm(string_value = "CLAIMED")]
    Claimed,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "REVOKED")]
    Revoked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[sea_orm(string_value = "PENDING")]
    #[default]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool { !matches!(self, RequestStatus::Pending) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "OFFICE_ADMIN")]
    OfficeAdmin,
}
