//! Aggregate counters, recomputed on every call.

use models::enums::ClaimStatus;
use models::{office, office_service, service_node};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimCounts {
    pub claimed: u64,
    pub pending: u64,
    pub revoked: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub services: u64,
    pub roots: u64,
    pub leaves: u64,
    pub online_available: u64,
    pub offices: u64,
    pub active_offices: u64,
    pub claims: ClaimCounts,
}

pub async fn catalog_stats<C: ConnectionTrait>(db: &C) -> Result<CatalogStats, ServiceError> {
    let services = service_node::Entity::find().count(db).await?;
    let roots = service_node::Entity::find()
        .filter(service_node::Column::ParentId.is_null())
        .count(db)
        .await?;
    let parents = Query::select()
        .column(service_node::Column::ParentId)
        .from(service_node::Entity)
        .and_where(service_node::Column::ParentId.is_not_null())
        .to_owned();
    let leaves = service_node::Entity::find()
        .filter(service_node::Column::Id.not_in_subquery(parents))
        .count(db)
        .await?;
    let online_available = service_node::Entity::find()
        .filter(service_node::Column::IsOnlineAvailable.eq(true))
        .count(db)
        .await?;
    let offices = office::Entity::find().count(db).await?;
    let active_offices = office::Entity::find()
        .filter(office::Column::IsActive.eq(true))
        .count(db)
        .await?;

    let mut claims = ClaimCounts::default();
    for (status, slot) in [
        (ClaimStatus::Claimed, &mut claims.claimed),
        (ClaimStatus::Pending, &mut claims.pending),
        (ClaimStatus::Revoked, &mut claims.revoked),
    ] {
        *slot = office_service::Entity::find()
            .filter(office_service::Column::Status.eq(status))
            .count(db)
            .await?;
    }

    Ok(CatalogStats { services, roots, leaves, online_available, offices, active_offices, claims })
}
