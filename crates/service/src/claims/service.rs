use chrono::Utc;
use common::pagination::Pagination;
use common::types::Page;
use models::enums::ClaimStatus;
use models::{office, office_service, service_node};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{ClaimOverrides, ClaimSummary, EffectiveService};
use crate::catalog::{steps, tree};
use crate::errors::ServiceError;
use crate::identity::Principal;

/// Which office performs which leaf service.
///
/// Every transition is one conditional statement; the unique
/// `(office_id, service_id)` index arbitrates concurrent first claims.
#[derive(Clone)]
pub struct ClaimLedger {
    db: DatabaseConnection,
}

impl ClaimLedger {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Claim a leaf service for an office, reusing a revoked or pending row.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn claim(&self, principal: &Principal, office_id: Uuid, service_id: Uuid) -> Result<office_service::Model, ServiceError> {
        principal.require_office_scope(office_id)?;
        require_office(&self.db, office_id).await?;
        tree::require_leaf(&self.db, service_id).await?;

        let existing = office_service::Entity::find()
            .filter(office_service::Column::OfficeId.eq(office_id))
            .filter(office_service::Column::ServiceId.eq(service_id))
            .one(&self.db)
            .await?;
        let now = Utc::now();
        match existing {
            None => {
                let row = new_claim(office_id, service_id, principal.user_id, None)
                    .insert(&self.db)
                    .await
                    .map_err(already_claimed)?;
                info!(claim_id = %row.id, "service_claimed");
                Ok(row)
            }
            Some(row) if row.status == ClaimStatus::Claimed => Err(already_claimed_error()),
            Some(row) => {
                let res = office_service::Entity::update_many()
                    .set(office_service::ActiveModel {
                        status: Set(ClaimStatus::Claimed),
                        claimed_by: Set(Some(principal.user_id)),
                        claimed_at: Set(Some(now.into())),
                        revoked_by: Set(None),
                        revoked_at: Set(None),
                        updated_at: Set(now.into()),
                        ..Default::default()
                    })
                    .filter(office_service::Column::Id.eq(row.id))
                    .filter(office_service::Column::Status.ne(ClaimStatus::Claimed))
                    .exec(&self.db)
                    .await?;
                if res.rows_affected == 0 {
                    return Err(already_claimed_error());
                }
                info!(claim_id = %row.id, previous = ?row.status, "service_reclaimed");
                find_claim(&self.db, row.id).await
            }
        }
    }

    /// Revoke an active claim; the row is kept with revocation metadata.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn revoke(&self, principal: &Principal, office_id: Uuid, claim_id: Uuid) -> Result<office_service::Model, ServiceError> {
        principal.require_office_scope(office_id)?;
        let row = find_office_claim(&self.db, office_id, claim_id).await?;
        let now = Utc::now();
        let res = office_service::Entity::update_many()
            .set(office_service::ActiveModel {
                status: Set(ClaimStatus::Revoked),
                revoked_by: Set(Some(principal.user_id)),
                revoked_at: Set(Some(now.into())),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .filter(office_service::Column::Id.eq(row.id))
            .filter(office_service::Column::Status.eq(ClaimStatus::Claimed))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::conflict(format!("claim is {:?}, only an active claim can be revoked", row.status)));
        }
        info!(claim_id = %claim_id, "service_revoked");
        find_claim(&self.db, claim_id).await
    }

    /// Change office overrides in any status; the status itself is untouched.
    #[instrument(skip(self, principal, overrides), fields(user_id = %principal.user_id))]
    pub async fn update_claim(&self, principal: &Principal, office_id: Uuid, claim_id: Uuid, overrides: ClaimOverrides) -> Result<office_service::Model, ServiceError> {
        principal.require_office_scope(office_id)?;
        let row = find_office_claim(&self.db, office_id, claim_id).await?;
        let mut am: office_service::ActiveModel = row.into();
        if let Some(v) = overrides.custom_description { am.custom_description = Set(v); }
        if let Some(v) = overrides.custom_fees { am.custom_fees = Set(v); }
        if let Some(v) = overrides.custom_requirements { am.custom_requirements = Set(v); }
        if let Some(v) = overrides.notes { am.notes = Set(v); }
        am.updated_at = Set(Utc::now().into());
        Ok(am.update(&self.db).await?)
    }

    /// Claims of one office with their service names, ordered by service name.
    pub async fn list_claims(&self, principal: &Principal, office_id: Uuid, status: Option<ClaimStatus>) -> Result<Vec<ClaimSummary>, ServiceError> {
        principal.require_office_scope(office_id)?;
        let mut query = office_service::Entity::find()
            .find_also_related(service_node::Entity)
            .filter(office_service::Column::OfficeId.eq(office_id));
        if let Some(s) = status { query = query.filter(office_service::Column::Status.eq(s)); }
        let rows = query.order_by_asc(service_node::Column::Name).all(&self.db).await?;
        rows.into_iter()
            .map(|(claim, service)| {
                let service = service.ok_or_else(|| ServiceError::Integrity(format!("claim {} has no service", claim.id)))?;
                Ok(ClaimSummary { claim, service_code: service.service_code, service_name: service.name })
            })
            .collect()
    }

    /// Active leaf services the office has not claimed yet, ordered by name.
    pub async fn list_claimable_services(&self, principal: &Principal, office_id: Uuid, opts: Pagination) -> Result<Page<service_node::Model>, ServiceError> {
        principal.require_office_scope(office_id)?;
        let parents = Query::select()
            .column(service_node::Column::ParentId)
            .from(service_node::Entity)
            .and_where(service_node::Column::ParentId.is_not_null())
            .to_owned();
        let claimed = Query::select()
            .column(office_service::Column::ServiceId)
            .from(office_service::Entity)
            .and_where(office_service::Column::OfficeId.eq(office_id))
            .and_where(office_service::Column::Status.eq(ClaimStatus::Claimed))
            .to_owned();
        let query = service_node::Entity::find()
            .filter(service_node::Column::IsActive.eq(true))
            .filter(service_node::Column::Id.not_in_subquery(parents))
            .filter(service_node::Column::Id.not_in_subquery(claimed))
            .order_by_asc(service_node::Column::Name);
        let (page_idx, per_page) = opts.normalize();
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_idx).await?;
        let (page, per_page) = opts.effective();
        Ok(Page { items, page, per_page, total })
    }

    /// Offices currently claiming a service, ordered by name.
    pub async fn list_service_offices(&self, service_id: Uuid) -> Result<Vec<office::Model>, ServiceError> {
        tree::find_node(&self.db, service_id).await?;
        let office_ids: Vec<Uuid> = office_service::Entity::find()
            .filter(office_service::Column::ServiceId.eq(service_id))
            .filter(office_service::Column::Status.eq(ClaimStatus::Claimed))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| c.office_id)
            .collect();
        if office_ids.is_empty() { return Ok(Vec::new()); }
        Ok(office::Entity::find()
            .filter(office::Column::Id.is_in(office_ids))
            .order_by_asc(office::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// The shared service definition with this claim's overrides read-merged on top.
    pub async fn effective_service(&self, claim_id: Uuid) -> Result<EffectiveService, ServiceError> {
        let claim = find_claim(&self.db, claim_id).await?;
        let service = tree::find_node(&self.db, claim.service_id).await?;
        let steps = steps::load_steps(&self.db, service.id).await?;
        Ok(EffectiveService::merge(claim, service, steps))
    }
}

fn new_claim(office_id: Uuid, service_id: Uuid, by: Uuid, notes: Option<String>) -> office_service::ActiveModel {
    let now = Utc::now();
    office_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        office_id: Set(office_id),
        service_id: Set(service_id),
        status: Set(ClaimStatus::Claimed),
        claimed_by: Set(Some(by)),
        claimed_at: Set(Some(now.into())),
        revoked_by: Set(None),
        revoked_at: Set(None),
        custom_description: Set(None),
        custom_fees: Set(None),
        custom_requirements: Set(None),
        notes: Set(notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

/// Initial claim written by request approval, inside the caller's transaction.
pub(crate) async fn insert_auto_claim<C: ConnectionTrait>(
    db: &C,
    office_id: Uuid,
    service_id: Uuid,
    by: Uuid,
    notes: String,
) -> Result<office_service::Model, ServiceError> {
    require_office(db, office_id).await?;
    Ok(new_claim(office_id, service_id, by, Some(notes)).insert(db).await?)
}

async fn require_office<C: ConnectionTrait>(db: &C, office_id: Uuid) -> Result<(), ServiceError> {
    match office::Entity::find_by_id(office_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::not_found("office")),
    }
}

async fn find_claim<C: ConnectionTrait>(db: &C, claim_id: Uuid) -> Result<office_service::Model, ServiceError> {
    office_service::Entity::find_by_id(claim_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("claim"))
}

/// A claim belonging to another office is reported as missing.
async fn find_office_claim<C: ConnectionTrait>(db: &C, office_id: Uuid, claim_id: Uuid) -> Result<office_service::Model, ServiceError> {
    match find_claim(db, claim_id).await? {
        row if row.office_id == office_id => Ok(row),
        _ => Err(ServiceError::not_found("claim")),
    }
}

fn already_claimed_error() -> ServiceError {
    ServiceError::conflict("service already claimed by this office")
}

fn already_claimed(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => already_claimed_error(),
        _ => e.into(),
    }
}
