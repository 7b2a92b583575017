use chrono::Utc;
use common::pagination::Pagination;
use common::types::Page;
use configs::CatalogConfig;
use models::enums::RequestStatus;
use models::{category, service_node, service_request};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{approval_slug, ApprovalOutcome, NewServiceRequest, RequestFilter, RequestStats};
use crate::catalog::service::{ensure_slug_free, generate_service_code, link_categories};
use crate::claims::service::insert_auto_claim;
use crate::errors::ServiceError;
use crate::identity::Principal;

/// Review workflow for office-submitted service proposals.
///
/// `PENDING` is the only state with outgoing transitions; approval materializes
/// the catalog node and the submitting office's claim in the same transaction.
#[derive(Clone)]
pub struct RequestWorkflow {
    db: DatabaseConnection,
    cfg: CatalogConfig,
}

impl RequestWorkflow {
    pub fn new(db: DatabaseConnection, cfg: CatalogConfig) -> Self { Self { db, cfg } }

    #[instrument(skip(self, principal, input), fields(user_id = %principal.user_id, service_name = %input.service_name))]
    pub async fn submit(&self, principal: &Principal, input: NewServiceRequest) -> Result<service_request::Model, ServiceError> {
        let own_office = principal.require_office_admin()?;
        let office_id = input.office_id.unwrap_or(own_office);
        if office_id != own_office {
            return Err(ServiceError::forbidden("requests can only be submitted for your own office"));
        }
        service_request::validate_service_name(&input.service_name)?;
        let name = input.service_name.trim().to_string();
        let lowered = name.to_lowercase();

        let pending = service_request::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col((service_request::Entity, service_request::Column::ServiceName)))).eq(lowered.clone()))
            .filter(service_request::Column::Status.eq(RequestStatus::Pending))
            .count(&self.db)
            .await?;
        if pending > 0 {
            return Err(ServiceError::conflict(format!("a request for '{name}' is already pending review")));
        }
        let existing = service_node::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col((service_node::Entity, service_node::Column::Name)))).eq(lowered))
            .one(&self.db)
            .await?;
        if let Some(s) = existing {
            return Err(ServiceError::conflict(format!(
                "service '{}' already exists ({}); claim it instead",
                s.name, s.service_code
            )));
        }

        if let Some(cid) = input.category_id {
            if category::Entity::find_by_id(cid).one(&self.db).await?.is_none() {
                return Err(ServiceError::NotFound(format!("category {cid} not found")));
            }
        }

        let now = Utc::now();
        let created = service_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            requested_by: Set(principal.user_id),
            office_id: Set(Some(office_id)),
            service_name: Set(name),
            description: Set(input.description),
            category_id: Set(input.category_id),
            priority: Set(input.priority),
            justification: Set(input.justification),
            status: Set(RequestStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            review_notes: Set(None),
            rejection_reason: Set(None),
            approved_service_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(request_id = %created.id, "service_request_submitted");
        Ok(created)
    }

    /// Newest first. Office admins only ever see their own requests.
    pub async fn list_requests(&self, principal: &Principal, filter: RequestFilter, opts: Pagination) -> Result<Page<service_request::Model>, ServiceError> {
        let requested_by = if principal.is_admin() {
            filter.requested_by
        } else {
            principal.require_office_admin()?;
            Some(principal.user_id)
        };
        let mut query = service_request::Entity::find();
        if let Some(status) = filter.status { query = query.filter(service_request::Column::Status.eq(status)); }
        if let Some(uid) = requested_by { query = query.filter(service_request::Column::RequestedBy.eq(uid)); }
        let (page_idx, per_page) = opts.normalize();
        let paginator = query
            .order_by_desc(service_request::Column::CreatedAt)
            .order_by_desc(service_request::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_idx).await?;
        let (page, per_page) = opts.effective();
        Ok(Page { items, page, per_page, total })
    }

    pub async fn get_request(&self, principal: &Principal, id: Uuid) -> Result<service_request::Model, ServiceError> {
        let request = find_request(&self.db, id).await?;
        if !principal.is_admin() && request.requested_by != principal.user_id {
            return Err(ServiceError::forbidden("office admins may only view their own requests"));
        }
        Ok(request)
    }

    /// Create the requested root service, mark the request approved and claim
    /// the service for the requesting office, all or nothing.
    #[instrument(skip(self, principal, notes), fields(reviewer = %principal.user_id))]
    pub async fn approve(&self, principal: &Principal, id: Uuid, notes: Option<String>) -> Result<ApprovalOutcome, ServiceError> {
        principal.require_admin()?;
        let txn = self.db.begin().await?;
        let request = find_request(&txn, id).await?;
        ensure_pending(&request)?;

        let now = Utc::now();
        let slug = approval_slug(&request.service_name, now.timestamp_millis().max(0) as u128);
        ensure_slug_free(&txn, None, &slug, None).await?;
        let service = service_node::ActiveModel {
            id: Set(Uuid::new_v4()),
            service_code: Set(generate_service_code()),
            parent_id: Set(None),
            slug: Set(slug),
            name: Set(request.service_name.clone()),
            name_local: Set(None),
            description: Set(request.description.clone()),
            level: Set(0),
            priority: Set(request.priority.unwrap_or_default()),
            is_online_available: Set(false),
            online_url: Set(None),
            eligibility: Set(None),
            validity_period: Set(None),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        if let Some(cid) = request.category_id {
            link_categories(&txn, service.id, &[cid]).await?;
        }

        let res = service_request::Entity::update_many()
            .set(service_request::ActiveModel {
                status: Set(RequestStatus::Approved),
                reviewed_by: Set(Some(principal.user_id)),
                reviewed_at: Set(Some(now.into())),
                review_notes: Set(notes),
                approved_service_id: Set(Some(service.id)),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .filter(service_request::Column::Id.eq(id))
            .filter(service_request::Column::Status.eq(RequestStatus::Pending))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::conflict("request was decided concurrently"));
        }

        let claim = match request.office_id {
            Some(office_id) => Some(
                insert_auto_claim(
                    &txn,
                    office_id,
                    service.id,
                    request.requested_by,
                    format!("Auto-claimed on approval of service request {id}"),
                )
                .await?,
            ),
            None => None,
        };
        let request = find_request(&txn, id).await?;
        txn.commit().await?;

        info!(request_id = %id, service_id = %service.id, auto_claimed = claim.is_some(), "service_request_approved");
        Ok(ApprovalOutcome { request, service, claim })
    }

    /// Record a rejection. No catalog data changes.
    #[instrument(skip(self, principal, reason, notes), fields(reviewer = %principal.user_id))]
    pub async fn reject(&self, principal: &Principal, id: Uuid, reason: &str, notes: Option<String>) -> Result<service_request::Model, ServiceError> {
        principal.require_admin()?;
        let reason = reason.trim();
        if reason.chars().count() < self.cfg.min_rejection_reason_len {
            return Err(ServiceError::Validation(format!(
                "rejection reason must be at least {} characters",
                self.cfg.min_rejection_reason_len
            )));
        }
        let request = find_request(&self.db, id).await?;
        ensure_pending(&request)?;

        let now = Utc::now();
        let res = service_request::Entity::update_many()
            .set(service_request::ActiveModel {
                status: Set(RequestStatus::Rejected),
                reviewed_by: Set(Some(principal.user_id)),
                reviewed_at: Set(Some(now.into())),
                review_notes: Set(notes),
                rejection_reason: Set(Some(reason.to_string())),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .filter(service_request::Column::Id.eq(id))
            .filter(service_request::Column::Status.eq(RequestStatus::Pending))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::conflict("request was decided concurrently"));
        }
        info!(request_id = %id, "service_request_rejected");
        find_request(&self.db, id).await
    }

    /// Counts by status, computed on every call.
    pub async fn stats(&self) -> Result<RequestStats, ServiceError> {
        let count = |status: RequestStatus| {
            service_request::Entity::find()
                .filter(service_request::Column::Status.eq(status))
                .count(&self.db)
        };
        let pending = count(RequestStatus::Pending).await?;
        let approved = count(RequestStatus::Approved).await?;
        let rejected = count(RequestStatus::Rejected).await?;
        Ok(RequestStats { total: pending + approved + rejected, pending, approved, rejected })
    }
}

async fn find_request<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<service_request::Model, ServiceError> {
    service_request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service request"))
}

fn ensure_pending(request: &service_request::Model) -> Result<(), ServiceError> {
    if request.status.is_terminal() {
        return Err(ServiceError::conflict(format!("request is already {:?}", request.status)));
    }
    Ok(())
}
