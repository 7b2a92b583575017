use chrono::Utc;
use common::pagination::Pagination;
use common::types::Page;
use configs::CatalogConfig;
use models::{category, office_service, service_category, service_node, service_request};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{default_slug, validate_steps, BreadcrumbEntry, NewService, ServiceDetail, ServiceUpdate};
use super::{steps, tree};
use crate::errors::ServiceError;
use crate::identity::Principal;

/// Catalog tree operations: the self-referential service forest and its steps.
#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
    cfg: CatalogConfig,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection, cfg: CatalogConfig) -> Self { Self { db, cfg } }

    /// Create a node with its nested steps as one write unit.
    ///
    /// `level` is derived from the parent; the slug defaults to the slugified name
    /// and must be unique among siblings.
    #[instrument(skip(self, principal, input), fields(name = %input.name, parent_id = ?input.parent_id))]
    pub async fn create_service(&self, principal: &Principal, input: NewService) -> Result<ServiceDetail, ServiceError> {
        principal.require_admin()?;
        service_node::validate_name(&input.name)?;
        let slug = match &input.slug {
            Some(s) => s.trim().to_string(),
            None => default_slug(&input.name, Utc::now().timestamp_millis().max(0) as u128),
        };
        service_node::validate_slug(&slug)?;
        let code = match &input.service_code {
            Some(c) => c.trim().to_string(),
            None => generate_service_code(),
        };
        service_node::validate_service_code(&code)?;
        if let Some(url) = &input.online_url { service_node::validate_online_url(url)?; }
        validate_steps(&input.steps)?;

        let txn = self.db.begin().await?;
        let level = match input.parent_id {
            Some(pid) => {
                let parent = tree::find_node(&txn, pid)
                    .await
                    .map_err(|_| ServiceError::NotFound(format!("parent service {pid} not found")))?;
                tree::ensure_can_become_parent(&txn, pid).await?;
                parent.level + 1
            }
            None => 0,
        };
        ensure_slug_free(&txn, input.parent_id, &slug, None).await?;
        ensure_code_free(&txn, &code).await?;

        let now = Utc::now();
        let created = service_node::ActiveModel {
            id: Set(Uuid::new_v4()),
            service_code: Set(code),
            parent_id: Set(input.parent_id),
            slug: Set(slug),
            name: Set(input.name.trim().to_string()),
            name_local: Set(input.name_local),
            description: Set(input.description),
            level: Set(level),
            priority: Set(input.priority),
            is_online_available: Set(input.is_online_available),
            online_url: Set(input.online_url),
            eligibility: Set(input.eligibility),
            validity_period: Set(input.validity_period),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        link_categories(&txn, created.id, &input.category_ids).await?;
        steps::insert_steps(&txn, created.id, &input.steps).await?;
        txn.commit().await?;

        info!(service_id = %created.id, level = created.level, steps = input.steps.len(), "service_created");
        self.get_service(created.id).await
    }

    /// Update scalar attributes, optionally move the node, replace its categories,
    /// and (when `steps` is given) replace every step from scratch.
    #[instrument(skip(self, principal, update), fields(service_id = %id))]
    pub async fn update_service(&self, principal: &Principal, id: Uuid, update: ServiceUpdate) -> Result<ServiceDetail, ServiceError> {
        principal.require_admin()?;
        if let Some(name) = &update.name { service_node::validate_name(name)?; }
        if let Some(slug) = &update.slug { service_node::validate_slug(slug)?; }
        if let Some(Some(url)) = &update.online_url { service_node::validate_online_url(url)?; }
        if let Some(steps) = &update.steps { validate_steps(steps)?; }

        let txn = self.db.begin().await?;
        let current = tree::find_node(&txn, id).await?;
        let old_level = current.level;

        let (parent_id, level) = match update.parent_id {
            None => (current.parent_id, current.level),
            Some(None) => (None, 0),
            Some(Some(pid)) if pid == id => {
                return Err(ServiceError::conflict("a service cannot be its own parent"));
            }
            Some(Some(pid)) => {
                let parent = tree::find_node(&txn, pid)
                    .await
                    .map_err(|_| ServiceError::NotFound(format!("parent service {pid} not found")))?;
                if tree::is_in_subtree(&txn, id, pid, self.cfg.max_tree_depth).await? {
                    return Err(ServiceError::conflict("cannot move a service under one of its descendants"));
                }
                if current.parent_id != Some(pid) {
                    tree::ensure_can_become_parent(&txn, pid).await?;
                }
                (Some(pid), parent.level + 1)
            }
        };
        let slug = update.slug.clone().unwrap_or_else(|| current.slug.clone());
        if slug != current.slug || parent_id != current.parent_id {
            ensure_slug_free(&txn, parent_id, &slug, Some(id)).await?;
        }

        let mut am: service_node::ActiveModel = current.into();
        am.parent_id = Set(parent_id);
        am.level = Set(level);
        am.slug = Set(slug);
        if let Some(name) = update.name { am.name = Set(name.trim().to_string()); }
        if let Some(v) = update.name_local { am.name_local = Set(v); }
        if let Some(v) = update.description { am.description = Set(v); }
        if let Some(v) = update.priority { am.priority = Set(v); }
        if let Some(v) = update.is_online_available { am.is_online_available = Set(v); }
        if let Some(v) = update.online_url { am.online_url = Set(v); }
        if let Some(v) = update.eligibility { am.eligibility = Set(v); }
        if let Some(v) = update.validity_period { am.validity_period = Set(v); }
        if let Some(v) = update.is_active { am.is_active = Set(v); }
        am.updated_at = Set(Utc::now().into());
        am.update(&txn).await?;

        if level != old_level {
            let moved = tree::relevel_subtree(&txn, id, level).await?;
            info!(service_id = %id, level, descendants = moved, "service_moved");
        }
        if let Some(category_ids) = &update.category_ids {
            service_category::Entity::delete_many()
                .filter(service_category::Column::ServiceId.eq(id))
                .exec(&txn)
                .await?;
            link_categories(&txn, id, category_ids).await?;
        }
        if let Some(new_steps) = &update.steps {
            let removed = steps::delete_steps(&txn, id).await?;
            steps::insert_steps(&txn, id, new_steps).await?;
            info!(service_id = %id, removed, inserted = new_steps.len(), "service_steps_replaced");
        }
        txn.commit().await?;
        self.get_service(id).await
    }

    /// Delete a childless node together with its steps, category links and claims.
    /// A service created by an approved request is kept so the request's
    /// `approved_service_id` always resolves.
    #[instrument(skip(self, principal), fields(service_id = %id))]
    pub async fn delete_service(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        principal.require_admin()?;
        let txn = self.db.begin().await?;
        tree::find_node(&txn, id).await?;
        let children = tree::child_count(&txn, id).await?;
        if children > 0 {
            return Err(ServiceError::conflict(format!(
                "cannot delete a service with {children} child service(s)"
            )));
        }
        let origin = service_request::Entity::find()
            .filter(service_request::Column::ApprovedServiceId.eq(id))
            .one(&txn)
            .await?;
        if let Some(req) = origin {
            return Err(ServiceError::conflict(format!(
                "service was created by approved request {}; it cannot be deleted",
                req.id
            )));
        }
        steps::delete_steps(&txn, id).await?;
        service_category::Entity::delete_many()
            .filter(service_category::Column::ServiceId.eq(id))
            .exec(&txn)
            .await?;
        let claims = office_service::Entity::delete_many()
            .filter(office_service::Column::ServiceId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        if claims > 0 {
            warn!(service_id = %id, claims, "deleted office claims together with service");
        }
        service_node::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(service_id = %id, "service_deleted");
        Ok(())
    }

    /// Node with its ordered steps, category ids and a branch flag.
    pub async fn get_service(&self, id: Uuid) -> Result<ServiceDetail, ServiceError> {
        let service = tree::find_node(&self.db, id).await?;
        let has_children = tree::child_count(&self.db, id).await? > 0;
        let category_ids = service_category::Entity::find()
            .filter(service_category::Column::ServiceId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|l| l.category_id)
            .collect();
        let steps = steps::load_steps(&self.db, id).await?;
        Ok(ServiceDetail { service, category_ids, has_children, steps })
    }

    /// Children of `parent_id` (roots when `None`), ordered by name.
    pub async fn list_children(&self, parent_id: Option<Uuid>) -> Result<Vec<service_node::Model>, ServiceError> {
        let filter = match parent_id {
            Some(pid) => {
                tree::find_node(&self.db, pid).await?;
                service_node::Column::ParentId.eq(pid)
            }
            None => service_node::Column::ParentId.is_null(),
        };
        Ok(service_node::Entity::find()
            .filter(filter)
            .order_by_asc(service_node::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Case-insensitive substring search over name, localized name and description.
    pub async fn search_services(&self, term: &str, opts: Pagination) -> Result<Page<service_node::Model>, ServiceError> {
        let pattern = contains_pattern(term);
        let lower = |c: service_node::Column| Expr::expr(Func::lower(Expr::col((service_node::Entity, c))));
        let query = service_node::Entity::find()
            .filter(
                Condition::any()
                    .add(lower(service_node::Column::Name).like(pattern.clone()))
                    .add(lower(service_node::Column::NameLocal).like(pattern.clone()))
                    .add(lower(service_node::Column::Description).like(pattern)),
            )
            .order_by_asc(service_node::Column::Name);
        let (page_idx, per_page) = opts.normalize();
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_idx).await?;
        let (page, per_page) = opts.effective();
        Ok(Page { items, page, per_page, total })
    }

    /// The node if it exists and has no children.
    pub async fn find_leaf(&self, id: Uuid) -> Result<Option<service_node::Model>, ServiceError> {
        match service_node::Entity::find_by_id(id).one(&self.db).await? {
            Some(n) if tree::child_count(&self.db, id).await? == 0 => Ok(Some(n)),
            _ => Ok(None),
        }
    }

    /// The node if it exists and has at least one child.
    pub async fn find_branch(&self, id: Uuid) -> Result<Option<service_node::Model>, ServiceError> {
        match service_node::Entity::find_by_id(id).one(&self.db).await? {
            Some(n) if tree::child_count(&self.db, id).await? > 0 => Ok(Some(n)),
            _ => Ok(None),
        }
    }

    /// Root-first path to `id`.
    pub async fn breadcrumb(&self, id: Uuid) -> Result<Vec<BreadcrumbEntry>, ServiceError> {
        let mut chain = tree::ancestors(&self.db, id, self.cfg.max_tree_depth).await?;
        chain.reverse();
        Ok(chain
            .into_iter()
            .map(|n| BreadcrumbEntry { id: n.id, name: n.name, slug: n.slug, level: n.level })
            .collect())
    }

    /// Remove one step; later steps are renumbered to stay contiguous.
    #[instrument(skip(self, principal), fields(service_id = %service_id))]
    pub async fn remove_step(&self, principal: &Principal, service_id: Uuid, step_number: i32) -> Result<ServiceDetail, ServiceError> {
        principal.require_admin()?;
        let txn = self.db.begin().await?;
        tree::find_node(&txn, service_id).await?;
        steps::remove_step(&txn, service_id, step_number).await?;
        txn.commit().await?;
        self.get_service(service_id).await
    }

    pub async fn create_category(&self, principal: &Principal, name: &str, description: Option<String>) -> Result<category::Model, ServiceError> {
        principal.require_admin()?;
        service_node::validate_name(name)?;
        let slug = default_slug(name, Utc::now().timestamp_millis().max(0) as u128);
        service_node::validate_slug(&slug)?;
        let exists = category::Entity::find()
            .filter(category::Column::Slug.eq(slug.clone()))
            .one(&self.db)
            .await?;
        if exists.is_some() {
            return Err(ServiceError::conflict(format!("category '{slug}' already exists")));
        }
        Ok(category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            slug: Set(slug),
            description: Set(description),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(category::Entity::find().order_by_asc(category::Column::Name).all(&self.db).await?)
    }

    /// Delete a category; its links to services go with it.
    pub async fn delete_category(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        principal.require_admin()?;
        let txn = self.db.begin().await?;
        if category::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(ServiceError::not_found("category"));
        }
        service_category::Entity::delete_many()
            .filter(service_category::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        category::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

/// `SRV-YYYYMMDD-XXXXXXXX`
pub(crate) fn generate_service_code() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("SRV-{}-{}", Utc::now().format("%Y%m%d"), suffix)
}

pub(crate) async fn ensure_slug_free<C: ConnectionTrait>(
    db: &C,
    parent_id: Option<Uuid>,
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let scope = match parent_id {
        Some(pid) => service_node::Column::ParentId.eq(pid),
        None => service_node::Column::ParentId.is_null(),
    };
    let mut query = service_node::Entity::find()
        .filter(scope)
        .filter(service_node::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(service_node::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(ServiceError::conflict(format!("slug '{slug}' is already used by a sibling service")));
    }
    Ok(())
}

/// `%term%` with `%`, `_` and `\` in the term matched literally.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') { escaped.push('\\'); }
        escaped.push(ch);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

async fn ensure_code_free<C: ConnectionTrait>(db: &C, code: &str) -> Result<(), ServiceError> {
    let taken = service_node::Entity::find()
        .filter(service_node::Column::ServiceCode.eq(code))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(ServiceError::conflict(format!("service code '{code}' already exists")));
    }
    Ok(())
}

pub(crate) async fn link_categories<C: ConnectionTrait>(db: &C, service_id: Uuid, category_ids: &[Uuid]) -> Result<(), ServiceError> {
    let mut seen = std::collections::HashSet::new();
    for cid in category_ids.iter().filter(|c| seen.insert(**c)) {
        if category::Entity::find_by_id(*cid).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("category {cid} not found")));
        }
        service_category::ActiveModel { service_id: Set(service_id), category_id: Set(*cid) }
            .insert(db)
            .await?;
    }
    Ok(())
}
