use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use common::pagination::Pagination;
use common::types::Page;
use models::{office, office_category, office_service, step_office_category, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{LocationChain, NewOffice, OfficeFilter, OfficeLocation, OfficeUpdate, OfficeView};
use super::location::{resolve_chain, LocationDirectory, SeaOrmLocationDirectory};
use crate::errors::ServiceError;
use crate::identity::Principal;

/// Offices, their categories and their place in the location hierarchy.
#[derive(Clone)]
pub struct OfficeRegistry {
    db: DatabaseConnection,
    locations: Arc<dyn LocationDirectory>,
}

impl OfficeRegistry {
    pub fn new(db: DatabaseConnection) -> Self {
        let locations = Arc::new(SeaOrmLocationDirectory::new(db.clone()));
        Self { db, locations }
    }

    pub fn with_locations(db: DatabaseConnection, locations: Arc<dyn LocationDirectory>) -> Self { Self { db, locations } }

    /// Create an office. When several location ids are supplied only the most
    /// specific one is kept.
    #[instrument(skip(self, principal, input), fields(office_code = %input.office_code))]
    pub async fn create_office(&self, principal: &Principal, input: NewOffice) -> Result<office::Model, ServiceError> {
        principal.require_admin()?;
        office::validate_office_code(&input.office_code)?;
        if input.name.trim().is_empty() {
            return Err(ServiceError::validation("office name required"));
        }
        if let Some(email) = &input.email { office::validate_email(email)?; }
        self.require_category(input.category_id).await?;
        let location = input.location();
        if let Some(loc) = location { self.require_location(loc).await?; }
        let code = input.office_code.trim().to_string();
        let taken = office::Entity::find()
            .filter(office::Column::OfficeCode.eq(code.clone()))
            .one(&self.db)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::conflict(format!("office code '{code}' already exists")));
        }

        let now = Utc::now();
        let created = office::ActiveModel {
            id: Set(Uuid::new_v4()),
            office_code: Set(code),
            name: Set(input.name.trim().to_string()),
            name_local: Set(input.name_local),
            address: Set(input.address),
            address_local: Set(input.address_local),
            phone: Set(input.phone),
            email: Set(input.email),
            category_id: Set(input.category_id),
            location_kind: Set(location.map(|l| l.kind())),
            location_id: Set(location.map(|l| l.id())),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;
        info!(office_id = %created.id, location = ?location, "office_created");
        Ok(created)
    }

    #[instrument(skip(self, principal, update), fields(office_id = %id))]
    pub async fn update_office(&self, principal: &Principal, id: Uuid, update: OfficeUpdate) -> Result<office::Model, ServiceError> {
        principal.require_admin()?;
        let current = self.find(id).await?;
        let mut am: office::ActiveModel = current.clone().into();
        if let Some(code) = update.office_code {
            office::validate_office_code(&code)?;
            let code = code.trim().to_string();
            if code != current.office_code {
                let taken = office::Entity::find()
                    .filter(office::Column::OfficeCode.eq(code.clone()))
                    .one(&self.db)
                    .await?;
                if taken.is_some() {
                    return Err(ServiceError::conflict(format!("office code '{code}' already exists")));
                }
            }
            am.office_code = Set(code);
        }
        if let Some(name) = update.name {
            if name.trim().is_empty() { return Err(ServiceError::validation("office name required")); }
            am.name = Set(name.trim().to_string());
        }
        if let Some(v) = update.name_local { am.name_local = Set(v); }
        if let Some(v) = update.address { am.address = Set(v); }
        if let Some(v) = update.address_local { am.address_local = Set(v); }
        if let Some(v) = update.phone { am.phone = Set(v); }
        if let Some(v) = update.email {
            if let Some(email) = &v { office::validate_email(email)?; }
            am.email = Set(v);
        }
        if let Some(cid) = update.category_id {
            self.require_category(cid).await?;
            am.category_id = Set(cid);
        }
        if let Some(location) = update.location {
            if let Some(loc) = location { self.require_location(loc).await?; }
            am.location_kind = Set(location.map(|l| l.kind()));
            am.location_id = Set(location.map(|l| l.id()));
        }
        am.updated_at = Set(Utc::now().into());
        Ok(am.update(&self.db).await?)
    }

    pub async fn get_office(&self, id: Uuid) -> Result<OfficeView, ServiceError> {
        let office = self.find(id).await?;
        let location = self.resolve_location(&office).await?;
        Ok(OfficeView::new(office, location))
    }

    /// Offices ordered by name, optionally narrowed by category and active flag.
    pub async fn list_offices(&self, filter: OfficeFilter, opts: Pagination) -> Result<Page<office::Model>, ServiceError> {
        let mut query = office::Entity::find();
        if let Some(cid) = filter.category_id { query = query.filter(office::Column::CategoryId.eq(cid)); }
        if let Some(active) = filter.is_active { query = query.filter(office::Column::IsActive.eq(active)); }
        let (page_idx, per_page) = opts.normalize();
        let paginator = query.order_by_asc(office::Column::Name).paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_idx).await?;
        let (page, per_page) = opts.effective();
        Ok(Page { items, page, per_page, total })
    }

    /// Case-insensitive match on name, localized name, addresses and the
    /// resolved ward number, municipality and district names.
    pub async fn search_offices(&self, term: &str, opts: Pagination) -> Result<Page<OfficeView>, ServiceError> {
        let offices = office::Entity::find().order_by_asc(office::Column::Name).all(&self.db).await?;
        let mut chains: HashMap<OfficeLocation, LocationChain> = HashMap::new();
        let mut matched = Vec::new();
        for o in offices {
            let location = match OfficeLocation::from_parts(o.location_kind, o.location_id) {
                Some(loc) => match chains.get(&loc) {
                    Some(chain) => Some(chain.clone()),
                    None => {
                        let chain = resolve_chain(self.locations.as_ref(), loc).await?;
                        chains.insert(loc, chain.clone());
                        Some(chain)
                    }
                },
                None => None,
            };
            let view = OfficeView::new(o, location);
            if view.matches(term) { matched.push(view); }
        }
        let total = matched.len() as u64;
        let (page, per_page) = opts.effective();
        Ok(Page { items: opts.slice(matched), page, per_page, total })
    }

    #[instrument(skip(self, principal), fields(office_id = %id))]
    pub async fn set_active(&self, principal: &Principal, id: Uuid, active: bool) -> Result<office::Model, ServiceError> {
        principal.require_admin()?;
        let mut am: office::ActiveModel = self.find(id).await?.into();
        am.is_active = Set(active);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        info!(office_id = %id, active, "office_active_changed");
        Ok(updated)
    }

    /// Delete an office with its claims; its admin user is detached and deactivated.
    #[instrument(skip(self, principal), fields(office_id = %id))]
    pub async fn delete_office(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        principal.require_admin()?;
        let txn = self.db.begin().await?;
        if office::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(ServiceError::not_found("office"));
        }
        let claims = office_service::Entity::delete_many()
            .filter(office_service::Column::OfficeId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        if claims > 0 {
            warn!(office_id = %id, claims, "deleted office claims together with office");
        }
        user::Entity::update_many()
            .set(user::ActiveModel { office_id: Set(None), is_active: Set(false), ..Default::default() })
            .filter(user::Column::OfficeId.eq(id))
            .exec(&txn)
            .await?;
        office::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(office_id = %id, "office_deleted");
        Ok(())
    }

    /// Full location chain for an office; `None` when it is not attached anywhere.
    pub async fn resolve_location(&self, office: &office::Model) -> Result<Option<LocationChain>, ServiceError> {
        match OfficeLocation::from_parts(office.location_kind, office.location_id) {
            Some(loc) => Ok(Some(resolve_chain(self.locations.as_ref(), loc).await?)),
            None => Ok(None),
        }
    }

    pub async fn create_office_category(&self, principal: &Principal, name: &str, description: Option<String>) -> Result<office_category::Model, ServiceError> {
        principal.require_admin()?;
        let name = name.trim();
        if name.is_empty() { return Err(ServiceError::validation("office category name required")); }
        let taken = office_category::Entity::find()
            .filter(office_category::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::conflict(format!("office category '{name}' already exists")));
        }
        Ok(office_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(description),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn list_office_categories(&self) -> Result<Vec<office_category::Model>, ServiceError> {
        Ok(office_category::Entity::find().order_by_asc(office_category::Column::Name).all(&self.db).await?)
    }

    /// Rejected while any office is still in the category; step tags are dropped.
    pub async fn delete_office_category(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        principal.require_admin()?;
        let txn = self.db.begin().await?;
        if office_category::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(ServiceError::not_found("office category"));
        }
        let in_use = office::Entity::find().filter(office::Column::CategoryId.eq(id)).count(&txn).await?;
        if in_use > 0 {
            return Err(ServiceError::conflict(format!("office category is used by {in_use} office(s)")));
        }
        step_office_category::Entity::delete_many()
            .filter(step_office_category::Column::OfficeCategoryId.eq(id))
            .exec(&txn)
            .await?;
        office_category::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<office::Model, ServiceError> {
        office::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("office"))
    }

    async fn require_category(&self, id: Uuid) -> Result<(), ServiceError> {
        match office_category::Entity::find_by_id(id).one(&self.db).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!("office category {id} not found"))),
        }
    }

    async fn require_location(&self, loc: OfficeLocation) -> Result<(), ServiceError> {
        if self.locations.exists(loc).await? { Ok(()) } else {
            Err(ServiceError::NotFound(format!("{:?} {} not found", loc.kind(), loc.id())))
        }
    }
}
