#![cfg(test)]
use chrono::Utc;
use configs::CatalogConfig;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::location::{district, municipality, province, ward};
use models::office_category;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::catalog::domain::{NewService, StepInput};
use crate::catalog::CatalogService;
use crate::identity::Principal;
use crate::office::domain::NewOffice;
use crate::office::OfficeRegistry;

/// A freshly migrated private SQLite database for the current test.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn admin() -> Principal { Principal::admin(Uuid::new_v4()) }

pub fn catalog(db: &DatabaseConnection) -> CatalogService {
    CatalogService::new(db.clone(), CatalogConfig::default())
}

/// Province 1 > district 10 > municipality 100 > wards 1000 (no. 4) and 1001 (no. 5).
pub async fn seed_locations(db: &DatabaseConnection) -> Result<(), anyhow::Error> {
    province::ActiveModel { id: Set(1), name: Set("Bagmati".into()), name_local: Set(None) }.insert(db).await?;
    district::ActiveModel { id: Set(10), province_id: Set(1), name: Set("Kathmandu".into()), name_local: Set(None) }
        .insert(db)
        .await?;
    municipality::ActiveModel {
        id: Set(100),
        district_id: Set(10),
        name: Set("Kageshwori Manohara".into()),
        name_local: Set(None),
    }
    .insert(db)
    .await?;
    ward::ActiveModel { id: Set(1000), municipality_id: Set(100), number: Set(4) }.insert(db).await?;
    ward::ActiveModel { id: Set(1001), municipality_id: Set(100), number: Set(5) }.insert(db).await?;
    Ok(())
}

pub async fn office_category(db: &DatabaseConnection, name: &str) -> Result<office_category::Model, anyhow::Error> {
    Ok(office_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?)
}

pub fn new_office(code: &str, name: &str, category_id: Uuid) -> NewOffice {
    NewOffice { office_code: code.to_string(), name: name.to_string(), category_id, ..Default::default() }
}

/// An office in a new category, attached to nothing.
pub async fn office(db: &DatabaseConnection, code: &str) -> Result<Uuid, anyhow::Error> {
    let cat = office_category(db, &format!("Category {code}")).await?;
    let registry = OfficeRegistry::new(db.clone());
    let office = registry.create_office(&admin(), new_office(code, &format!("Office {code}"), cat.id)).await?;
    Ok(office.id)
}

pub fn new_service(name: &str, parent_id: Option<Uuid>) -> NewService {
    NewService { parent_id, name: name.to_string(), ..Default::default() }
}

pub fn step(title: &str) -> StepInput {
    StepInput { title: title.to_string(), ..Default::default() }
}

/// Creates a service through the catalog and returns its id.
pub async fn service(db: &DatabaseConnection, name: &str, parent_id: Option<Uuid>) -> Result<Uuid, anyhow::Error> {
    let detail = catalog(db).create_service(&admin(), new_service(name, parent_id)).await?;
    Ok(detail.service.id)
}
