//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_category;
mod m20240101_000002_create_office_category;
mod m20240101_000003_create_location;
mod m20240101_000004_create_service_node;
mod m20240101_000005_create_service_category;
mod m20240101_000006_create_service_step;
mod m20240101_000007_create_step_detail;
mod m20240101_000008_create_office;
mod m20240101_000009_create_app_user;
mod m20240101_000010_create_office_service;
mod m20240101_000011_create_service_request;
mod m20240101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_category::Migration),
            Box::new(m20240101_000002_create_office_category::Migration),
            Box::new(m20240101_000003_create_location::Migration),
            Box::new(m20240101_000004_create_service_node::Migration),
            Box::new(m20240101_000005_create_service_category::Migration),
            Box::new(m20240101_000006_create_service_step::Migration),
            Box::new(m20240101_000007_create_step_detail::Migration),
            Box::new(m20240101_000008_create_office::Migration),
            Box::new(m20240101_000009_create_app_user::Migration),
            Box::new(m20240101_000010_create_office_service::Migration),
            Box::new(m20240101_000011_create_service_request::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000099_add_indexes::Migration),
        ]
    }
}
