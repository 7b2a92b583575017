//! Create `service_category` join table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceCategory::Table)
                    .if_not_exists()
                    .col(uuid(ServiceCategory::ServiceId))
                    .col(uuid(ServiceCategory::CategoryId))
                    .primary_key(
                        Index::create()
                            .col(ServiceCategory::ServiceId)
                            .col(ServiceCategory::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_category_service")
                            .from(ServiceCategory::Table, ServiceCategory::ServiceId)
                            .to(ServiceNode::Table, ServiceNode::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_category_category")
                            .from(ServiceCategory::Table, ServiceCategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceCategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceCategory { Table, ServiceId, CategoryId }

#[derive(DeriveIden)]
enum ServiceNode { Table, Id }

#[derive(DeriveIden)]
enum Category { Table, Id }
