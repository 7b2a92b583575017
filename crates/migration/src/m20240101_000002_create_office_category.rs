//! Create `office_category` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OfficeCategory::Table)
                    .if_not_exists()
                    .col(uuid(OfficeCategory::Id).primary_key())
                    .col(string_len(OfficeCategory::Name, 128).unique_key())
                    .col(text_null(OfficeCategory::Description))
                    .col(timestamp_with_time_zone(OfficeCategory::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OfficeCategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OfficeCategory {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}
