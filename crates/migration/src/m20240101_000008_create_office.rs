//! Create `office` table.
//! The location attachment is `(location_kind, location_id)` and is checked by the application.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Office::Table)
                    .if_not_exists()
                    .col(uuid(Office::Id).primary_key())
                    .col(string_len(Office::OfficeCode, 64).unique_key())
                    .col(string_len(Office::Name, 255))
                    .col(string_len_null(Office::NameLocal, 255))
                    .col(string_len_null(Office::Address, 512))
                    .col(string_len_null(Office::AddressLocal, 512))
                    .col(string_len_null(Office::Phone, 64))
                    .col(string_len_null(Office::Email, 255))
                    .col(uuid(Office::CategoryId))
                    .col(string_len_null(Office::LocationKind, 16))
                    .col(integer_null(Office::LocationId))
                    .col(boolean(Office::IsActive))
                    .col(timestamp_with_time_zone(Office::CreatedAt))
                    .col(timestamp_with_time_zone(Office::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_office_category")
                            .from(Office::Table, Office::CategoryId)
                            .to(OfficeCategory::Table, OfficeCategory::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Office::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Office {
    Table,
    Id,
    OfficeCode,
    Name,
    NameLocal,
    Address,
    AddressLocal,
    Phone,
    Email,
    CategoryId,
    LocationKind,
    LocationId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OfficeCategory { Table, Id }
