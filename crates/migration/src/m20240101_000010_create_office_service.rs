//! Create `office_service` claim ledger.
//! The unique `(office_id, service_id)` index is the concurrency control for claiming.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OfficeService::Table)
                    .if_not_exists()
                    .col(uuid(OfficeService::Id).primary_key())
                    .col(uuid(OfficeService::OfficeId))
                    .col(uuid(OfficeService::ServiceId))
                    .col(string_len(OfficeService::Status, 16))
                    .col(uuid_null(OfficeService::ClaimedBy))
                    .col(timestamp_with_time_zone_null(OfficeService::ClaimedAt))
                    .col(uuid_null(OfficeService::RevokedBy))
                    .col(timestamp_with_time_zone_null(OfficeService::RevokedAt))
                    .col(text_null(OfficeService::CustomDescription))
                    .col(text_null(OfficeService::CustomFees))
                    .col(text_null(OfficeService::CustomRequirements))
                    .col(text_null(OfficeService::Notes))
                    .col(timestamp_with_time_zone(OfficeService::CreatedAt))
                    .col(timestamp_with_time_zone(OfficeService::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_office_service_office")
                            .from(OfficeService::Table, OfficeService::OfficeId)
                            .to(Office::Table, Office::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_office_service_service")
                            .from(OfficeService::Table, OfficeService::ServiceId)
                            .to(ServiceNode::Table, ServiceNode::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_office_service_pair")
                    .table(OfficeService::Table)
                    .col(OfficeService::OfficeId)
                    .col(OfficeService::ServiceId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OfficeService::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OfficeService {
    Table,
    Id,
    OfficeId,
    ServiceId,
    Status,
    ClaimedBy,
    ClaimedAt,
    RevokedBy,
    RevokedAt,
    CustomDescription,
    CustomFees,
    CustomRequirements,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Office { Table, Id }

#[derive(DeriveIden)]
enum ServiceNode { Table, Id }
