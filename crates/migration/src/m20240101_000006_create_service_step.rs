//! Create `service_step` table with unique `(service_id, step_number)`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceStep::Table)
                    .if_not_exists()
                    .col(uuid(ServiceStep::Id).primary_key())
                    .col(uuid(ServiceStep::ServiceId))
                    .col(integer(ServiceStep::StepNumber))
                    .col(string_len(ServiceStep::Title, 255))
                    .col(text_null(ServiceStep::Description))
                    .col(timestamp_with_time_zone(ServiceStep::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_step_service")
                            .from(ServiceStep::Table, ServiceStep::ServiceId)
                            .to(ServiceNode::Table, ServiceNode::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_service_step_number")
                    .table(ServiceStep::Table)
                    .col(ServiceStep::ServiceId)
                    .col(ServiceStep::StepNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceStep::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceStep {
    Table,
    Id,
    ServiceId,
    StepNumber,
    Title,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ServiceNode { Table, Id }
