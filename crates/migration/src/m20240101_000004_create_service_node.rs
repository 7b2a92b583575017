//! Create `service_node` table: the self-referential service catalog.
//! Deleting a parent is restricted; the application rejects it first.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceNode::Table)
                    .if_not_exists()
                    .col(uuid(ServiceNode::Id).primary_key())
                    .col(string_len(ServiceNode::ServiceCode, 64).unique_key())
                    .col(uuid_null(ServiceNode::ParentId))
                    .col(string_len(ServiceNode::Slug, 160))
                    .col(string_len(ServiceNode::Name, 255))
                    .col(string_len_null(ServiceNode::NameLocal, 255))
                    .col(text_null(ServiceNode::Description))
                    .col(integer(ServiceNode::Level))
                    .col(string_len(ServiceNode::Priority, 16))
                    .col(boolean(ServiceNode::IsOnlineAvailable))
                    .col(string_len_null(ServiceNode::OnlineUrl, 512))
                    .col(text_null(ServiceNode::Eligibility))
                    .col(string_len_null(ServiceNode::ValidityPeriod, 128))
                    .col(boolean(ServiceNode::IsActive))
                    .col(timestamp_with_time_zone(ServiceNode::CreatedAt))
                    .col(timestamp_with_time_zone(ServiceNode::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_node_parent")
                            .from(ServiceNode::Table, ServiceNode::ParentId)
                            .to(ServiceNode::Table, ServiceNode::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Slug is unique among siblings
        manager
            .create_index(
                Index::create()
                    .name("uniq_service_node_parent_slug")
                    .table(ServiceNode::Table)
                    .col(ServiceNode::ParentId)
                    .col(ServiceNode::Slug)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceNode::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceNode {
    Table,
    Id,
    ServiceCode,
    ParentId,
    Slug,
    Name,
    NameLocal,
    Description,
    Level,
    Priority,
    IsOnlineAvailable,
    OnlineUrl,
    Eligibility,
    ValidityPeriod,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
