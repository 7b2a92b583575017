//! Create `service_request` table.
//! `category_id` and `office_id` carry no FK: they are checked on submit and resolved again on approval.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceRequest::Table)
                    .if_not_exists()
                    .col(uuid(ServiceRequest::Id).primary_key())
                    .col(uuid(ServiceRequest::RequestedBy))
                    .col(uuid_null(ServiceRequest::OfficeId))
                    .col(string_len(ServiceRequest::ServiceName, 255))
                    .col(text_null(ServiceRequest::Description))
                    .col(uuid_null(ServiceRequest::CategoryId))
                    .col(string_len_null(ServiceRequest::Priority, 16))
                    .col(text_null(ServiceRequest::Justification))
                    .col(string_len(ServiceRequest::Status, 16))
                    .col(uuid_null(ServiceRequest::ReviewedBy))
                    .col(timestamp_with_time_zone_null(ServiceRequest::ReviewedAt))
                    .col(text_null(ServiceRequest::ReviewNotes))
                    .col(text_null(ServiceRequest::RejectionReason))
                    .col(uuid_null(ServiceRequest::ApprovedServiceId))
                    .col(timestamp_with_time_zone(ServiceRequest::CreatedAt))
                    .col(timestamp_with_time_zone(ServiceRequest::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_request_approved_service")
                            .from(ServiceRequest::Table, ServiceRequest::ApprovedServiceId)
                            .to(ServiceNode::Table, ServiceNode::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceRequest::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceRequest {
    Table,
    Id,
    RequestedBy,
    OfficeId,
    ServiceName,
    Description,
    CategoryId,
    Priority,
    Justification,
    Status,
    ReviewedBy,
    ReviewedAt,
    ReviewNotes,
    RejectionReason,
    ApprovedServiceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ServiceNode { Table, Id }
