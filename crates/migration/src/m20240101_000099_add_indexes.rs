use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ServiceNode: children lookup by parent
        manager
            .create_index(
                Index::create()
                    .name("idx_service_node_parent")
                    .table(ServiceNode::Table)
                    .col(ServiceNode::ParentId)
                    .to_owned(),
            )
            .await?;

        // Steps of a service, read in step order
        manager
            .create_index(
                Index::create()
                    .name("idx_service_step_service")
                    .table(ServiceStep::Table)
                    .col(ServiceStep::ServiceId)
                    .to_owned(),
            )
            .await?;

        // Office: filter by category
        manager
            .create_index(
                Index::create()
                    .name("idx_office_category")
                    .table(Office::Table)
                    .col(Office::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Claims listed per service and status
        manager
            .create_index(
                Index::create()
                    .name("idx_office_service_service_status")
                    .table(OfficeService::Table)
                    .col(OfficeService::ServiceId)
                    .col(OfficeService::Status)
                    .to_owned(),
            )
            .await?;

        // Requests listed by status, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_service_request_status")
                    .table(ServiceRequest::Table)
                    .col(ServiceRequest::Status)
                    .col(ServiceRequest::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_request_requested_by")
                    .table(ServiceRequest::Table)
                    .col(ServiceRequest::RequestedBy)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_service_node_parent").table(ServiceNode::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_step_service").table(ServiceStep::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_office_category").table(Office::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_office_service_service_status").table(OfficeService::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_request_status").table(ServiceRequest::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_request_requested_by").table(ServiceRequest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceNode { Table, ParentId }

#[derive(DeriveIden)]
enum ServiceStep { Table, ServiceId }

#[derive(DeriveIden)]
enum Office { Table, CategoryId }

#[derive(DeriveIden)]
enum OfficeService { Table, ServiceId, Status }

#[derive(DeriveIden)]
enum ServiceRequest { Table, Status, CreatedAt, RequestedBy }
