//! Create the per-step detail tables: documents, fees, time requirement,
//! working hours, authorities and expected office categories.
//! Every row cascades with its step.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn step_fk(name: &str, table: impl IntoIden + 'static, col: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(ServiceStep::Table, ServiceStep::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StepDocument::Table)
                    .if_not_exists()
                    .col(uuid(StepDocument::Id).primary_key())
                    .col(uuid(StepDocument::StepId))
                    .col(string_len(StepDocument::Name, 255))
                    .col(string_len_null(StepDocument::NameLocal, 255))
                    .col(string_len(StepDocument::DocumentType, 32))
                    .col(boolean(StepDocument::IsMandatory))
                    .col(integer(StepDocument::Quantity))
                    .col(text_null(StepDocument::Notes))
                    .col(integer(StepDocument::SortOrder))
                    .foreign_key(&mut step_fk("fk_step_document_step", StepDocument::Table, StepDocument::StepId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StepFee::Table)
                    .if_not_exists()
                    .col(uuid(StepFee::Id).primary_key())
                    .col(uuid(StepFee::StepId))
                    .col(string_len(StepFee::FeeType, 32))
                    .col(string_len(StepFee::Label, 255))
                    .col(double(StepFee::Amount))
                    .col(string_len(StepFee::Currency, 3))
                    .col(boolean(StepFee::IsRefundable))
                    .col(text_null(StepFee::Notes))
                    .col(integer(StepFee::SortOrder))
                    .foreign_key(&mut step_fk("fk_step_fee_step", StepFee::Table, StepFee::StepId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StepTimeRequirement::Table)
                    .if_not_exists()
                    .col(uuid(StepTimeRequirement::Id).primary_key())
                    .col(uuid(StepTimeRequirement::StepId).unique_key())
                    .col(string_len_null(StepTimeRequirement::MinDuration, 128))
                    .col(string_len_null(StepTimeRequirement::AvgDuration, 128))
                    .col(string_len_null(StepTimeRequirement::MaxDuration, 128))
                    .col(text_null(StepTimeRequirement::Remarks))
                    .foreign_key(&mut step_fk("fk_step_time_requirement_step", StepTimeRequirement::Table, StepTimeRequirement::StepId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StepWorkingHours::Table)
                    .if_not_exists()
                    .col(uuid(StepWorkingHours::Id).primary_key())
                    .col(uuid(StepWorkingHours::StepId))
                    .col(string_len(StepWorkingHours::Day, 16))
                    .col(string_len_null(StepWorkingHours::OpenTime, 5))
                    .col(string_len_null(StepWorkingHours::CloseTime, 5))
                    .col(boolean(StepWorkingHours::IsClosed))
                    .foreign_key(&mut step_fk("fk_step_working_hours_step", StepWorkingHours::Table, StepWorkingHours::StepId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_step_working_hours_day")
                    .table(StepWorkingHours::Table)
                    .col(StepWorkingHours::StepId)
                    .col(StepWorkingHours::Day)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StepAuthority::Table)
                    .if_not_exists()
                    .col(uuid(StepAuthority::Id).primary_key())
                    .col(uuid(StepAuthority::StepId))
                    .col(string_len(StepAuthority::Role, 16))
                    .col(string_len(StepAuthority::Position, 255))
                    .col(string_len_null(StepAuthority::Department, 255))
                    .col(string_len_null(StepAuthority::Phone, 64))
                    .col(string_len_null(StepAuthority::Email, 255))
                    .col(integer(StepAuthority::SortOrder))
                    .foreign_key(&mut step_fk("fk_step_authority_step", StepAuthority::Table, StepAuthority::StepId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StepOfficeCategory::Table)
                    .if_not_exists()
                    .col(uuid(StepOfficeCategory::StepId))
                    .col(uuid(StepOfficeCategory::OfficeCategoryId))
                    .primary_key(
                        Index::create()
                            .col(StepOfficeCategory::StepId)
                            .col(StepOfficeCategory::OfficeCategoryId),
                    )
                    .foreign_key(&mut step_fk("fk_step_office_category_step", StepOfficeCategory::Table, StepOfficeCategory::StepId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_step_office_category_category")
                            .from(StepOfficeCategory::Table, StepOfficeCategory::OfficeCategoryId)
                            .to(OfficeCategory::Table, OfficeCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StepOfficeCategory::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StepAuthority::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StepWorkingHours::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StepTimeRequirement::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StepFee::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StepDocument::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceStep { Table, Id }

#[derive(DeriveIden)]
enum OfficeCategory { Table, Id }

#[derive(DeriveIden)]
enum StepDocument { Table, Id, StepId, Name, NameLocal, DocumentType, IsMandatory, Quantity, Notes, SortOrder }

#[derive(DeriveIden)]
enum StepFee { Table, Id, StepId, FeeType, Label, Amount, Currency, IsRefundable, Notes, SortOrder }

#[derive(DeriveIden)]
enum StepTimeRequirement { Table, Id, StepId, MinDuration, AvgDuration, MaxDuration, Remarks }

#[derive(DeriveIden)]
enum StepWorkingHours { Table, Id, StepId, Day, OpenTime, CloseTime, IsClosed }

#[derive(DeriveIden)]
enum StepAuthority { Table, Id, StepId, Role, Position, Department, Phone, Email, SortOrder }

#[derive(DeriveIden)]
enum StepOfficeCategory { Table, StepId, OfficeCategoryId }
