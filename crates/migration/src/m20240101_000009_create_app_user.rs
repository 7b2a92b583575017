//! Create `app_user` and `user_credentials` tables.
//! An office has at most one admin: `office_id` is unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppUser::Table)
                    .if_not_exists()
                    .col(uuid(AppUser::Id).primary_key())
                    .col(string_len(AppUser::Email, 255).unique_key())
                    .col(string_len(AppUser::Name, 255))
                    .col(string_len(AppUser::Role, 16))
                    .col(uuid_null(AppUser::OfficeId).unique_key())
                    .col(boolean(AppUser::IsActive))
                    .col(timestamp_with_time_zone(AppUser::CreatedAt))
                    .col(timestamp_with_time_zone(AppUser::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_user_office")
                            .from(AppUser::Table, AppUser::OfficeId)
                            .to(Office::Table, Office::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserCredentials::Table)
                    .if_not_exists()
                    .col(uuid(UserCredentials::Id).primary_key())
                    .col(uuid(UserCredentials::UserId).unique_key())
                    .col(string_len(UserCredentials::PasswordHash, 255))
                    .col(string_len(UserCredentials::PasswordAlgorithm, 32))
                    .col(timestamp_with_time_zone(UserCredentials::CreatedAt))
                    .col(timestamp_with_time_zone(UserCredentials::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_credentials_user")
                            .from(UserCredentials::Table, UserCredentials::UserId)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserCredentials::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AppUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AppUser { Table, Id, Email, Name, Role, OfficeId, IsActive, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum UserCredentials { Table, Id, UserId, PasswordHash, PasswordAlgorithm, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Office { Table, Id }
