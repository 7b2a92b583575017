//! Create the four fixed location reference tables.
//! Rows are loaded by an external seeding job; ids are the reference data's own.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Province::Table)
                    .if_not_exists()
                    .col(integer(Province::Id).primary_key())
                    .col(string_len(Province::Name, 128))
                    .col(string_len_null(Province::NameLocal, 128))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(District::Table)
                    .if_not_exists()
                    .col(integer(District::Id).primary_key())
                    .col(integer(District::ProvinceId))
                    .col(string_len(District::Name, 128))
                    .col(string_len_null(District::NameLocal, 128))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_district_province")
                            .from(District::Table, District::ProvinceId)
                            .to(Province::Table, Province::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Municipality::Table)
                    .if_not_exists()
                    .col(integer(Municipality::Id).primary_key())
                    .col(integer(Municipality::DistrictId))
                    .col(string_len(Municipality::Name, 128))
                    .col(string_len_null(Municipality::NameLocal, 128))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_municipality_district")
                            .from(Municipality::Table, Municipality::DistrictId)
                            .to(District::Table, District::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ward::Table)
                    .if_not_exists()
                    .col(integer(Ward::Id).primary_key())
                    .col(integer(Ward::MunicipalityId))
                    .col(integer(Ward::Number))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ward_municipality")
                            .from(Ward::Table, Ward::MunicipalityId)
                            .to(Municipality::Table, Municipality::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ward::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Municipality::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(District::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Province::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Province { Table, Id, Name, NameLocal }

#[derive(DeriveIden)]
enum District { Table, Id, ProvinceId, Name, NameLocal }

#[derive(DeriveIden)]
enum Municipality { Table, Id, DistrictId, Name, NameLocal }

#[derive(DeriveIden)]
enum Ward { Table, Id, MunicipalityId, Number }
