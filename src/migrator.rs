use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_canister_types_table::Migration),
            Box::new(m20240301_000002_create_canisters_table::Migration),
            Box::new(m20240301_000003_create_weighings_table::Migration),
        ]
    }
}

mod m20240301_000001_create_canister_types_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_canister_types_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CanisterTypes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CanisterTypes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CanisterTypes::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(CanisterTypes::FullWeight).integer().not_null())
                        .col(ColumnDef::new(CanisterTypes::EmptyWeight).integer().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CanisterTypes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum CanisterTypes {
        Table,
        Id,
        Name,
        FullWeight,
        EmptyWeight,
    }
}

mod m20240301_000002_create_canisters_table {

    use super::m20240301_000001_create_canister_types_table::CanisterTypes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_canisters_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Canisters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Canisters::Id)
                                .string_len(32)
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Canisters::Label).string_len(64).not_null())
                        .col(
                            ColumnDef::new(Canisters::CanisterTypeId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Canisters::Status)
                                .string_len(16)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Canisters::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_canisters_canister_type_id")
                                .from(Canisters::Table, Canisters::CanisterTypeId)
                                .to(CanisterTypes::Table, CanisterTypes::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_canisters_status")
                        .table(Canisters::Table)
                        .col(Canisters::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Canisters::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Canisters {
        Table,
        Id,
        Label,
        CanisterTypeId,
        Status,
        CreatedAt,
    }
}

mod m20240301_000003_create_weighings_table {

    use super::m20240301_000002_create_canisters_table::Canisters;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_weighings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Weighings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Weighings::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Weighings::CanisterId).string_len(32).not_null())
                        .col(ColumnDef::new(Weighings::Weight).integer().not_null())
                        .col(ColumnDef::new(Weighings::Comment).text().null())
                        .col(ColumnDef::new(Weighings::RecordedAt).date_time().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_weighings_canister_id")
                                .from(Weighings::Table, Weighings::CanisterId)
                                .to(Canisters::Table, Canisters::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_weighings_canister_recorded_at")
                        .table(Weighings::Table)
                        .col(Weighings::CanisterId)
                        .col(Weighings::RecordedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Weighings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Weighings {
        Table,
        Id,
        CanisterId,
        Weight,
        Comment,
        RecordedAt,
    }
}
