use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncRecords::Code)
                            .string_len(9)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncRecords::Data).text().not_null())
                    .col(
                        ColumnDef::new(SyncRecords::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(SyncRecords::LastSync).big_integer().not_null())
                    .col(ColumnDef::new(SyncRecords::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SyncRecords {
    Table,
    Code,
    Data,
    Version,
    LastSync,
    CreatedAt,
}
