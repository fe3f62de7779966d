use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Policies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Policies::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Policies::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Policies::Path).string_len(255).not_null())
                    .col(ColumnDef::new(Policies::Method).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Policies::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Policies::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Policies::UpdatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Policies::DeletedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_policies_name_path_method")
                    .table(Policies::Table)
                    .col(Policies::Name)
                    .col(Policies::Path)
                    .col(Policies::Method)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Policies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Policies {
    Table,
    Id,
    Name,
    Path,
    Method,
    Description,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
