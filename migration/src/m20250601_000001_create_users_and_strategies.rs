use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users first, strategies reference them
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::IsSuperuser).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Strategies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Strategies::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Strategies::UserId).integer().not_null())
                    .col(ColumnDef::new(Strategies::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Strategies::Description).text().null())
                    .col(ColumnDef::new(Strategies::Indicator).string_len(100).not_null())
                    .col(ColumnDef::new(Strategies::Operator).string_len(100).not_null())
                    .col(ColumnDef::new(Strategies::Value).double().not_null())
                    .col(ColumnDef::new(Strategies::StopLoss).double().not_null())
                    .col(ColumnDef::new(Strategies::Target).double().not_null())
                    .col(ColumnDef::new(Strategies::Capital).double().not_null())
                    .col(ColumnDef::new(Strategies::GeneratedCode).text().not_null())
                    .col(ColumnDef::new(Strategies::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Strategies::UpdatedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_strategies_user_id")
                            .from(Strategies::Table, Strategies::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_strategies_user_id")
                    .table(Strategies::Table)
                    .col(Strategies::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(Strategies::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    IsActive,
    IsSuperuser,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Strategies {
    Table,
    Id,
    UserId,
    Name,
    Description,
    Indicator,
    Operator,
    Value,
    StopLoss,
    Target,
    Capital,
    GeneratedCode,
    CreatedAt,
    UpdatedAt,
}
