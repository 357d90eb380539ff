//! Create report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Report::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Report::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(Report::Reporter).json_binary().not_null().default("{}"))
                    .col(ColumnDef::new(Report::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Report::Urgency).string_len(16).not_null())
                    .col(ColumnDef::new(Report::Status).string_len(16).not_null().default("pending"))
                    .col(ColumnDef::new(Report::Description).text().not_null())
                    .col(ColumnDef::new(Report::Latitude).double().not_null())
                    .col(ColumnDef::new(Report::Longitude).double().not_null())
                    .col(ColumnDef::new(Report::Address).string_len(512))
                    .col(ColumnDef::new(Report::Media).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Report::Upvotes).integer().not_null().default(0))
                    .col(ColumnDef::new(Report::Downvotes).integer().not_null().default(0))
                    .col(ColumnDef::new(Report::InternalComments).json_binary().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Report::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index: (user_id, id) for per-reporter listing
        manager
            .create_index(
                Index::create()
                    .name("idx_report_user_id_id")
                    .table(Report::Table)
                    .col(Report::UserId)
                    .col(Report::Id)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (listing is always newest first)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_created_at")
                    .table(Report::Table)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: category for filtered listings
        manager
            .create_index(
                Index::create()
                    .name("idx_report_category")
                    .table(Report::Table)
                    .col(Report::Category)
                    .to_owned(),
            )
            .await?;

        // Index: urgency for filtered listings
        manager
            .create_index(
                Index::create()
                    .name("idx_report_urgency")
                    .table(Report::Table)
                    .col(Report::Urgency)
                    .to_owned(),
            )
            .await?;

        // Index: status for filtered listings
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status")
                    .table(Report::Table)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    UserId,
    Reporter,
    Category,
    Urgency,
    Status,
    Description,
    Latitude,
    Longitude,
    Address,
    Media,
    Upvotes,
    Downvotes,
    InternalComments,
    CreatedAt,
    UpdatedAt,
}
