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
                    .col(
                        ColumnDef::new(Report::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Report::Title).string_len(256))
                    .col(ColumnDef::new(Report::SourceType).string_len(16))
                    .col(ColumnDef::new(Report::SourceUrl).string_len(2048))
                    .col(ColumnDef::new(Report::ImageUrl).string_len(2048))
                    .col(ColumnDef::new(Report::Headline).text())
                    .col(ColumnDef::new(Report::Link).string_len(2048))
                    .col(ColumnDef::new(Report::AnalysisText).text())
                    .col(ColumnDef::new(Report::Reliability).double())
                    .col(ColumnDef::new(Report::Tags).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Report::Reasons).json_binary().not_null().default("[]"))
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(32)
                            .not_null()
                            .default("published"),
                    )
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (status, created_at) for the trending feed
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status_created_at")
                    .table(Report::Table)
                    .col(Report::Status)
                    .col(Report::CreatedAt)
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
    Title,
    SourceType,
    SourceUrl,
    ImageUrl,
    Headline,
    Link,
    AnalysisText,
    Reliability,
    Tags,
    Reasons,
    Status,
    CreatedAt,
}
