//! Create report vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportVote::ReportId).string_len(32).not_null())
                    .col(ColumnDef::new(ReportVote::VoterId).string_len(128).not_null())
                    .col(ColumnDef::new(ReportVote::Vote).small_integer().not_null())
                    .col(
                        ColumnDef::new(ReportVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ReportVote::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (report_id, voter_id) - one vote per voter per report.
        // Also the conflict target of the vote upsert.
        manager
            .create_index(
                Index::create()
                    .name("idx_report_vote_report_voter")
                    .table(ReportVote::Table)
                    .col(ReportVote::ReportId)
                    .col(ReportVote::VoterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReportVote {
    Table,
    Id,
    ReportId,
    VoterId,
    Vote,
    CreatedAt,
    UpdatedAt,
}
