use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_users_table::User;
use super::m20261019_000003_create_chapters_table::Chapter;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChapterProgress::Table)
                    .col(pk_uuid(ChapterProgress::Id))
                    .col(uuid(ChapterProgress::StudentId))
                    .col(uuid(ChapterProgress::ChapterId))
                    .col(boolean(ChapterProgress::IsCompleted).default(false))
                    .col(integer(ChapterProgress::LastPosition).default(0))
                    .col(timestamp_with_time_zone(ChapterProgress::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-progress-student_id")
                            .from(ChapterProgress::Table, ChapterProgress::StudentId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-progress-chapter_id")
                            .from(ChapterProgress::Table, ChapterProgress::ChapterId)
                            .to(Chapter::Table, Chapter::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One progress row per (student, chapter)
        manager
            .create_index(
                Index::create()
                    .name("idx_chapter_progress_student_chapter_unique")
                    .table(ChapterProgress::Table)
                    .col(ChapterProgress::StudentId)
                    .col(ChapterProgress::ChapterId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChapterProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ChapterProgress {
    Table,
    Id,
    StudentId,
    ChapterId,
    IsCompleted,
    LastPosition,
    UpdatedAt,
}
