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
                    .table(ChapterComment::Table)
                    .col(pk_uuid(ChapterComment::Id))
                    .col(uuid(ChapterComment::ChapterId))
                    .col(uuid(ChapterComment::UserId))
                    .col(uuid_null(ChapterComment::ParentId)) // For threaded replies
                    .col(text(ChapterComment::Content))
                    .col(timestamp_with_time_zone(ChapterComment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-comment-chapter_id")
                            .from(ChapterComment::Table, ChapterComment::ChapterId)
                            .to(Chapter::Table, Chapter::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-comment-user_id")
                            .from(ChapterComment::Table, ChapterComment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    // Deleting a comment removes its whole reply subtree
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-comment-parent_id")
                            .from(ChapterComment::Table, ChapterComment::ParentId)
                            .to(ChapterComment::Table, ChapterComment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chapter_comments_chapter_id")
                    .table(ChapterComment::Table)
                    .col(ChapterComment::ChapterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chapter_comments_parent_id")
                    .table(ChapterComment::Table)
                    .col(ChapterComment::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChapterComment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ChapterComment {
    Table,
    Id,
    ChapterId,
    UserId,
    ParentId,
    Content,
    CreatedAt,
}
