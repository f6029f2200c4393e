use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_users_table::User;
use super::m20261019_000007_create_chapter_comments_table::ChapterComment;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChapterCommentLike::Table)
                    .col(uuid(ChapterCommentLike::CommentId))
                    .col(uuid(ChapterCommentLike::UserId))
                    .col(timestamp_with_time_zone(ChapterCommentLike::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(ChapterCommentLike::CommentId)
                            .col(ChapterCommentLike::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-comment-like-comment_id")
                            .from(ChapterCommentLike::Table, ChapterCommentLike::CommentId)
                            .to(ChapterComment::Table, ChapterComment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-comment-like-user_id")
                            .from(ChapterCommentLike::Table, ChapterCommentLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Viewer lookups filter by user first
        manager
            .create_index(
                Index::create()
                    .name("idx_chapter_comment_likes_user_id")
                    .table(ChapterCommentLike::Table)
                    .col(ChapterCommentLike::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChapterCommentLike::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ChapterCommentLike {
    Table,
    CommentId,
    UserId,
    CreatedAt,
}
