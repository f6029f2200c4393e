use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_users_table::User;
use super::m20261019_000006_create_course_comments_table::CourseComment;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseCommentLike::Table)
                    .col(uuid(CourseCommentLike::CommentId))
                    .col(uuid(CourseCommentLike::UserId))
                    .col(timestamp_with_time_zone(CourseCommentLike::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(CourseCommentLike::CommentId)
                            .col(CourseCommentLike::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-comment-like-comment_id")
                            .from(CourseCommentLike::Table, CourseCommentLike::CommentId)
                            .to(CourseComment::Table, CourseComment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-comment-like-user_id")
                            .from(CourseCommentLike::Table, CourseCommentLike::UserId)
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
                    .name("idx_course_comment_likes_user_id")
                    .table(CourseCommentLike::Table)
                    .col(CourseCommentLike::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CourseCommentLike::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CourseCommentLike {
    Table,
    CommentId,
    UserId,
    CreatedAt,
}
