use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_users_table::User;
use super::m20261019_000002_create_courses_table::Course;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseComment::Table)
                    .col(pk_uuid(CourseComment::Id))
                    .col(uuid(CourseComment::CourseId))
                    .col(uuid(CourseComment::UserId))
                    .col(uuid_null(CourseComment::ParentId)) // For threaded replies
                    .col(text(CourseComment::Content))
                    .col(timestamp_with_time_zone(CourseComment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-comment-course_id")
                            .from(CourseComment::Table, CourseComment::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-comment-user_id")
                            .from(CourseComment::Table, CourseComment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    // Deleting a comment removes its whole reply subtree
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-comment-parent_id")
                            .from(CourseComment::Table, CourseComment::ParentId)
                            .to(CourseComment::Table, CourseComment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_comments_course_id")
                    .table(CourseComment::Table)
                    .col(CourseComment::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_comments_parent_id")
                    .table(CourseComment::Table)
                    .col(CourseComment::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CourseComment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CourseComment {
    Table,
    Id,
    CourseId,
    UserId,
    ParentId,
    Content,
    CreatedAt,
}
