use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000002_create_courses_table::Course;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chapter::Table)
                    .col(pk_uuid(Chapter::Id))
                    .col(uuid(Chapter::CourseId))
                    .col(string(Chapter::Title))
                    .col(integer(Chapter::Position))
                    .col(string_null(Chapter::VideoUrl))
                    .col(string_null(Chapter::ResourceUrl))
                    .col(timestamp_with_time_zone(Chapter::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chapter-course_id")
                            .from(Chapter::Table, Chapter::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Chapters are always read per course, in position order
        manager
            .create_index(
                Index::create()
                    .name("idx_chapters_course_position")
                    .table(Chapter::Table)
                    .col(Chapter::CourseId)
                    .col(Chapter::Position)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chapter::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Chapter {
    Table,
    Id,
    CourseId,
    Title,
    Position,
    VideoUrl,
    ResourceUrl,
    CreatedAt,
}
