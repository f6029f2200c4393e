use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_users_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .col(pk_uuid(Course::Id))
                    .col(uuid(Course::InstructorId))
                    .col(string(Course::Title))
                    .col(text(Course::Description))
                    .col(string(Course::Status))
                    .col(timestamp_with_time_zone(Course::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-instructor_id")
                            .from(Course::Table, Course::InstructorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_instructor_id")
                    .table(Course::Table)
                    .col(Course::InstructorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Course {
    Table,
    Id,
    InstructorId,
    Title,
    Description,
    Status,
    CreatedAt,
}
