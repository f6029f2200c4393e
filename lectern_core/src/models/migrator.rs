use sea_orm_migration::prelude::*;

mod m20261019_000001_create_users_table;
mod m20261019_000002_create_courses_table;
mod m20261019_000003_create_chapters_table;
mod m20261019_000004_create_enrollments_table;
mod m20261019_000005_create_chapter_progress_table;
mod m20261019_000006_create_course_comments_table;
mod m20261019_000007_create_chapter_comments_table;
mod m20261019_000008_create_course_comment_likes_table;
mod m20261019_000009_create_chapter_comment_likes_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_users_table::Migration),
            Box::new(m20261019_000002_create_courses_table::Migration),
            Box::new(m20261019_000003_create_chapters_table::Migration),
            Box::new(m20261019_000004_create_enrollments_table::Migration),
            Box::new(m20261019_000005_create_chapter_progress_table::Migration),
            Box::new(m20261019_000006_create_course_comments_table::Migration),
            Box::new(m20261019_000007_create_chapter_comments_table::Migration),
            Box::new(m20261019_000008_create_course_comment_likes_table::Migration),
            Box::new(m20261019_000009_create_chapter_comment_likes_table::Migration),
        ]
    }
}
