//! Fixtures shared by the unit tests and the `lectern_api` integration tests.
//!
//! Helpers panic on failure; they are only meant for test code.

use chrono::Utc;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

use crate::entity::prelude::*;
use crate::ids::{ChapterId, CourseId, ProgressId, UserId};
use crate::models::migrator::Migrator;
use crate::policy::Actor;

/// Opens a fresh, empty in-memory SQLite database.
///
/// The pool is pinned to a single connection: every new SQLite connection to
/// `sqlite::memory:` would otherwise see its own empty database.
pub async fn connect_memory() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    Database::connect(options)
        .await
        .expect("Failed to create in-memory database")
}

/// In-memory database with every migration applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = connect_memory().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, name: &str, role: Role) -> Actor {
    let id = UserId::new();
    let user = UserActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        email: Set(format!("{}.{}@example.com", name.to_lowercase(), id)),
        role: Set(role),
        created_at: Set(Utc::now()),
        deleted_at: Set(None),
    };
    let user = User::insert(user).exec_with_returning(db).await.unwrap();
    Actor::from(&user)
}

pub async fn create_course(
    db: &DatabaseConnection,
    instructor: &Actor,
    status: CourseStatus,
) -> CourseModel {
    let course = CourseActiveModel {
        id: Set(CourseId::new()),
        instructor_id: Set(instructor.id),
        title: Set("Rust for Beginners".to_string()),
        description: Set(String::new()),
        status: Set(status),
        created_at: Set(Utc::now()),
    };
    Course::insert(course).exec_with_returning(db).await.unwrap()
}

pub async fn create_chapter(db: &DatabaseConnection, course_id: CourseId, position: i32) -> ChapterModel {
    let chapter = ChapterActiveModel {
        id: Set(ChapterId::new()),
        course_id: Set(course_id),
        title: Set(format!("Chapter {position}")),
        position: Set(position),
        video_url: Set(None),
        resource_url: Set(None),
        created_at: Set(Utc::now()),
    };
    Chapter::insert(chapter).exec_with_returning(db).await.unwrap()
}

pub async fn enroll(db: &DatabaseConnection, course_id: CourseId, student: &Actor) {
    let enrollment = EnrollmentActiveModel {
        course_id: Set(course_id),
        student_id: Set(student.id),
        progress_percent: Set(0.0),
        enrolled_at: Set(Utc::now()),
    };
    Enrollment::insert(enrollment)
        .exec_without_returning(db)
        .await
        .unwrap();
}

/// Writes a progress row directly, bypassing recomputation.
pub async fn mark_progress(
    db: &DatabaseConnection,
    student: &Actor,
    chapter_id: ChapterId,
    is_completed: bool,
) {
    let progress = ChapterProgressActiveModel {
        id: Set(ProgressId::new()),
        student_id: Set(student.id),
        chapter_id: Set(chapter_id),
        is_completed: Set(is_completed),
        last_position: Set(0),
        updated_at: Set(Utc::now()),
    };
    ChapterProgress::insert(progress)
        .exec_without_returning(db)
        .await
        .unwrap();
}

pub async fn stored_progress(db: &DatabaseConnection, course_id: CourseId, student: &Actor) -> f64 {
    Enrollment::find_by_id((course_id, student.id))
        .one(db)
        .await
        .unwrap()
        .expect("enrollment exists")
        .progress_percent
}
