use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::{
    entity::prelude::*,
    error::{Classify, ErrorKind},
    ids::{CourseId, ProgressId, UserId},
    policy::{authorize, Action, Actor, Denied},
    requests::ProgressUpdate,
};

use super::course_access;

#[derive(Debug, Error)]
pub enum ProgressServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("course not found")]
    CourseNotFound,

    #[error("chapter not found")]
    ChapterNotFound,

    #[error("chapter does not belong to this course")]
    ChapterNotInCourse,

    #[error("enrollment not found")]
    EnrollmentNotFound,

    #[error("{0}")]
    Forbidden(#[from] Denied),

    #[error("invalid progress update")]
    Invalid(#[from] ValidationErrors),
}

impl Classify for ProgressServiceError {
    fn kind(&self) -> ErrorKind {
        match self {
            ProgressServiceError::DbError(_) => ErrorKind::Internal,
            ProgressServiceError::CourseNotFound
            | ProgressServiceError::ChapterNotFound
            | ProgressServiceError::EnrollmentNotFound => ErrorKind::NotFound,
            ProgressServiceError::ChapterNotInCourse | ProgressServiceError::Invalid(_) => {
                ErrorKind::Invalid
            }
            ProgressServiceError::Forbidden(_) => ErrorKind::Forbidden,
        }
    }

    fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ProgressServiceError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result of a progress upsert.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub progress: ChapterProgressModel,
    /// Course completion after the upsert, in percent.
    pub course_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course: CourseModel,
    pub progress_percent: f64,
    /// The student's rows, ordered by chapter position.
    pub progress: Vec<ChapterProgressModel>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recomputes the completion percentage of `student` in `course` and stores
/// it on the enrollment.
///
/// A course without chapters is 0% complete. Progress rows for chapters of
/// other courses never count.
pub async fn recompute<C: ConnectionTrait>(
    conn: &C,
    student: UserId,
    course: CourseId,
) -> Result<f64, ProgressServiceError> {
    store_completion(conn, student, course)
        .await?
        .ok_or(ProgressServiceError::EnrollmentNotFound)
}

/// Same as [`recompute`], but reports a missing enrollment as `None`.
pub(crate) async fn store_completion<C: ConnectionTrait>(
    conn: &C,
    student: UserId,
    course: CourseId,
) -> Result<Option<f64>, DbErr> {
    if Enrollment::find_by_id((course, student)).one(conn).await?.is_none() {
        return Ok(None);
    }

    let total = Chapter::find()
        .filter(ChapterColumn::CourseId.eq(course))
        .count(conn)
        .await?;

    let percent = if total == 0 {
        0.0
    } else {
        let completed = ChapterProgress::find()
            .inner_join(Chapter)
            .filter(ChapterColumn::CourseId.eq(course))
            .filter(ChapterProgressColumn::StudentId.eq(student))
            .filter(ChapterProgressColumn::IsCompleted.eq(true))
            .count(conn)
            .await?;

        round2(completed as f64 / total as f64 * 100.0)
    };

    Enrollment::update_many()
        .col_expr(EnrollmentColumn::ProgressPercent, Expr::value(percent))
        .filter(EnrollmentColumn::CourseId.eq(course))
        .filter(EnrollmentColumn::StudentId.eq(student))
        .exec(conn)
        .await?;

    tracing::debug!(%student, %course, percent, "recomputed course progress");
    Ok(Some(percent))
}

#[derive(Clone)]
pub struct ProgressService {
    db: DatabaseConnection,
}

impl ProgressService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts the actor's progress on one chapter and refreshes the course
    /// percentage in the same transaction.
    pub async fn update_progress(
        &self,
        actor: &Actor,
        update: ProgressUpdate,
    ) -> Result<ProgressReport, ProgressServiceError> {
        update.validate()?;

        let txn = self.db.begin().await?;

        let course = Course::find_by_id(update.course_id)
            .one(&txn)
            .await?
            .ok_or(ProgressServiceError::CourseNotFound)?;

        let chapter = Chapter::find_by_id(update.chapter_id)
            .one(&txn)
            .await?
            .ok_or(ProgressServiceError::ChapterNotFound)?;

        if chapter.course_id != course.id {
            return Err(ProgressServiceError::ChapterNotInCourse);
        }

        let access = course_access(&txn, &course, actor.id).await?;
        authorize(actor, Action::TrackProgress(&access))?;

        // Omitted fields keep their stored value on conflict
        let mut upsert = OnConflict::columns([
            ChapterProgressColumn::StudentId,
            ChapterProgressColumn::ChapterId,
        ]);
        upsert.update_column(ChapterProgressColumn::UpdatedAt);
        if update.is_completed.is_some() {
            upsert.update_column(ChapterProgressColumn::IsCompleted);
        }
        if update.last_position.is_some() {
            upsert.update_column(ChapterProgressColumn::LastPosition);
        }

        let row = ChapterProgressActiveModel {
            id: Set(ProgressId::new()),
            student_id: Set(actor.id),
            chapter_id: Set(chapter.id),
            is_completed: Set(update.is_completed.unwrap_or(false)),
            last_position: Set(update.last_position.unwrap_or(0)),
            updated_at: Set(Utc::now()),
        };
        let progress = ChapterProgress::insert(row)
            .on_conflict(upsert)
            .exec_with_returning(&txn)
            .await?;

        let course_progress = recompute(&txn, actor.id, course.id).await?;
        txn.commit().await?;

        tracing::info!(
            student = %actor.id,
            chapter = %chapter.id,
            completed = progress.is_completed,
            course_progress,
            "progress updated"
        );

        Ok(ProgressReport {
            progress,
            course_progress,
        })
    }

    /// The actor's stored percentage and per-chapter rows for one course.
    pub async fn course_progress(
        &self,
        actor: &Actor,
        course_id: CourseId,
    ) -> Result<CourseProgress, ProgressServiceError> {
        let course = Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or(ProgressServiceError::CourseNotFound)?;

        let access = course_access(&self.db, &course, actor.id).await?;
        authorize(actor, Action::TrackProgress(&access))?;

        let enrollment = Enrollment::find_by_id((course.id, actor.id))
            .one(&self.db)
            .await?
            .ok_or(ProgressServiceError::EnrollmentNotFound)?;

        let progress = ChapterProgress::find()
            .inner_join(Chapter)
            .filter(ChapterColumn::CourseId.eq(course.id))
            .filter(ChapterProgressColumn::StudentId.eq(actor.id))
            .order_by_asc(ChapterColumn::Position)
            .order_by_asc(ChapterColumn::Id)
            .all(&self.db)
            .await?;

        Ok(CourseProgress {
            course,
            progress_percent: enrollment.progress_percent,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use assert_matches::assert_matches;

    struct Fixture {
        db: DatabaseConnection,
        service: ProgressService,
        student: Actor,
        instructor: Actor,
        course: CourseModel,
    }

    async fn fixture() -> Fixture {
        let db = setup_db().await;
        let instructor = create_user(&db, "Ada", Role::Instructor).await;
        let student = create_user(&db, "Sam", Role::Student).await;
        let course = create_course(&db, &instructor, CourseStatus::Approved).await;
        enroll(&db, course.id, &student).await;

        Fixture {
            service: ProgressService::new(db.clone()),
            db,
            student,
            instructor,
            course,
        }
    }

    async fn chapters(f: &Fixture, count: i32) -> Vec<ChapterModel> {
        let mut chapters = Vec::new();
        for position in 1..=count {
            chapters.push(create_chapter(&f.db, f.course.id, position).await);
        }
        chapters
    }

    fn completed(course_id: CourseId, chapter: &ChapterModel) -> ProgressUpdate {
        ProgressUpdate {
            course_id,
            chapter_id: chapter.id,
            is_completed: Some(true),
            last_position: None,
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(100.0 / 3.0), 33.33);
        assert_eq!(round2(200.0 / 3.0), 66.67);
        assert_eq!(round2(40.0), 40.0);
    }

    #[tokio::test]
    async fn test_two_of_five_is_forty_percent() {
        let f = fixture().await;
        let chapters = chapters(&f, 5).await;
        mark_progress(&f.db, &f.student, chapters[0].id, true).await;
        mark_progress(&f.db, &f.student, chapters[3].id, true).await;
        mark_progress(&f.db, &f.student, chapters[4].id, false).await;

        let percent = recompute(&f.db, f.student.id, f.course.id).await.unwrap();

        assert_eq!(percent, 40.0);
        assert_eq!(stored_progress(&f.db, f.course.id, &f.student).await, 40.0);
    }

    #[tokio::test]
    async fn test_one_of_three_rounds_to_two_decimals() {
        let f = fixture().await;
        let chapters = chapters(&f, 3).await;
        mark_progress(&f.db, &f.student, chapters[1].id, true).await;

        let percent = recompute(&f.db, f.student.id, f.course.id).await.unwrap();
        assert_eq!(percent, 33.33);
    }

    #[tokio::test]
    async fn test_no_chapters_is_zero_despite_stray_rows() {
        let f = fixture().await;

        // Completed chapter of a different course
        let other = create_course(&f.db, &f.instructor, CourseStatus::Approved).await;
        let stray = create_chapter(&f.db, other.id, 1).await;
        mark_progress(&f.db, &f.student, stray.id, true).await;

        let percent = recompute(&f.db, f.student.id, f.course.id).await.unwrap();
        assert_eq!(percent, 0.0);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let f = fixture().await;
        let chapters = chapters(&f, 4).await;
        mark_progress(&f.db, &f.student, chapters[0].id, true).await;

        let first = recompute(&f.db, f.student.id, f.course.id).await.unwrap();
        let second = recompute(&f.db, f.student.id, f.course.id).await.unwrap();

        assert_eq!(first, 25.0);
        assert_eq!(first, second);
        assert_eq!(stored_progress(&f.db, f.course.id, &f.student).await, 25.0);
    }

    #[tokio::test]
    async fn test_recompute_without_enrollment_fails() {
        let f = fixture().await;
        let outsider = create_user(&f.db, "Olly", Role::Student).await;

        let result = recompute(&f.db, outsider.id, f.course.id).await;
        assert_matches!(result, Err(ProgressServiceError::EnrollmentNotFound));
    }

    #[tokio::test]
    async fn test_update_progress_recomputes() {
        let f = fixture().await;
        let chapters = chapters(&f, 2).await;

        let report = f
            .service
            .update_progress(&f.student, completed(f.course.id, &chapters[0]))
            .await
            .unwrap();

        assert!(report.progress.is_completed);
        assert_eq!(report.course_progress, 50.0);
        assert_eq!(stored_progress(&f.db, f.course.id, &f.student).await, 50.0);
    }

    #[tokio::test]
    async fn test_update_progress_upserts_single_row() {
        let f = fixture().await;
        let chapters = chapters(&f, 1).await;

        let first = f
            .service
            .update_progress(
                &f.student,
                ProgressUpdate {
                    course_id: f.course.id,
                    chapter_id: chapters[0].id,
                    is_completed: None,
                    last_position: Some(42),
                },
            )
            .await
            .unwrap();
        assert!(!first.progress.is_completed);
        assert_eq!(first.course_progress, 0.0);

        let second = f
            .service
            .update_progress(&f.student, completed(f.course.id, &chapters[0]))
            .await
            .unwrap();

        assert_eq!(second.progress.id, first.progress.id);
        // Omitted fields keep their stored value
        assert_eq!(second.progress.last_position, 42);
        assert_eq!(second.course_progress, 100.0);

        let rows = ChapterProgress::find().count(&f.db).await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_updates_share_one_row() {
        let f = fixture().await;
        let chapters = chapters(&f, 2).await;
        let position = ProgressUpdate {
            course_id: f.course.id,
            chapter_id: chapters[0].id,
            is_completed: None,
            last_position: Some(7),
        };

        let (first, second) = tokio::join!(
            f.service.update_progress(&f.student, position.clone()),
            f.service
                .update_progress(&f.student, completed(f.course.id, &chapters[0])),
        );
        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(first.progress.id, second.progress.id);
        assert_eq!(ChapterProgress::find().count(&f.db).await.unwrap(), 1);

        let stored = ChapterProgress::find_by_id(first.progress.id)
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_completed);
        assert_eq!(stored.last_position, 7);
        assert_eq!(stored_progress(&f.db, f.course.id, &f.student).await, 50.0);
    }

    #[tokio::test]
    async fn test_update_progress_checks_chapter_membership() {
        let f = fixture().await;
        let other = create_course(&f.db, &f.instructor, CourseStatus::Approved).await;
        let foreign = create_chapter(&f.db, other.id, 1).await;

        let result = f
            .service
            .update_progress(&f.student, completed(f.course.id, &foreign))
            .await;
        assert_matches!(result, Err(ProgressServiceError::ChapterNotInCourse));
    }

    #[tokio::test]
    async fn test_update_progress_requires_enrollment() {
        let f = fixture().await;
        let chapters = chapters(&f, 1).await;
        let outsider = create_user(&f.db, "Olly", Role::Student).await;

        let result = f
            .service
            .update_progress(&outsider, completed(f.course.id, &chapters[0]))
            .await;
        assert_matches!(result, Err(ProgressServiceError::Forbidden(_)));

        let result = f
            .service
            .update_progress(&f.instructor, completed(f.course.id, &chapters[0]))
            .await;
        assert_matches!(result, Err(ProgressServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_progress_rejects_negative_position() {
        let f = fixture().await;
        let chapters = chapters(&f, 1).await;

        let result = f
            .service
            .update_progress(
                &f.student,
                ProgressUpdate {
                    course_id: f.course.id,
                    chapter_id: chapters[0].id,
                    is_completed: None,
                    last_position: Some(-5),
                },
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.field_errors().is_some());
    }

    #[tokio::test]
    async fn test_course_progress_orders_by_position() {
        let f = fixture().await;
        let late = create_chapter(&f.db, f.course.id, 2).await;
        let early = create_chapter(&f.db, f.course.id, 1).await;

        for chapter in [&late, &early] {
            f.service
                .update_progress(&f.student, completed(f.course.id, chapter))
                .await
                .unwrap();
        }

        let overview = f
            .service
            .course_progress(&f.student, f.course.id)
            .await
            .unwrap();

        assert_eq!(overview.progress_percent, 100.0);
        let order: Vec<_> = overview.progress.iter().map(|p| p.chapter_id).collect();
        assert_eq!(order, vec![early.id, late.id]);
    }
}
