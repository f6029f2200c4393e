use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::{
    entity::prelude::*,
    error::{is_unique_violation, Classify, ErrorKind},
    ids::{ChapterId, CourseId, UserId},
    policy::{authorize, Action, Actor, Denied},
    requests::{CourseReview, NewChapter, NewCourse, NewUser},
};

use super::{course_access, progress};

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("user not found")]
    UserNotFound,

    #[error("course not found")]
    CourseNotFound,

    #[error("chapter not found")]
    ChapterNotFound,

    #[error("email already registered")]
    EmailTaken,

    #[error("{0}")]
    Forbidden(#[from] Denied),

    #[error("invalid request")]
    Invalid(#[from] ValidationErrors),
}

impl Classify for CatalogServiceError {
    fn kind(&self) -> ErrorKind {
        match self {
            CatalogServiceError::DbError(_) => ErrorKind::Internal,
            CatalogServiceError::UserNotFound
            | CatalogServiceError::CourseNotFound
            | CatalogServiceError::ChapterNotFound => ErrorKind::NotFound,
            CatalogServiceError::EmailTaken => ErrorKind::Conflict,
            CatalogServiceError::Forbidden(_) => ErrorKind::Forbidden,
            CatalogServiceError::Invalid(_) => ErrorKind::Invalid,
        }
    }

    fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            CatalogServiceError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// An enrollment plus whether this call created it.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollOutcome {
    pub enrollment: EnrollmentModel,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrolledCourse {
    pub course: CourseModel,
    pub progress_percent: f64,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a user. Students and instructors sign themselves up; only an
    /// admin can create another admin.
    pub async fn register(
        &self,
        actor: Option<&Actor>,
        new_user: NewUser,
    ) -> Result<UserModel, CatalogServiceError> {
        new_user.validate()?;

        if new_user.role == Role::Admin {
            let admin = actor.ok_or(Denied("administrator role required"))?;
            authorize(admin, Action::ManageUsers)?;
        }

        let user = UserActiveModel {
            id: Set(UserId::new()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            role: Set(new_user.role),
            created_at: Set(Utc::now()),
            deleted_at: Set(None),
        };

        let user = User::insert(user)
            .exec_with_returning(&self.db)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    CatalogServiceError::EmailTaken
                } else {
                    CatalogServiceError::DbError(error)
                }
            })?;

        tracing::info!(user = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Soft deletes a user. Their comments stay visible.
    pub async fn deactivate_user(
        &self,
        actor: &Actor,
        user_id: UserId,
    ) -> Result<UserModel, CatalogServiceError> {
        authorize(actor, Action::ManageUsers)?;

        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(CatalogServiceError::UserNotFound)?;

        if !user.is_active() {
            return Ok(user);
        }

        let mut user: UserActiveModel = user.into();
        user.deleted_at = Set(Some(Utc::now()));
        let user = user.update(&self.db).await?;

        tracing::info!(user = %user.id, by = %actor.id, "user deactivated");
        Ok(user)
    }

    /// Looks up a user that is allowed to act.
    pub async fn active_user(&self, user_id: UserId) -> Result<UserModel, CatalogServiceError> {
        User::find_by_id(user_id)
            .filter(UserColumn::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(CatalogServiceError::UserNotFound)
    }

    /// New courses wait for an admin review.
    pub async fn create_course(
        &self,
        actor: &Actor,
        new_course: NewCourse,
    ) -> Result<CourseModel, CatalogServiceError> {
        authorize(actor, Action::CreateCourse)?;
        new_course.validate()?;

        let course = CourseActiveModel {
            id: Set(CourseId::new()),
            instructor_id: Set(actor.id),
            title: Set(new_course.title),
            description: Set(new_course.description),
            status: Set(CourseStatus::Pending),
            created_at: Set(Utc::now()),
        };
        let course = Course::insert(course).exec_with_returning(&self.db).await?;

        tracing::info!(course = %course.id, instructor = %actor.id, "course created");
        Ok(course)
    }

    pub async fn review_course(
        &self,
        actor: &Actor,
        course_id: CourseId,
        review: CourseReview,
    ) -> Result<CourseModel, CatalogServiceError> {
        authorize(actor, Action::ReviewCourse)?;
        review.validate()?;

        let course = self.get_course(course_id).await?;
        let mut course: CourseActiveModel = course.into();
        course.status = Set(review.status);
        let course = course.update(&self.db).await?;

        tracing::info!(course = %course.id, status = ?course.status, "course reviewed");
        Ok(course)
    }

    pub async fn get_course(&self, course_id: CourseId) -> Result<CourseModel, CatalogServiceError> {
        Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or(CatalogServiceError::CourseNotFound)
    }

    /// Approved courses, oldest first.
    pub async fn list_courses(&self) -> Result<Vec<CourseModel>, CatalogServiceError> {
        let courses = Course::find()
            .filter(CourseColumn::Status.eq(CourseStatus::Approved))
            .order_by_asc(CourseColumn::Id)
            .all(&self.db)
            .await?;

        Ok(courses)
    }

    /// Chapters, enrollments and comments go with the course.
    pub async fn delete_course(
        &self,
        actor: &Actor,
        course_id: CourseId,
    ) -> Result<(), CatalogServiceError> {
        let course = self.get_course(course_id).await?;
        let access = course_access(&self.db, &course, actor.id).await?;
        authorize(actor, Action::ManageCourse(&access))?;

        Course::delete_by_id(course.id).exec(&self.db).await?;

        tracing::info!(course = %course_id, by = %actor.id, "course deleted");
        Ok(())
    }

    /// Appends a chapter unless the request pins a position.
    pub async fn add_chapter(
        &self,
        actor: &Actor,
        course_id: CourseId,
        new_chapter: NewChapter,
    ) -> Result<ChapterModel, CatalogServiceError> {
        new_chapter.validate()?;

        let txn = self.db.begin().await?;

        let course = Course::find_by_id(course_id)
            .one(&txn)
            .await?
            .ok_or(CatalogServiceError::CourseNotFound)?;
        let access = course_access(&txn, &course, actor.id).await?;
        authorize(actor, Action::ManageCourse(&access))?;

        let position = match new_chapter.position {
            Some(position) => position,
            None => {
                let last = Chapter::find()
                    .filter(ChapterColumn::CourseId.eq(course.id))
                    .order_by_desc(ChapterColumn::Position)
                    .one(&txn)
                    .await?;
                last.map_or(1, |chapter| chapter.position + 1)
            }
        };

        let chapter = ChapterActiveModel {
            id: Set(ChapterId::new()),
            course_id: Set(course.id),
            title: Set(new_chapter.title),
            position: Set(position),
            video_url: Set(new_chapter.video_url),
            resource_url: Set(new_chapter.resource_url),
            created_at: Set(Utc::now()),
        };
        let chapter = Chapter::insert(chapter).exec_with_returning(&txn).await?;

        txn.commit().await?;

        tracing::info!(chapter = %chapter.id, course = %course_id, position, "chapter added");
        Ok(chapter)
    }

    pub async fn list_chapters(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<ChapterModel>, CatalogServiceError> {
        let course = self.get_course(course_id).await?;

        let chapters = course
            .find_related(Chapter)
            .order_by_asc(ChapterColumn::Position)
            .order_by_asc(ChapterColumn::Id)
            .all(&self.db)
            .await?;

        Ok(chapters)
    }

    /// Existing enrollments keep their stored percentage until the student's
    /// next progress update.
    pub async fn delete_chapter(
        &self,
        actor: &Actor,
        chapter_id: ChapterId,
    ) -> Result<(), CatalogServiceError> {
        let (chapter, course) = Chapter::find_by_id(chapter_id)
            .find_also_related(Course)
            .one(&self.db)
            .await?
            .ok_or(CatalogServiceError::ChapterNotFound)?;
        let course = course.ok_or(CatalogServiceError::CourseNotFound)?;

        let access = course_access(&self.db, &course, actor.id).await?;
        authorize(actor, Action::ManageCourse(&access))?;

        Chapter::delete_by_id(chapter.id).exec(&self.db).await?;

        tracing::info!(chapter = %chapter_id, by = %actor.id, "chapter deleted");
        Ok(())
    }

    /// Enrolls the actor. Enrolling twice returns the existing row with
    /// `created == false`.
    pub async fn enroll(
        &self,
        actor: &Actor,
        course_id: CourseId,
    ) -> Result<EnrollOutcome, CatalogServiceError> {
        let txn = self.db.begin().await?;

        let course = Course::find_by_id(course_id)
            .one(&txn)
            .await?
            .ok_or(CatalogServiceError::CourseNotFound)?;

        if let Some(enrollment) = Enrollment::find_by_id((course.id, actor.id)).one(&txn).await? {
            txn.commit().await?;
            tracing::debug!(course = %course_id, student = %actor.id, "already enrolled");
            return Ok(EnrollOutcome {
                enrollment,
                created: false,
            });
        }

        let access = course_access(&txn, &course, actor.id).await?;
        authorize(actor, Action::Enroll(&access))?;

        let enrollment = EnrollmentActiveModel {
            course_id: Set(course.id),
            student_id: Set(actor.id),
            progress_percent: Set(0.0),
            enrolled_at: Set(Utc::now()),
        };
        let created = match Enrollment::insert(enrollment).exec_without_returning(&txn).await {
            Ok(_) => true,
            Err(error) if is_unique_violation(&error) => {
                tracing::warn!(course = %course_id, student = %actor.id, "concurrent enrollment");
                false
            }
            Err(error) => return Err(error.into()),
        };

        // Picks up progress rows left from an earlier enrollment
        progress::store_completion(&txn, actor.id, course.id).await?;

        let enrollment = Enrollment::find_by_id((course.id, actor.id))
            .one(&txn)
            .await?
            .ok_or(CatalogServiceError::CourseNotFound)?;

        txn.commit().await?;

        if created {
            tracing::info!(course = %course_id, student = %actor.id, "student enrolled");
        }
        Ok(EnrollOutcome {
            enrollment,
            created,
        })
    }

    /// The actor's enrollments, most recent first.
    pub async fn list_enrollments(
        &self,
        actor: &Actor,
    ) -> Result<Vec<EnrolledCourse>, CatalogServiceError> {
        let rows = Enrollment::find()
            .filter(EnrollmentColumn::StudentId.eq(actor.id))
            .find_also_related(Course)
            .order_by_desc(EnrollmentColumn::EnrolledAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, course)| {
                Some(EnrolledCourse {
                    course: course?,
                    progress_percent: enrollment.progress_percent,
                    enrolled_at: enrollment.enrolled_at,
                })
            })
            .collect())
    }
}
