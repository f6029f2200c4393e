//! Role and ownership rules.
//!
//! Every permission decision in the crate goes through [`authorize`]. Callers
//! load the facts an action depends on (owner, enrollment, author) and pass
//! them in the [`Action`]; the function itself never touches the store.

use serde::Serialize;
use thiserror::Error;

use crate::entity::course::CourseStatus;
use crate::entity::user::{self, Role};
use crate::ids::{CourseId, UserId};

/// The authenticated user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl Actor {
    /// Display label used on comments, e.g. `"Ada (instructor)"`.
    pub fn label(&self) -> String {
        author_label(&self.name, self.role)
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}

pub fn author_label(name: &str, role: Role) -> String {
    format!("{name} ({role})")
}

/// Facts about a course relative to the acting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseAccess {
    pub course_id: CourseId,
    pub instructor_id: UserId,
    pub status: CourseStatus,
    /// Whether the actor has an enrollment row for this course.
    pub enrolled: bool,
}

impl CourseAccess {
    fn owned_by(&self, actor: &Actor) -> bool {
        self.instructor_id == actor.id
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Post a comment or a reply on a course or one of its chapters.
    Comment(&'a CourseAccess),
    DeleteComment { author_id: UserId },
    LikeComment,
    /// Update or read one's own chapter progress.
    TrackProgress(&'a CourseAccess),
    CreateCourse,
    /// Add or remove chapters, delete the course.
    ManageCourse(&'a CourseAccess),
    ReviewCourse,
    Enroll(&'a CourseAccess),
    ManageUsers,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Denied(pub &'static str);

pub fn authorize(actor: &Actor, action: Action<'_>) -> Result<(), Denied> {
    use Role::*;

    match (action, actor.role) {
        (Action::Comment(_), Admin) => Err(Denied("administrators cannot post comments")),
        (Action::Comment(course), Student) if !course.enrolled => {
            Err(Denied("you must be enrolled in this course to comment"))
        }
        (Action::Comment(course), Instructor) if !course.owned_by(actor) => {
            Err(Denied("instructors may only comment on their own courses"))
        }
        (Action::Comment(_), _) => Ok(()),

        (Action::DeleteComment { .. }, Admin) => Ok(()),
        (Action::DeleteComment { author_id }, _) if author_id == actor.id => Ok(()),
        (Action::DeleteComment { .. }, _) => Err(Denied("only the author may delete this comment")),

        (Action::LikeComment, _) => Ok(()),

        (Action::TrackProgress(course), Student) if course.enrolled => Ok(()),
        (Action::TrackProgress(_), Student) => Err(Denied("you are not enrolled in this course")),
        (Action::TrackProgress(_), _) => Err(Denied("only students track progress")),

        (Action::CreateCourse, Instructor) => Ok(()),
        (Action::CreateCourse, _) => Err(Denied("only instructors may create courses")),

        (Action::ManageCourse(_), Admin) => Ok(()),
        (Action::ManageCourse(course), Instructor) if course.owned_by(actor) => Ok(()),
        (Action::ManageCourse(_), _) => Err(Denied("only the course instructor may change it")),

        (Action::ReviewCourse, Admin) | (Action::ManageUsers, Admin) => Ok(()),
        (Action::ReviewCourse, _) | (Action::ManageUsers, _) => {
            Err(Denied("administrator role required"))
        }

        (Action::Enroll(course), Student) if course.status == CourseStatus::Approved => Ok(()),
        (Action::Enroll(_), Student) => Err(Denied("this course is not open for enrollment")),
        (Action::Enroll(_), _) => Err(Denied("only students may enroll")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: UserId::new(),
            name: "Test".to_string(),
            role,
        }
    }

    fn course(instructor_id: UserId, enrolled: bool) -> CourseAccess {
        CourseAccess {
            course_id: CourseId::new(),
            instructor_id,
            status: CourseStatus::Approved,
            enrolled,
        }
    }

    #[test]
    fn test_student_comment_requires_enrollment() {
        let student = actor(Role::Student);
        let owner = UserId::new();

        assert!(authorize(&student, Action::Comment(&course(owner, false))).is_err());
        assert!(authorize(&student, Action::Comment(&course(owner, true))).is_ok());
    }

    #[test]
    fn test_instructor_comments_only_on_own_course() {
        let instructor = actor(Role::Instructor);

        assert!(authorize(&instructor, Action::Comment(&course(instructor.id, false))).is_ok());
        assert!(authorize(&instructor, Action::Comment(&course(UserId::new(), false))).is_err());
    }

    #[test]
    fn test_admin_never_comments() {
        let admin = actor(Role::Admin);

        assert_eq!(
            authorize(&admin, Action::Comment(&course(admin.id, true))),
            Err(Denied("administrators cannot post comments"))
        );
    }

    #[test]
    fn test_comment_deletion_by_author_or_admin() {
        let author = actor(Role::Student);
        let other = actor(Role::Student);
        let admin = actor(Role::Admin);
        let action = Action::DeleteComment { author_id: author.id };

        assert!(authorize(&author, action).is_ok());
        assert!(authorize(&admin, action).is_ok());
        assert!(authorize(&other, action).is_err());
    }

    #[test]
    fn test_anyone_can_like() {
        for role in [Role::Student, Role::Instructor, Role::Admin] {
            assert!(authorize(&actor(role), Action::LikeComment).is_ok());
        }
    }

    #[test]
    fn test_progress_is_for_enrolled_students() {
        let student = actor(Role::Student);
        let instructor = actor(Role::Instructor);
        let owned = course(instructor.id, true);

        assert!(authorize(&student, Action::TrackProgress(&owned)).is_ok());
        assert!(authorize(&student, Action::TrackProgress(&course(instructor.id, false))).is_err());
        assert!(authorize(&instructor, Action::TrackProgress(&owned)).is_err());
    }

    #[test]
    fn test_course_management() {
        let instructor = actor(Role::Instructor);
        let stranger = actor(Role::Instructor);
        let admin = actor(Role::Admin);
        let owned = course(instructor.id, false);

        assert!(authorize(&instructor, Action::CreateCourse).is_ok());
        assert!(authorize(&admin, Action::CreateCourse).is_err());
        assert!(authorize(&instructor, Action::ManageCourse(&owned)).is_ok());
        assert!(authorize(&admin, Action::ManageCourse(&owned)).is_ok());
        assert!(authorize(&stranger, Action::ManageCourse(&owned)).is_err());
        assert!(authorize(&instructor, Action::ReviewCourse).is_err());
        assert!(authorize(&admin, Action::ReviewCourse).is_ok());
    }

    #[test]
    fn test_enrollment_needs_approved_course() {
        let student = actor(Role::Student);
        let mut pending = course(UserId::new(), false);
        pending.status = CourseStatus::Pending;

        assert!(authorize(&student, Action::Enroll(&pending)).is_err());
        assert!(authorize(&student, Action::Enroll(&course(UserId::new(), false))).is_ok());
        assert!(authorize(&actor(Role::Instructor), Action::Enroll(&course(UserId::new(), false))).is_err());
    }

    #[test]
    fn test_label() {
        let mut ada = actor(Role::Instructor);
        ada.name = "Ada".to_string();
        assert_eq!(ada.label(), "Ada (instructor)");
    }
}
