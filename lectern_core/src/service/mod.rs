use serde::{Deserialize, Serialize};

use crate::entity::prelude::*;
use crate::ids::{ChapterId, CourseId, UserId};
use crate::policy::CourseAccess;

pub mod catalog;
pub mod comments;
pub mod progress;

/// What a comment thread hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Subject {
    Course(CourseId),
    Chapter(ChapterId),
}

/// Loads the policy facts for `course` as seen by `actor_id`.
pub(crate) async fn course_access<C: ConnectionTrait>(
    conn: &C,
    course: &CourseModel,
    actor_id: UserId,
) -> Result<CourseAccess, DbErr> {
    let enrolled = Enrollment::find_by_id((course.id, actor_id))
        .one(conn)
        .await?
        .is_some();

    Ok(CourseAccess {
        course_id: course.id,
        instructor_id: course.instructor_id,
        status: course.status,
        enrolled,
    })
}
