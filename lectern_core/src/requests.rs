//! Typed request payloads accepted by the services.
//!
//! Each struct carries its validation rules; services call `validate()` before
//! touching the store.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entity::course::CourseStatus;
use crate::entity::user::Role;
use crate::ids::{ChapterId, CourseId};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

fn review_outcome(status: &CourseStatus) -> Result<(), ValidationError> {
    match status {
        CourseStatus::Approved | CourseStatus::Rejected => Ok(()),
        CourseStatus::Pending => Err(ValidationError::new("review_outcome")
            .with_message("must be approved or rejected".into())),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 120), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewCourse {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CourseReview {
    #[validate(custom(function = "review_outcome"))]
    pub status: CourseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewChapter {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    /// Appended after the last chapter when omitted.
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    #[validate(url)]
    pub video_url: Option<String>,
    #[validate(url)]
    pub resource_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, max = 5000), custom(function = "not_blank"))]
    pub content: String,
}

/// Upsert of one chapter's progress. Omitted fields keep their stored value
/// (or the column default for a new row).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProgressUpdate {
    pub course_id: CourseId,
    pub chapter_id: ChapterId,
    pub is_completed: Option<bool>,
    #[validate(range(min = 0))]
    pub last_position: Option<i32>,
}
