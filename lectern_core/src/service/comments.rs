//! Course and chapter discussion threads.
//!
//! Both comment flavors share one service. Each flavor keeps its own tables,
//! so the store access is generated per flavor by [`comment_store!`] and the
//! service dispatches on [`Subject`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::{
    entity::prelude::*,
    error::{is_unique_violation, Classify, ErrorKind},
    ids::{CommentId, UserId},
    policy::{author_label, authorize, Action, Actor, Denied},
    requests::NewComment,
    threads::{self, CommentNode, CommentRow},
};

use super::{course_access, Subject};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("course not found")]
    CourseNotFound,

    #[error("chapter not found")]
    ChapterNotFound,

    #[error("comment not found")]
    CommentNotFound,

    #[error("{0}")]
    Forbidden(#[from] Denied),

    #[error("invalid comment")]
    Invalid(#[from] ValidationErrors),
}

impl Classify for CommentsServiceError {
    fn kind(&self) -> ErrorKind {
        match self {
            CommentsServiceError::DbError(_) => ErrorKind::Internal,
            CommentsServiceError::CourseNotFound
            | CommentsServiceError::ChapterNotFound
            | CommentsServiceError::CommentNotFound => ErrorKind::NotFound,
            CommentsServiceError::Forbidden(_) => ErrorKind::Forbidden,
            CommentsServiceError::Invalid(_) => ErrorKind::Invalid,
        }
    }

    fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            CommentsServiceError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A freshly written comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: CommentId,
    pub content: String,
    pub author: String,
    pub author_id: UserId,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub liked: bool,
}

/// A comment located by id in either flavor's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StoredComment {
    id: CommentId,
    subject: Subject,
    author_id: UserId,
}

/// Where a new comment goes.
#[derive(Debug, Clone, Copy)]
enum Target {
    Subject(Subject),
    Reply(CommentId),
}

macro_rules! comment_store {
    (
        $module:ident,
        $comment:ident,
        $like:ident,
        $variant:ident($subject_ty:ty),
        $subject_field:ident,
        $subject_col:ident
    ) => {
        mod $module {
            use super::*;
            use crate::entity::{$comment as comment, $like as like, user};

            pub(super) async fn thread<C: ConnectionTrait>(
                conn: &C,
                subject: $subject_ty,
                viewer: Option<UserId>,
            ) -> Result<Vec<CommentNode>, DbErr> {
                let rows = rows(conn, subject).await?;
                let ids: Vec<CommentId> = rows.iter().map(|row| row.id).collect();

                let like_counts = like_counts(conn, &ids).await?;
                let liked = match viewer {
                    Some(viewer) => liked_by(conn, &ids, viewer).await?,
                    None => HashSet::new(),
                };

                Ok(threads::assemble(rows, &like_counts, &liked))
            }

            async fn rows<C: ConnectionTrait>(
                conn: &C,
                subject: $subject_ty,
            ) -> Result<Vec<CommentRow>, DbErr> {
                let rows = comment::Entity::find()
                    .filter(comment::Column::$subject_col.eq(subject))
                    .find_also_related(user::Entity)
                    .order_by_asc(comment::Column::Id)
                    .all(conn)
                    .await?;

                Ok(rows
                    .into_iter()
                    .filter_map(|(comment, author)| {
                        let author = author?;
                        Some(CommentRow {
                            id: comment.id,
                            parent_id: comment.parent_id,
                            author_id: author.id,
                            author: author_label(&author.name, author.role),
                            content: comment.content,
                            created_at: comment.created_at,
                        })
                    })
                    .collect())
            }

            async fn like_counts<C: ConnectionTrait>(
                conn: &C,
                ids: &[CommentId],
            ) -> Result<HashMap<CommentId, u64>, DbErr> {
                if ids.is_empty() {
                    return Ok(HashMap::new());
                }

                let counts: Vec<(CommentId, i64)> = like::Entity::find()
                    .select_only()
                    .column(like::Column::CommentId)
                    .column_as(like::Column::UserId.count(), "likes")
                    .filter(like::Column::CommentId.is_in(ids.iter().copied()))
                    .group_by(like::Column::CommentId)
                    .into_tuple()
                    .all(conn)
                    .await?;

                Ok(counts
                    .into_iter()
                    .map(|(id, count)| (id, count.max(0) as u64))
                    .collect())
            }

            async fn liked_by<C: ConnectionTrait>(
                conn: &C,
                ids: &[CommentId],
                viewer: UserId,
            ) -> Result<HashSet<CommentId>, DbErr> {
                if ids.is_empty() {
                    return Ok(HashSet::new());
                }

                let liked: Vec<CommentId> = like::Entity::find()
                    .select_only()
                    .column(like::Column::CommentId)
                    .filter(like::Column::UserId.eq(viewer))
                    .filter(like::Column::CommentId.is_in(ids.iter().copied()))
                    .into_tuple()
                    .all(conn)
                    .await?;

                Ok(liked.into_iter().collect())
            }

            pub(super) async fn find<C: ConnectionTrait>(
                conn: &C,
                id: CommentId,
            ) -> Result<Option<StoredComment>, DbErr> {
                let found = comment::Entity::find_by_id(id).one(conn).await?;
                Ok(found.map(|comment| StoredComment {
                    id: comment.id,
                    subject: Subject::$variant(comment.$subject_field),
                    author_id: comment.user_id,
                }))
            }

            pub(super) async fn insert<C: ConnectionTrait>(
                conn: &C,
                subject: $subject_ty,
                author: &Actor,
                parent_id: Option<CommentId>,
                content: String,
            ) -> Result<CommentView, DbErr> {
                let comment = comment::ActiveModel {
                    id: Set(CommentId::new()),
                    $subject_field: Set(subject),
                    user_id: Set(author.id),
                    parent_id: Set(parent_id),
                    content: Set(content),
                    created_at: Set(Utc::now()),
                };
                let comment = comment::Entity::insert(comment)
                    .exec_with_returning(conn)
                    .await?;

                Ok(CommentView {
                    id: comment.id,
                    content: comment.content,
                    author: author.label(),
                    author_id: author.id,
                    created: comment.created_at,
                })
            }

            /// Replies and likes go with it through the foreign keys.
            pub(super) async fn delete<C: ConnectionTrait>(
                conn: &C,
                id: CommentId,
            ) -> Result<(), DbErr> {
                comment::Entity::delete_by_id(id).exec(conn).await?;
                Ok(())
            }

            pub(super) async fn toggle_like<C: ConnectionTrait>(
                conn: &C,
                comment_id: CommentId,
                user_id: UserId,
            ) -> Result<bool, DbErr> {
                let existing = like::Entity::find_by_id((comment_id, user_id))
                    .one(conn)
                    .await?;

                if existing.is_some() {
                    like::Entity::delete_by_id((comment_id, user_id))
                        .exec(conn)
                        .await?;
                    return Ok(false);
                }

                let like = like::ActiveModel {
                    comment_id: Set(comment_id),
                    user_id: Set(user_id),
                    created_at: Set(Utc::now()),
                };
                match like::Entity::insert(like).exec_without_returning(conn).await {
                    Ok(_) => Ok(true),
                    // A concurrent toggle won the insert
                    Err(error) if is_unique_violation(&error) => {
                        tracing::warn!(%comment_id, %user_id, "like already present");
                        Ok(true)
                    }
                    Err(error) => Err(error),
                }
            }
        }
    };
}

comment_store!(
    course_thread,
    course_comment,
    course_comment_like,
    Course(crate::ids::CourseId),
    course_id,
    CourseId
);

comment_store!(
    chapter_thread,
    chapter_comment,
    chapter_comment_like,
    Chapter(crate::ids::ChapterId),
    chapter_id,
    ChapterId
);

/// Finds the course a subject belongs to.
async fn subject_course<C: ConnectionTrait>(
    conn: &C,
    subject: Subject,
) -> Result<CourseModel, CommentsServiceError> {
    match subject {
        Subject::Course(course_id) => Course::find_by_id(course_id)
            .one(conn)
            .await?
            .ok_or(CommentsServiceError::CourseNotFound),
        Subject::Chapter(chapter_id) => {
            let (_, course) = Chapter::find_by_id(chapter_id)
                .find_also_related(Course)
                .one(conn)
                .await?
                .ok_or(CommentsServiceError::ChapterNotFound)?;
            course.ok_or(CommentsServiceError::CourseNotFound)
        }
    }
}

async fn locate<C: ConnectionTrait>(
    conn: &C,
    id: CommentId,
) -> Result<StoredComment, CommentsServiceError> {
    // Ids are unique across both tables
    if let Some(found) = course_thread::find(conn, id).await? {
        return Ok(found);
    }
    chapter_thread::find(conn, id)
        .await?
        .ok_or(CommentsServiceError::CommentNotFound)
}

#[derive(Clone)]
pub struct CommentsService {
    db: DatabaseConnection,
}

impl CommentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fails with `CourseNotFound`/`ChapterNotFound` when `subject` is gone.
    pub async fn require_subject(&self, subject: Subject) -> Result<(), CommentsServiceError> {
        subject_course(&self.db, subject).await?;
        Ok(())
    }

    /// Threaded comments of `subject`, annotated for `viewer`.
    ///
    /// Anonymous viewers see `is_liked == false` everywhere. A subject that
    /// doesn't exist simply has no comments.
    pub async fn list_threaded(
        &self,
        subject: Subject,
        viewer: Option<UserId>,
    ) -> Result<Vec<CommentNode>, CommentsServiceError> {
        let txn = self.db.begin().await?;

        let nodes = match subject {
            Subject::Course(course_id) => course_thread::thread(&txn, course_id, viewer).await?,
            Subject::Chapter(chapter_id) => {
                chapter_thread::thread(&txn, chapter_id, viewer).await?
            }
        };

        txn.commit().await?;

        tracing::debug!(?subject, top_level = nodes.len(), "listed comments");
        Ok(nodes)
    }

    pub async fn post_comment(
        &self,
        actor: &Actor,
        subject: Subject,
        comment: NewComment,
    ) -> Result<CommentView, CommentsServiceError> {
        self.write(actor, Target::Subject(subject), comment).await
    }

    /// Replies inherit the subject of their parent.
    pub async fn reply(
        &self,
        actor: &Actor,
        parent_id: CommentId,
        comment: NewComment,
    ) -> Result<CommentView, CommentsServiceError> {
        self.write(actor, Target::Reply(parent_id), comment).await
    }

    async fn write(
        &self,
        actor: &Actor,
        target: Target,
        comment: NewComment,
    ) -> Result<CommentView, CommentsServiceError> {
        comment.validate()?;

        let txn = self.db.begin().await?;

        let (subject, parent_id) = match target {
            Target::Subject(subject) => (subject, None),
            Target::Reply(parent_id) => {
                let parent = locate(&txn, parent_id).await?;
                (parent.subject, Some(parent.id))
            }
        };
        let course = subject_course(&txn, subject).await?;
        let access = course_access(&txn, &course, actor.id).await?;
        authorize(actor, Action::Comment(&access))?;

        let view = match subject {
            Subject::Course(course_id) => {
                course_thread::insert(&txn, course_id, actor, parent_id, comment.content).await?
            }
            Subject::Chapter(chapter_id) => {
                chapter_thread::insert(&txn, chapter_id, actor, parent_id, comment.content)
                    .await?
            }
        };

        txn.commit().await?;

        tracing::info!(comment = %view.id, ?subject, parent = ?parent_id, author = %actor.id, "comment posted");
        Ok(view)
    }

    pub async fn delete_comment(
        &self,
        actor: &Actor,
        comment_id: CommentId,
    ) -> Result<(), CommentsServiceError> {
        let txn = self.db.begin().await?;

        let comment = locate(&txn, comment_id).await?;
        authorize(
            actor,
            Action::DeleteComment {
                author_id: comment.author_id,
            },
        )?;

        match comment.subject {
            Subject::Course(_) => course_thread::delete(&txn, comment.id).await?,
            Subject::Chapter(_) => chapter_thread::delete(&txn, comment.id).await?,
        }

        txn.commit().await?;

        tracing::info!(comment = %comment_id, by = %actor.id, "comment deleted");
        Ok(())
    }

    /// Likes the comment if the actor hasn't yet, otherwise removes the like.
    pub async fn toggle_like(
        &self,
        actor: &Actor,
        comment_id: CommentId,
    ) -> Result<LikeToggle, CommentsServiceError> {
        authorize(actor, Action::LikeComment)?;

        let txn = self.db.begin().await?;

        let comment = locate(&txn, comment_id).await?;
        let liked = match comment.subject {
            Subject::Course(_) => course_thread::toggle_like(&txn, comment.id, actor.id).await?,
            Subject::Chapter(_) => chapter_thread::toggle_like(&txn, comment.id, actor.id).await?,
        };

        txn.commit().await?;

        tracing::info!(comment = %comment_id, user = %actor.id, liked, "like toggled");
        Ok(LikeToggle { liked })
    }
}
