use crate::ids::{CommentId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// Row presence means "liked"; the composite key keeps it one per user
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_comment_like")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub comment_id: CommentId,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: UserId,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course_comment::Entity",
        from = "Column::CommentId",
        to = "super::course_comment::Column::Id"
    )]
    CourseComment,
}

impl Related<super::course_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
