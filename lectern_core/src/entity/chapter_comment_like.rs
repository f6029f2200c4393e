use crate::ids::{CommentId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// Row presence means "liked"; the composite key keeps it one per user
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chapter_comment_like")]
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
        belongs_to = "super::chapter_comment::Entity",
        from = "Column::CommentId",
        to = "super::chapter_comment::Column::Id"
    )]
    ChapterComment,
}

impl Related<super::chapter_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChapterComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
