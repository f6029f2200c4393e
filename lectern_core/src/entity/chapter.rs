use crate::ids::{ChapterId, CourseId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chapter")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: ChapterId,
    pub course_id: CourseId,
    pub title: String,
    /// Ordering key within the course.
    pub position: i32,
    pub video_url: Option<String>,
    pub resource_url: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::chapter_progress::Entity")]
    ChapterProgress,
    #[sea_orm(has_many = "super::chapter_comment::Entity")]
    ChapterComment,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::chapter_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChapterProgress.def()
    }
}

impl Related<super::chapter_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChapterComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
