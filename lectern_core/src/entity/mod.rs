// SeaORM entities
// One module per table created by `models::migrator`

pub mod chapter;
pub mod chapter_comment;
pub mod chapter_comment_like;
pub mod chapter_progress;
pub mod course;
pub mod course_comment;
pub mod course_comment_like;
pub mod enrollment;
pub mod user;


pub mod prelude {
    // Re-export all entities for convenience
    pub use super::chapter::{
        ActiveModel as ChapterActiveModel, Column as ChapterColumn, Entity as Chapter,
        Model as ChapterModel,
    };
    pub use super::chapter_comment::{
        ActiveModel as ChapterCommentActiveModel, Column as ChapterCommentColumn,
        Entity as ChapterComment, Model as ChapterCommentModel,
    };
    pub use super::chapter_comment_like::{
        ActiveModel as ChapterCommentLikeActiveModel, Column as ChapterCommentLikeColumn,
        Entity as ChapterCommentLike, Model as ChapterCommentLikeModel,
    };
    pub use super::chapter_progress::{
        ActiveModel as ChapterProgressActiveModel, Column as ChapterProgressColumn,
        Entity as ChapterProgress, Model as ChapterProgressModel,
    };
    pub use super::course::{
        ActiveModel as CourseActiveModel, Column as CourseColumn, CourseStatus, Entity as Course,
        Model as CourseModel,
    };
    pub use super::course_comment::{
        ActiveModel as CourseCommentActiveModel, Column as CourseCommentColumn,
        Entity as CourseComment, Model as CourseCommentModel,
    };
    pub use super::course_comment_like::{
        ActiveModel as CourseCommentLikeActiveModel, Column as CourseCommentLikeColumn,
        Entity as CourseCommentLike, Model as CourseCommentLikeModel,
    };
    pub use super::enrollment::{
        ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn, Entity as Enrollment,
        Model as EnrollmentModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
        Role,
    };

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        ConnectionTrait,

        // Database and connection types
        Database,
        DatabaseConnection,
        DatabaseTransaction,
        DbErr,

        // Core traits
        EntityTrait,
        ModelTrait,
        NotSet,
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Related,
        RelationTrait,

        // Active model helpers
        Set,
        SqlErr,
        TransactionTrait,
        Unchanged,
    };
}
