//! Blog entity for SeaORM. Likes and comments live in their own tables.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use inkwell_core::domain::{Blog, Comment};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blogs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::blog_like::Entity")]
    Likes,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::blog_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain blog from the row and its child rows.
    pub fn into_domain(self, likes: Vec<Uuid>, comments: Vec<Comment>) -> Blog {
        Blog {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            category: self.category,
            tags: self.tags,
            cover_image: self.cover_image,
            likes,
            comments,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

/// Scalar columns only; likes and comments are written separately.
impl From<&Blog> for ActiveModel {
    fn from(blog: &Blog) -> Self {
        Self {
            id: Set(blog.id),
            author_id: Set(blog.author_id),
            title: Set(blog.title.clone()),
            content: Set(blog.content.clone()),
            category: Set(blog.category.clone()),
            tags: Set(blog.tags.clone()),
            cover_image: Set(blog.cover_image.clone()),
            created_at: Set(blog.created_at.into()),
            updated_at: Set(blog.updated_at.into()),
        }
    }
}
