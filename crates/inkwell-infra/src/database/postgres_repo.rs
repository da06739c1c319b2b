//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use inkwell_core::domain::{Blog, BlogChanges, Comment, LikeToggle, User, UserSummary};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{BaseRepository, BlogRepository, UserRepository};
use inkwell_core::query::BlogFilter;

use super::entity::blog::{self, Entity as BlogEntity};
use super::entity::blog_like::{self, Entity as BlogLikeEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::filter::to_condition;
use super::like_pattern;
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_ids_by_username(&self, fragment: &str) -> Result<Vec<Uuid>, RepoError> {
        UserEntity::find()
            .select_only()
            .column(user::Column::Id)
            .filter(Expr::col((UserEntity, user::Column::Username)).ilike(like_pattern(fragment)))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result
            .into_iter()
            .map(|model| User::from(model).summary())
            .collect())
    }

    async fn list_non_admins(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::IsAdmin.eq(false))
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL blog repository.
///
/// Likes are rows in `blog_likes` keyed by `(blog_id, user_id)` and comments
/// are rows in `comments`, so the field-level operations are single-row
/// statements that never rewrite the parent blog.
pub struct PostgresBlogRepository {
    db: DbConn,
}

impl PostgresBlogRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Load likes and comments for `models` and assemble domain blogs,
    /// preserving the input order.
    async fn hydrate<C>(&self, conn: &C, models: Vec<blog::Model>) -> Result<Vec<Blog>, RepoError>
    where
        C: ConnectionTrait,
    {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        let likes = BlogLikeEntity::find()
            .filter(blog_like::Column::BlogId.is_in(ids.clone()))
            .order_by_asc(blog_like::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(map_db_err)?;
        let comments = CommentEntity::find()
            .filter(comment::Column::BlogId.is_in(ids))
            .order_by_asc(comment::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(map_db_err)?;

        let mut likes_by_blog: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for like in likes {
            likes_by_blog.entry(like.blog_id).or_default().push(like.user_id);
        }
        let mut comments_by_blog: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for row in comments {
            comments_by_blog.entry(row.blog_id).or_default().push(row.into());
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let likes = likes_by_blog.remove(&model.id).unwrap_or_default();
                let comments = comments_by_blog.remove(&model.id).unwrap_or_default();
                model.into_domain(likes, comments)
            })
            .collect())
    }

    /// Blogs matching `filter`, newest first. Ties on `created_at` fall back
    /// to the id so the order is stable.
    fn listing(filter: &BlogFilter) -> Select<BlogEntity> {
        BlogEntity::find()
            .filter(to_condition(filter))
            .order_by_desc(blog::Column::CreatedAt)
            .order_by_desc(blog::Column::Id)
    }

    /// Select the blog row under a shared lock, so it cannot be deleted
    /// before the enclosing transaction ends.
    fn locked(id: Uuid) -> Select<BlogEntity> {
        BlogEntity::find_by_id(id).lock_shared()
    }

    async fn exists<C>(&self, conn: &C, id: Uuid) -> Result<bool, RepoError>
    where
        C: ConnectionTrait,
    {
        let count = BlogEntity::find_by_id(id)
            .count(conn)
            .await
            .map_err(map_db_err)?;
        Ok(count > 0)
    }
}

#[async_trait]
impl BaseRepository<Blog, Uuid> for PostgresBlogRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, RepoError> {
        let Some(model) = BlogEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(self.hydrate(&self.db, vec![model]).await?.pop())
    }

    async fn save(&self, blog: Blog) -> Result<Blog, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        blog::ActiveModel::from(&blog)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;

        if !blog.likes.is_empty() {
            let now = Utc::now();
            let rows = blog.likes.iter().map(|user_id| blog_like::ActiveModel {
                blog_id: Set(blog.id),
                user_id: Set(*user_id),
                created_at: Set(now.into()),
            });
            BlogLikeEntity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
        }
        if !blog.comments.is_empty() {
            let rows = blog
                .comments
                .iter()
                .map(|c| comment::ActiveModel::for_blog(blog.id, c));
            CommentEntity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(blog)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = BlogEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl BlogRepository for PostgresBlogRepository {
    async fn find(&self, filter: &BlogFilter) -> Result<Vec<Blog>, RepoError> {
        let models = Self::listing(filter)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.hydrate(&self.db, models).await
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Blog>, RepoError> {
        self.find(&BlogFilter::AuthorIs(author_id)).await
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: &BlogChanges,
    ) -> Result<Option<Blog>, RepoError> {
        fn set_or_keep<T>(value: Option<T>) -> sea_orm::ActiveValue<T>
        where
            T: Into<sea_orm::Value>,
        {
            value.map(Set).unwrap_or(NotSet)
        }

        let patch = blog::ActiveModel {
            title: set_or_keep(changes.title.clone()),
            content: set_or_keep(changes.content.clone()),
            category: set_or_keep(changes.category.clone()),
            tags: set_or_keep(changes.tags.clone()),
            cover_image: set_or_keep(changes.cover_image.clone().map(Some)),
            author_id: set_or_keep(changes.author_id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let result = BlogEntity::update_many()
            .set(patch)
            .filter(blog::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = BlogEntity::delete_many()
            .filter(blog::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }

    async fn toggle_like(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeToggle>, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        if !self.exists(&txn, id).await? {
            return Ok(None);
        }

        let removed = BlogLikeEntity::delete_many()
            .filter(blog_like::Column::BlogId.eq(id))
            .filter(blog_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?
            .rows_affected;

        let liked = removed == 0;
        if liked {
            let row = blog_like::ActiveModel {
                blog_id: Set(id),
                user_id: Set(user_id),
                created_at: Set(Utc::now().into()),
            };
            BlogLikeEntity::insert(row)
                .on_conflict(
                    OnConflict::columns([blog_like::Column::BlogId, blog_like::Column::UserId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
        }

        let count = BlogLikeEntity::find()
            .filter(blog_like::Column::BlogId.eq(id))
            .count(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(Some(LikeToggle {
            liked,
            count: count as usize,
        }))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        if Self::locked(id).one(&txn).await.map_err(map_db_err)?.is_none() {
            return Ok(false);
        }

        comment::ActiveModel::for_blog(id, &comment)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        Ok(true)
    }

    async fn remove_comment(&self, id: Uuid, comment_id: Uuid) -> Result<bool, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::Id.eq(comment_id))
            .filter(comment::Column::BlogId.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }
}
