use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Blog, BlogChanges, Comment, LikeToggle, User, UserSummary};
use crate::error::RepoError;
use crate::query::BlogFilter;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` when
    /// nothing was deleted.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Ids of users whose username contains `fragment`, ignoring case.
    async fn find_ids_by_username(&self, fragment: &str) -> Result<Vec<Uuid>, RepoError>;

    /// `(username, avatar)` projections for the given ids. Unknown ids are
    /// skipped.
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, RepoError>;

    /// Every account without the admin flag.
    async fn list_non_admins(&self) -> Result<Vec<User>, RepoError>;
}

/// Blog repository.
///
/// `save` is used for creation only. Everything that changes an existing
/// blog goes through a field-level operation so concurrent writers never
/// overwrite each other's likes or comments.
#[async_trait]
pub trait BlogRepository: BaseRepository<Blog, Uuid> {
    /// Blogs matching `filter`, newest first.
    async fn find(&self, filter: &BlogFilter) -> Result<Vec<Blog>, RepoError>;

    /// Blogs written by `author_id`, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Blog>, RepoError>;

    /// Apply a merge patch to scalar fields. `None` when the blog is gone.
    async fn update_fields(
        &self,
        id: Uuid,
        changes: &BlogChanges,
    ) -> Result<Option<Blog>, RepoError>;

    /// Delete every blog written by `author_id`, returning how many went.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    /// Atomically add or remove `user_id` from the likes set.
    async fn toggle_like(&self, id: Uuid, user_id: Uuid)
    -> Result<Option<LikeToggle>, RepoError>;

    /// Atomically append a comment. `false` when the blog is gone.
    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<bool, RepoError>;

    /// Atomically remove a comment. `false` when nothing was removed.
    async fn remove_comment(&self, id: Uuid, comment_id: Uuid) -> Result<bool, RepoError>;
}
