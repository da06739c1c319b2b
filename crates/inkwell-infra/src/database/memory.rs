//! In-memory document store - used when no database is configured and in
//! tests.
//!
//! Every mutation takes the write lock for its whole read-modify-write, so
//! likes and comments behave like atomic field-level updates.
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkwell_core::RepoError;
use inkwell_core::domain::{Blog, BlogChanges, Comment, LikeToggle, User, UserSummary};
use inkwell_core::ports::{BaseRepository, BlogRepository, UserRepository};
use inkwell_core::query::{BlogFilter, contains_ignore_case};

/// In-memory user collection. Emails are unique.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(RepoError::Constraint("Email already registered".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_ids_by_username(&self, fragment: &str) -> Result<Vec<Uuid>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .filter(|u| contains_ignore_case(&u.username, fragment))
            .map(|u| u.id)
            .collect())
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>, RepoError> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| store.get(id))
            .map(User::summary)
            .collect())
    }

    async fn list_non_admins(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self
            .store
            .read()
            .await
            .values()
            .filter(|u| !u.is_admin)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

/// In-memory blog collection with embedded likes and comments.
#[derive(Default)]
pub struct InMemoryBlogRepository {
    store: RwLock<HashMap<Uuid, Blog>>,
}

impl InMemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut blogs: Vec<Blog>) -> Vec<Blog> {
        blogs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        blogs
    }
}

#[async_trait]
impl BaseRepository<Blog, Uuid> for InMemoryBlogRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn save(&self, blog: Blog) -> Result<Blog, RepoError> {
        self.store.write().await.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl BlogRepository for InMemoryBlogRepository {
    async fn find(&self, filter: &BlogFilter) -> Result<Vec<Blog>, RepoError> {
        let blogs = self
            .store
            .read()
            .await
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        Ok(Self::newest_first(blogs))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Blog>, RepoError> {
        self.find(&BlogFilter::AuthorIs(author_id)).await
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: &BlogChanges,
    ) -> Result<Option<Blog>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|blog| {
            blog.apply(changes);
            blog.clone()
        }))
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, blog| blog.author_id != author_id);
        Ok((before - store.len()) as u64)
    }

    async fn toggle_like(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LikeToggle>, RepoError> {
        let mut store = self.store.write().await;
        let Some(blog) = store.get_mut(&id) else {
            return Ok(None);
        };

        let liked = if blog.is_liked_by(user_id) {
            blog.likes.retain(|u| *u != user_id);
            false
        } else {
            blog.likes.push(user_id);
            true
        };

        Ok(Some(LikeToggle {
            liked,
            count: blog.likes.len(),
        }))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&id) {
            Some(blog) => {
                blog.comments.push(comment);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_comment(&self, id: Uuid, comment_id: Uuid) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        let Some(blog) = store.get_mut(&id) else {
            return Ok(false);
        };

        let before = blog.comments.len();
        blog.comments.retain(|c| c.id != comment_id);
        Ok(blog.comments.len() != before)
    }
}
