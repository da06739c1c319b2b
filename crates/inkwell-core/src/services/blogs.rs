//! Blog and comment lifecycle.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    Blog, BlogChanges, BlogDraft, BlogView, Comment, CommentView, ImageUpload, MediaFolder,
    parse_tags,
};
use crate::error::{DomainError, RepoError};
use crate::policy::{self, Access, Actor};
use crate::ports::{BlogRepository, MediaStore, UserRepository};
use crate::query::{self, BlogQuery};

use super::cleanup::discard_image;
use super::{non_blank, present};

/// Text fields of a blog create/update form.
///
/// `tags` is the comma-delimited wire form. `author_id` is only honoured on
/// the admin path.
#[derive(Debug, Clone, Default)]
pub struct BlogInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub author_id: Option<Uuid>,
}

impl BlogInput {
    fn into_draft(self) -> Result<BlogDraft, DomainError> {
        let (Some(title), Some(content), Some(category)) = (
            non_blank(self.title),
            non_blank(self.content),
            non_blank(self.category),
        ) else {
            return Err(DomainError::validation(
                "Title, content and category are required",
            ));
        };

        Ok(BlogDraft {
            title,
            content,
            category,
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
        })
    }
}

pub struct BlogService {
    blogs: Arc<dyn BlogRepository>,
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStore>,
}

impl BlogService {
    pub fn new(
        blogs: Arc<dyn BlogRepository>,
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            blogs,
            users,
            media,
        }
    }

    /// Blogs matching the listing parameters, newest first.
    pub async fn list(
        &self,
        query: &BlogQuery,
        actor: Option<&Actor>,
    ) -> Result<Vec<BlogView>, DomainError> {
        let keyword_authors = match &query.keyword {
            Some(keyword) => self.users.find_ids_by_username(keyword).await?,
            None => Vec::new(),
        };
        let filter = query::compose(query, actor, &keyword_authors);
        tracing::debug!(?filter, "Listing blogs");

        let blogs = self.blogs.find(&filter).await?;
        present(self.users.as_ref(), blogs).await
    }

    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BlogView>, DomainError> {
        let blogs = self.blogs.find_by_author(author_id).await?;
        present(self.users.as_ref(), blogs).await
    }

    pub async fn get(&self, id: Uuid) -> Result<BlogView, DomainError> {
        let blog = self.load(id).await?;
        self.present_one(blog).await
    }

    /// Create a blog authored by `actor`.
    pub async fn create(
        &self,
        actor: &Actor,
        input: BlogInput,
        cover: Option<ImageUpload>,
    ) -> Result<BlogView, DomainError> {
        self.insert(actor.user_id, input, cover).await
    }

    /// Create a blog on behalf of any existing user. Without an explicit
    /// author the admin becomes the author.
    pub async fn admin_create(
        &self,
        admin: &Actor,
        input: BlogInput,
        cover: Option<ImageUpload>,
    ) -> Result<BlogView, DomainError> {
        let author_id = input.author_id.unwrap_or(admin.user_id);
        self.ensure_author_exists(author_id).await?;
        self.insert(author_id, input, cover).await
    }

    async fn insert(
        &self,
        author_id: Uuid,
        input: BlogInput,
        cover: Option<ImageUpload>,
    ) -> Result<BlogView, DomainError> {
        let draft = input.into_draft()?;

        let cover_image = match cover {
            Some(image) => Some(self.media.upload(MediaFolder::BlogCovers, image).await?),
            None => None,
        };

        let blog = self.blogs.save(Blog::new(author_id, draft, cover_image)).await?;
        tracing::info!(blog_id = %blog.id, author_id = %author_id, "Blog created");

        self.present_one(blog).await
    }

    /// Merge-patch a blog. Only supplied fields change.
    pub async fn update(
        &self,
        access: Access,
        id: Uuid,
        input: BlogInput,
        cover: Option<ImageUpload>,
    ) -> Result<BlogView, DomainError> {
        let blog = self.load(id).await?;
        policy::ensure_can_mutate_blog(&access, &blog)?;

        let mut changes = BlogChanges {
            title: non_blank(input.title),
            content: non_blank(input.content),
            category: non_blank(input.category),
            tags: non_blank(input.tags).as_deref().map(parse_tags),
            cover_image: None,
            author_id: None,
        };

        if let (Access::Admin, Some(author_id)) = (access, input.author_id) {
            self.ensure_author_exists(author_id).await?;
            changes.author_id = Some(author_id);
        }

        if let Some(image) = cover {
            if let Some(old) = &blog.cover_image {
                discard_image(self.media.as_ref(), old, MediaFolder::BlogCovers).await;
            }
            changes.cover_image = Some(self.media.upload(MediaFolder::BlogCovers, image).await?);
        }

        if changes.is_empty() {
            return self.present_one(blog).await;
        }

        let updated = self
            .blogs
            .update_fields(id, &changes)
            .await?
            .ok_or(DomainError::not_found("Blog", id))?;
        tracing::info!(blog_id = %id, "Blog updated");

        self.present_one(updated).await
    }

    /// Delete a blog. Cover image removal is best-effort; removing the
    /// record is not.
    pub async fn delete(&self, access: Access, id: Uuid) -> Result<(), DomainError> {
        let blog = self.load(id).await?;
        policy::ensure_can_mutate_blog(&access, &blog)?;

        if let Some(cover) = &blog.cover_image {
            discard_image(self.media.as_ref(), cover, MediaFolder::BlogCovers).await;
        }

        match self.blogs.delete(id).await {
            Ok(()) => {
                tracing::info!(blog_id = %id, "Blog deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => {
                tracing::error!(blog_id = %id, "Blog deletion affected no rows");
                Err(DomainError::Internal(
                    "Failed to delete blog from database".into(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add or remove the actor's like and return the resulting count.
    pub async fn toggle_like(&self, actor: &Actor, id: Uuid) -> Result<usize, DomainError> {
        let toggle = self
            .blogs
            .toggle_like(id, actor.user_id)
            .await?
            .ok_or(DomainError::not_found("Blog", id))?;

        tracing::debug!(
            blog_id = %id,
            user_id = %actor.user_id,
            liked = toggle.liked,
            likes = toggle.count,
            "Like toggled"
        );
        Ok(toggle.count)
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        id: Uuid,
        text: Option<String>,
    ) -> Result<CommentView, DomainError> {
        let text = non_blank(text).ok_or(DomainError::validation("Comment text is required"))?;

        let comment = Comment::new(actor.user_id, text);
        if !self.blogs.push_comment(id, comment.clone()).await? {
            return Err(DomainError::not_found("Blog", id));
        }
        tracing::info!(blog_id = %id, comment_id = %comment.id, "Comment added");

        let user = self
            .users
            .find_summaries(&[actor.user_id])
            .await?
            .into_iter()
            .next();
        Ok(CommentView { comment, user })
    }

    pub async fn delete_comment(
        &self,
        actor: &Actor,
        id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        let blog = self.load(id).await?;
        let comment = blog
            .comment(comment_id)
            .ok_or(DomainError::not_found("Comment", comment_id))?;
        policy::ensure_can_delete_comment(actor, comment)?;

        if !self.blogs.remove_comment(id, comment_id).await? {
            return Err(DomainError::not_found("Comment", comment_id));
        }
        tracing::info!(blog_id = %id, comment_id = %comment_id, "Comment removed");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Blog, DomainError> {
        self.blogs
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("Blog", id))
    }

    async fn ensure_author_exists(&self, author_id: Uuid) -> Result<(), DomainError> {
        match self.users.find_by_id(author_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation("Invalid author ID")),
        }
    }

    async fn present_one(&self, blog: Blog) -> Result<BlogView, DomainError> {
        let id = blog.id;
        present(self.users.as_ref(), vec![blog])
            .await?
            .pop()
            .ok_or(DomainError::not_found("Blog", id))
    }
}
