use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;

/// Blog entity - a post with its embedded likes and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    /// Users who liked the blog. Each id appears at most once.
    pub likes: Vec<Uuid>,
    /// Append-only except for removals; order is display order.
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    /// Create a new blog with no likes and no comments.
    pub fn new(author_id: Uuid, draft: BlogDraft, cover_image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            content: draft.content,
            category: draft.category,
            tags: draft.tags,
            cover_image,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    /// Apply a merge patch to the scalar fields. Likes and comments are
    /// never touched here.
    pub fn apply(&mut self, changes: &BlogChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
        if let Some(category) = &changes.category {
            self.category = category.clone();
        }
        if let Some(tags) = &changes.tags {
            self.tags = tags.clone();
        }
        if let Some(cover_image) = &changes.cover_image {
            self.cover_image = Some(cover_image.clone());
        }
        if let Some(author_id) = changes.author_id {
            self.author_id = author_id;
        }
        self.updated_at = Utc::now();
    }
}

/// Comment embedded in a blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Validated fields of a blog about to be created.
#[derive(Debug, Clone, Default)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Merge patch for a blog. `None` means "leave unchanged", never "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
    /// Only honoured on the admin path.
    pub author_id: Option<Uuid>,
}

impl BlogChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub count: usize,
}

/// A blog with its author and comment users resolved.
#[derive(Debug, Clone)]
pub struct BlogView {
    pub blog: Blog,
    pub author: Option<UserSummary>,
    pub comments: Vec<CommentView>,
}

/// A comment with its user resolved. `user` is `None` once the
/// commenting account has been deleted.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub user: Option<UserSummary>,
}

/// Parse the comma-delimited wire form of tags into the canonical ordered
/// list. Segments are trimmed; empty segments are dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags_trims_and_keeps_order() {
        assert_eq!(parse_tags("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_tags_drops_empty_segments() {
        assert_eq!(parse_tags(" rust,, web , "), vec!["rust", "web"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn apply_only_changes_supplied_fields() {
        let mut blog = Blog::new(
            Uuid::new_v4(),
            BlogDraft {
                title: "Old".into(),
                content: "<p>body</p>".into(),
                category: "Tech".into(),
                tags: vec!["a".into()],
            },
            Some("https://cdn/x.png".into()),
        );
        blog.likes.push(Uuid::new_v4());

        blog.apply(&BlogChanges {
            title: Some("New".into()),
            ..Default::default()
        });

        assert_eq!(blog.title, "New");
        assert_eq!(blog.content, "<p>body</p>");
        assert_eq!(blog.tags, vec!["a"]);
        assert_eq!(blog.cover_image.as_deref(), Some("https://cdn/x.png"));
        assert_eq!(blog.likes.len(), 1);
    }
}
