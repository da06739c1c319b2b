//! Use-case services. Each one orchestrates ports and the policy for a
//! slice of the API; handlers stay thin.

mod accounts;
mod blogs;
mod cleanup;

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Blog, BlogView, CommentView, UserSummary};
use crate::error::DomainError;
use crate::ports::UserRepository;

pub use accounts::{AccountService, AuthSession, PLACEHOLDER_PASSWORD};
pub use blogs::{BlogInput, BlogService};

/// Resolve author and comment user references for a batch of blogs with a
/// single lookup.
pub(crate) async fn present(
    users: &dyn UserRepository,
    blogs: Vec<Blog>,
) -> Result<Vec<BlogView>, DomainError> {
    let mut ids: Vec<Uuid> = blogs
        .iter()
        .flat_map(|b| std::iter::once(b.author_id).chain(b.comments.iter().map(|c| c.user_id)))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let summaries: HashMap<Uuid, UserSummary> = if ids.is_empty() {
        HashMap::new()
    } else {
        users
            .find_summaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    };

    Ok(blogs
        .into_iter()
        .map(|blog| {
            let comments = blog
                .comments
                .iter()
                .map(|comment| CommentView {
                    comment: comment.clone(),
                    user: summaries.get(&comment.user_id).cloned(),
                })
                .collect();
            BlogView {
                author: summaries.get(&blog.author_id).cloned(),
                comments,
                blog,
            }
        })
        .collect())
}

/// Treat blank strings as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
