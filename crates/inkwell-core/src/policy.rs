//! Authorization policy - pure predicates over (actor, resource) pairs.

use uuid::Uuid;

use crate::domain::{Blog, Comment, User};
use crate::error::DomainError;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
}

impl Actor {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Which gate a blog mutation came through.
///
/// `Owner` is the ordinary route set and enforces ownership. `Admin` is only
/// constructed after the admin gate and performs no ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner(Actor),
    Admin,
}

pub fn can_mutate_blog(actor: &Actor, blog: &Blog) -> bool {
    actor.user_id == blog.author_id
}

/// Blog ownership grants nothing here: only the commenter may delete.
pub fn can_delete_comment(actor: &Actor, comment: &Comment) -> bool {
    actor.user_id == comment.user_id
}

pub fn can_delete_user(target: &User) -> bool {
    !target.is_admin
}

/// Resolve an [`Access`] against a blog, failing with `Forbidden`.
pub fn ensure_can_mutate_blog(access: &Access, blog: &Blog) -> Result<(), DomainError> {
    match access {
        Access::Admin => Ok(()),
        Access::Owner(actor) if can_mutate_blog(actor, blog) => Ok(()),
        Access::Owner(_) => Err(DomainError::forbidden("Not authorized to modify this blog")),
    }
}

pub fn ensure_can_delete_comment(actor: &Actor, comment: &Comment) -> Result<(), DomainError> {
    if can_delete_comment(actor, comment) {
        Ok(())
    } else {
        Err(DomainError::forbidden("Not authorized to delete this comment"))
    }
}
