//! Domain → wire conversions.

use inkwell_core::domain::{BlogView, CommentView, User, UserSummary};
use inkwell_core::services::AuthSession;
use inkwell_shared::dto::{
    AuthResponse, BlogResponse, CommentResponse, UserResponse, UserSummaryResponse,
};

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        bio: user.bio.clone(),
        is_admin: user.is_admin,
        created_at: user.created_at.to_rfc3339(),
    }
}

pub fn session(session: AuthSession) -> AuthResponse {
    AuthResponse {
        id: session.user.id.to_string(),
        username: session.user.username,
        email: session.user.email,
        avatar: session.user.avatar,
        is_admin: session.user.is_admin,
        token: session.token,
        expires_in: session.expires_in,
    }
}

fn summary(summary: UserSummary) -> UserSummaryResponse {
    UserSummaryResponse {
        id: summary.id.to_string(),
        username: summary.username,
        avatar: summary.avatar,
    }
}

pub fn comment(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id.to_string(),
        user: view.user.map(summary),
        text: view.comment.text,
        created_at: view.comment.created_at.to_rfc3339(),
    }
}

pub fn blog(view: BlogView) -> BlogResponse {
    let BlogView {
        blog,
        author,
        comments,
    } = view;

    BlogResponse {
        id: blog.id.to_string(),
        title: blog.title,
        content: blog.content,
        category: blog.category,
        tags: blog.tags,
        cover_image: blog.cover_image,
        author: author.map(summary),
        likes: blog.likes.iter().map(ToString::to_string).collect(),
        comments: comments.into_iter().map(comment).collect(),
        created_at: blog.created_at.to_rfc3339(),
        updated_at: blog.updated_at.to_rfc3339(),
    }
}

pub fn blogs(views: Vec<BlogView>) -> Vec<BlogResponse> {
    views.into_iter().map(blog).collect()
}
