//! Data Transfer Objects - request/response types for the API.
//!
//! Timestamps are RFC 3339 strings and ids are UUID strings.

use serde::{Deserialize, Serialize};

/// Request to register a new user. Missing fields deserialize as empty and
/// are rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin request to create an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminCreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// Admin request to rename a user or change their email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub text: Option<String>,
}

/// Identity returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// A user's profile. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

/// Populated user reference inside blogs and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummaryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    /// `None` once the commenting account has been deleted.
    pub user: Option<UserSummaryResponse>,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub author: Option<UserSummaryResponse>,
    pub likes: Vec<String>,
    pub comments: Vec<CommentResponse>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub likes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersListResponse {
    pub total_users: usize,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetailResponse {
    pub user: UserResponse,
    pub blogs: Vec<BlogResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub message: String,
    pub deleted_blogs_count: u64,
}
