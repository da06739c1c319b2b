//! Admin-only user and blog management. Every handler is gated by
//! [`AdminIdentity`]; blog mutations here skip the ownership check.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use inkwell_core::Access;
use inkwell_core::domain::{NewAccount, UserChanges};
use inkwell_core::query::BlogQuery;
use inkwell_shared::dto::{
    AdminCreateUserRequest, AdminUpdateUserRequest, DeleteUserResponse, MessageResponse,
    UserDetailResponse, UsersListResponse,
};

use super::blogs::{COVER_FIELD, blog_input};
use super::form::read_form;
use super::{parse_id, present};
use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/admin/users - every non-admin account.
pub async fn list_users(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let users = state.accounts.admin_list_users().await?;

    Ok(HttpResponse::Ok().json(UsersListResponse {
        total_users: users.len(),
        users: users.iter().map(present::user).collect(),
    }))
}

/// POST /api/admin/users
pub async fn create_user(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    body: web::Json<AdminCreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .accounts
        .admin_create_user(NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
            is_admin: req.is_admin,
        })
        .await?;

    Ok(HttpResponse::Created().json(present::user(&user)))
}

/// GET /api/admin/users/{id} - the user and their blogs.
pub async fn get_user(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let (user, blogs) = state.accounts.admin_get_user(id).await?;

    Ok(HttpResponse::Ok().json(UserDetailResponse {
        user: present::user(&user),
        blogs: present::blogs(blogs),
    }))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<String>,
    body: web::Json<AdminUpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let req = body.into_inner();

    let user = state
        .accounts
        .admin_update_user(
            id,
            UserChanges {
                username: req.username,
                email: req.email,
                ..Default::default()
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(present::user(&user)))
}

/// DELETE /api/admin/users/{id} - cascades to the user's blogs.
pub async fn delete_user(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let deleted_blogs_count = state.accounts.admin_delete_user(id).await?;

    Ok(HttpResponse::Ok().json(DeleteUserResponse {
        message: "User and all associated blogs removed successfully".to_string(),
        deleted_blogs_count,
    }))
}

/// GET /api/admin/blogs
pub async fn list_blogs(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let views = state.blogs.list(&BlogQuery::default(), None).await?;
    Ok(HttpResponse::Ok().json(present::blogs(views)))
}

/// POST /api/admin/blogs - optional `authorId`, defaulting to the admin.
pub async fn create_blog(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, COVER_FIELD).await?;
    let mut input = blog_input(&mut form);
    input.author_id = form.take_author_id()?;

    let view = state
        .blogs
        .admin_create(&admin.actor(), input, form.image.take())
        .await?;

    Ok(HttpResponse::Created().json(present::blog(view)))
}

/// GET /api/admin/blogs/{id}
pub async fn get_blog(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let view = state.blogs.get(id).await?;
    Ok(HttpResponse::Ok().json(present::blog(view)))
}

/// PUT /api/admin/blogs/{id} - may reassign the author.
pub async fn update_blog(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let mut form = read_form(payload, COVER_FIELD).await?;
    let mut input = blog_input(&mut form);
    input.author_id = form.take_author_id()?;

    let view = state
        .blogs
        .update(Access::Admin, id, input, form.image.take())
        .await?;

    Ok(HttpResponse::Ok().json(present::blog(view)))
}

/// DELETE /api/admin/blogs/{id}
pub async fn delete_blog(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    state.blogs.delete(Access::Admin, id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Blog removed")))
}
