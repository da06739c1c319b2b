//! Blog, like and comment handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use inkwell_core::query::BlogQuery;
use inkwell_core::services::BlogInput;
use inkwell_shared::dto::{CommentRequest, LikeResponse, MessageResponse};

use super::form::{FormData, read_form};
use super::{parse_id, present};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Form part carrying the cover image.
pub(super) const COVER_FIELD: &str = "coverImage";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
}

/// Text fields shared by the create and update forms.
pub(super) fn blog_input(form: &mut FormData) -> BlogInput {
    BlogInput {
        title: form.take("title"),
        content: form.take("content"),
        category: form.take("category"),
        tags: form.take("tags"),
        author_id: None,
    }
}

/// GET /api/blogs?keyword=&category=&author=me
pub async fn list(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let query = BlogQuery::from_params(
        params.keyword.as_deref(),
        params.category.as_deref(),
        params.author.as_deref(),
    );

    let views = state.blogs.list(&query, identity.actor().as_ref()).await?;
    Ok(HttpResponse::Ok().json(present::blogs(views)))
}

/// GET /api/blogs/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let view = state.blogs.get(id).await?;
    Ok(HttpResponse::Ok().json(present::blog(view)))
}

/// POST /api/blogs - multipart with optional `coverImage`.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, COVER_FIELD).await?;
    let input = blog_input(&mut form);

    let view = state
        .blogs
        .create(&identity.actor(), input, form.image.take())
        .await?;

    Ok(HttpResponse::Created().json(present::blog(view)))
}

/// PUT /api/blogs/{id} - author only.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let mut form = read_form(payload, COVER_FIELD).await?;
    let input = blog_input(&mut form);

    let view = state
        .blogs
        .update(identity.as_owner(), id, input, form.image.take())
        .await?;

    Ok(HttpResponse::Ok().json(present::blog(view)))
}

/// DELETE /api/blogs/{id} - author only.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    state.blogs.delete(identity.as_owner(), id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Blog removed successfully")))
}

/// PUT /api/blogs/{id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let likes = state.blogs.toggle_like(&identity.actor(), id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse { likes }))
}

/// POST /api/blogs/{id}/comment
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let view = state
        .blogs
        .add_comment(&identity.actor(), id, body.into_inner().text)
        .await?;

    Ok(HttpResponse::Created().json(present::comment(view)))
}

/// DELETE /api/blogs/{id}/comment/{comment_id} - commenter only.
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (id, comment_id) = path.into_inner();
    let (id, comment_id) = (parse_id(&id)?, parse_id(&comment_id)?);

    state
        .blogs
        .delete_comment(&identity.actor(), id, comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Comment removed")))
}
