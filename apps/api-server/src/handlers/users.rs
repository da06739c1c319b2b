//! Profile handlers for the signed-in user.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use inkwell_core::domain::UserChanges;

use super::form::read_form;
use super::present;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users/profile
pub async fn get_profile(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state.accounts.profile(&identity.actor()).await?;
    Ok(HttpResponse::Ok().json(present::user(&user)))
}

/// PUT /api/users/profile - multipart with optional `avatar` file.
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, "avatar").await?;

    let changes = UserChanges {
        username: form.take("username"),
        email: form.take("email"),
        bio: form.take("bio"),
        avatar: None,
    };

    let user = state
        .accounts
        .update_profile(&identity.actor(), changes, form.image.take())
        .await?;

    Ok(HttpResponse::Ok().json(present::user(&user)))
}
