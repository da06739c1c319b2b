//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod blogs;
mod form;
mod health;
mod present;
mod users;

#[cfg(test)]
mod tests;

use actix_web::error::JsonPayloadError;
use actix_web::web;
use uuid::Uuid;

use crate::middleware::error::{AppError, AppResult};

/// JSON body cap, matching the upload cap.
const JSON_LIMIT_BYTES: usize = form::MAX_UPLOAD_BYTES;

/// Path ids are UUIDs; anything else is a bad request.
pub(crate) fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid id".to_string()))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            let err = match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    AppError::PayloadTooLarge("JSON body exceeds the 10 MiB limit".to_string())
                }
                other => AppError::BadRequest(other.to_string()),
            };
            err.into()
        })
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login)),
            )
            // Own profile
            .service(
                web::scope("/users")
                    .route("/profile", web::get().to(users::get_profile))
                    .route("/profile", web::put().to(users::update_profile)),
            )
            // Blogs, likes and comments
            .service(
                web::scope("/blogs")
                    .route("", web::get().to(blogs::list))
                    .route("", web::post().to(blogs::create))
                    .route("/{id}", web::get().to(blogs::get))
                    .route("/{id}", web::put().to(blogs::update))
                    .route("/{id}", web::delete().to(blogs::delete))
                    .route("/{id}/like", web::put().to(blogs::toggle_like))
                    .route("/{id}/comment", web::post().to(blogs::add_comment))
                    .route(
                        "/{id}/comment/{comment_id}",
                        web::delete().to(blogs::delete_comment),
                    ),
            )
            // Admin routes
            .service(
                web::scope("/admin")
                    .route("/users", web::get().to(admin::list_users))
                    .route("/users", web::post().to(admin::create_user))
                    .route("/users/{id}", web::get().to(admin::get_user))
                    .route("/users/{id}", web::put().to(admin::update_user))
                    .route("/users/{id}", web::delete().to(admin::delete_user))
                    .route("/blogs", web::get().to(admin::list_blogs))
                    .route("/blogs", web::post().to(admin::create_blog))
                    .route("/blogs/{id}", web::get().to(admin::get_blog))
                    .route("/blogs/{id}", web::put().to(admin::update_blog))
                    .route("/blogs/{id}", web::delete().to(admin::delete_blog)),
            ),
    );
}
