use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use inkwell_core::domain::User;
use inkwell_core::ports::{BaseRepository, PasswordService, TokenService};
use inkwell_infra::{
    Argon2PasswordService, InMemoryBlogRepository, InMemoryMediaStore, InMemoryUserRepository,
    JwtConfig, JwtTokenService,
};

use super::configure_routes;
use crate::state::AppState;

const BOUNDARY: &str = "inkwell-test-boundary";

struct Harness {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    users: Arc<InMemoryUserRepository>,
    media: Arc<InMemoryMediaStore>,
}

fn harness() -> Harness {
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        ..JwtConfig::default()
    }));
    let users = Arc::new(InMemoryUserRepository::new());
    let media = Arc::new(InMemoryMediaStore::default());
    let state = AppState::assemble(
        users.clone(),
        Arc::new(InMemoryBlogRepository::new()),
        media.clone(),
        tokens.clone(),
        "memory",
    );

    Harness {
        state,
        tokens,
        users,
        media,
    }
}

macro_rules! init_app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($h.state.clone()))
                .app_data(web::Data::new($h.tokens.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

/// Text parts plus an optional `(field, filename, bytes)` file part.
fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> (header::HeaderName, String) {
    (
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    )
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = {
            let bytes = test::read_body(resp).await;
            if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            }
        };
        (status, body)
    }};
}

macro_rules! register {
    ($app:expr, $name:expr) => {{
        let (status, body) = call!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "username": $name,
                    "email": format!("{}@example.com", $name),
                    "password": "secret-password",
                }))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["_id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }};
}

macro_rules! create_blog {
    ($app:expr, $token:expr, $fields:expr) => {{
        let (status, body) = call!(
            $app,
            test::TestRequest::post()
                .uri("/api/blogs")
                .insert_header(bearer(&$token))
                .insert_header(multipart_content_type())
                .set_payload(multipart($fields, None))
        );
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }};
}

async fn seed_admin(h: &Harness) -> String {
    let hash = Argon2PasswordService::new().hash("admin-password").unwrap();
    let admin = User::new("root".into(), "root@example.com".into(), hash).with_admin(true);
    let admin = h.users.save(admin).await.unwrap();
    h.tokens.generate_token(admin.id).unwrap()
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let h = harness();
    let app = init_app!(h);

    let (status, body) = call!(app, test::TestRequest::get().uri("/api/health"));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_only_the_author_can_delete_a_blog() {
    let h = harness();
    let app = init_app!(h);
    let (_, u1) = register!(app, "writer");
    let (_, u2) = register!(app, "reader");

    let blog = create_blog!(app, u1, &[("title", "Hello"), ("content", "<p>Hi</p>"), ("category", "General")]);
    let id = blog["_id"].as_str().unwrap().to_string();

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/blogs/{id}/comment"))
            .insert_header(bearer(&u2))
            .set_json(json!({ "text": "First!" }))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/blogs/{id}"))
            .insert_header(bearer(&u2))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    let (status, body) = call!(app, test::TestRequest::get().uri(&format!("/api/blogs/{id}")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);

    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/blogs/{id}"))
            .insert_header(bearer(&u1))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call!(app, test::TestRequest::get().uri(&format!("/api/blogs/{id}")));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_blog_author_cannot_delete_someone_elses_comment() {
    let h = harness();
    let app = init_app!(h);
    let (_, author) = register!(app, "author");
    let (commenter_id, commenter) = register!(app, "commenter");

    let blog = create_blog!(app, author, &[("title", "T"), ("content", "C"), ("category", "News")]);
    let id = blog["_id"].as_str().unwrap().to_string();

    let (_, comment) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/blogs/{id}/comment"))
            .insert_header(bearer(&commenter))
            .set_json(json!({ "text": "Nice" }))
    );
    assert_eq!(comment["user"]["_id"], commenter_id.as_str());
    assert_eq!(comment["user"]["username"], "commenter");
    let comment_id = comment["_id"].as_str().unwrap().to_string();
    let uri = format!("/api/blogs/{id}/comment/{comment_id}");

    let (status, _) = call!(
        app,
        test::TestRequest::delete().uri(&uri).insert_header(bearer(&author))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        test::TestRequest::delete().uri(&uri).insert_header(bearer(&commenter))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment removed");
}

#[actix_web::test]
async fn test_tags_and_cover_image_round_trip_through_the_form() {
    let h = harness();
    let app = init_app!(h);
    let (author_id, token) = register!(app, "painter");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/blogs")
            .insert_header(bearer(&token))
            .insert_header(multipart_content_type())
            .set_payload(multipart(
                &[("title", "Art"), ("content", "C"), ("category", "Arts"), ("tags", "a, b ,c")],
                Some(("coverImage", "cover.png", b"\x89PNG fake")),
            ))
    );

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["tags"], json!(["a", "b", "c"]));
    assert_eq!(body["author"]["_id"], author_id.as_str());
    let cover = body["coverImage"].as_str().unwrap();
    assert!(cover.contains("/blog-covers/"), "{cover}");
    assert_eq!(h.media.object_count().await, 1);
}

#[actix_web::test]
async fn test_like_toggles_and_listing_filters() {
    let h = harness();
    let app = init_app!(h);
    let (_, u1) = register!(app, "alice99");
    let (_, u2) = register!(app, "bob");

    let tech = create_blog!(app, u1, &[("title", "Rust"), ("content", "C"), ("category", "Technology")]);
    create_blog!(app, u2, &[("title", "Trip"), ("content", "C"), ("category", "Travel"), ("tags", "tech-news")]);
    create_blog!(app, u2, &[("title", "Food"), ("content", "C"), ("category", "Cooking")]);
    let uri = format!("/api/blogs/{}/like", tech["_id"].as_str().unwrap());

    let (_, body) = call!(app, test::TestRequest::put().uri(&uri).insert_header(bearer(&u2)));
    assert_eq!(body["likes"], 1);
    let (_, body) = call!(app, test::TestRequest::put().uri(&uri).insert_header(bearer(&u1)));
    assert_eq!(body["likes"], 2);
    let (_, body) = call!(app, test::TestRequest::put().uri(&uri).insert_header(bearer(&u2)));
    assert_eq!(body["likes"], 1);

    let (_, body) = call!(app, test::TestRequest::get().uri("/api/blogs?category=tech"));
    let titles: Vec<&str> = body.as_array().unwrap().iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Rust") && titles.contains(&"Trip"));

    let (_, body) = call!(app, test::TestRequest::get().uri("/api/blogs?keyword=alice"));
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Rust");

    let (_, body) = call!(
        app,
        test::TestRequest::get().uri("/api/blogs?author=me").insert_header(bearer(&u2))
    );
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Anonymous callers asking for their own blogs get everything
    let (_, body) = call!(app, test::TestRequest::get().uri("/api/blogs?author=me"));
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness();
    let app = init_app!(h);
    register!(app, "carol");

    let (wrong_password, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "carol@example.com", "password": "nope" }))
    );
    let (unknown_email, other) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "nobody@example.com", "password": "nope" }))
    );

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(body, other);

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "carol@example.com", "password": "secret-password" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carol");
    assert!(body.get("password").is_none());
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let h = harness();
    let app = init_app!(h);
    register!(app, "dave");

    let (status, body) = call!(
        app,
        test::TestRequest::post().uri("/api/auth/register").set_json(json!({
            "username": "dave2",
            "email": "dave@example.com",
            "password": "pw",
        }))
    );

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["title"], "Conflict");
}

#[actix_web::test]
async fn test_protected_routes_require_a_token_and_valid_ids() {
    let h = harness();
    let app = init_app!(h);
    let (_, token) = register!(app, "erin");

    let (status, _) = call!(app, test::TestRequest::get().uri("/api/users/profile"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(
        app,
        test::TestRequest::put()
            .uri("/api/blogs/not-a-uuid/like")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid id");
}

#[actix_web::test]
async fn test_profile_update_is_a_merge_patch() {
    let h = harness();
    let app = init_app!(h);
    let (_, token) = register!(app, "frank");

    let (status, body) = call!(
        app,
        test::TestRequest::put()
            .uri("/api/users/profile")
            .insert_header(bearer(&token))
            .insert_header(multipart_content_type())
            .set_payload(multipart(&[("bio", "Hello there"), ("username", "")], None))
    );

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["bio"], "Hello there");
    assert_eq!(body["username"], "frank");
    assert_eq!(body["email"], "frank@example.com");
}

#[actix_web::test]
async fn test_admin_routes_reject_regular_users() {
    let h = harness();
    let app = init_app!(h);
    let (_, token) = register!(app, "grace");

    let (status, body) = call!(
        app,
        test::TestRequest::get().uri("/api/admin/users").insert_header(bearer(&token))
    );

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Not authorized as an admin");
}

#[actix_web::test]
async fn test_admin_user_management() {
    let h = harness();
    let admin = seed_admin(&h).await;
    let app = init_app!(h);
    let (user_id, user) = register!(app, "heidi");
    create_blog!(app, user, &[("title", "One"), ("content", "C"), ("category", "X")]);
    create_blog!(app, user, &[("title", "Two"), ("content", "C"), ("category", "X")]);

    let (status, body) = call!(
        app,
        test::TestRequest::get().uri("/api/admin/users").insert_header(bearer(&admin))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUsers"], 1);

    let (_, body) = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/admin/users/{user_id}"))
            .insert_header(bearer(&admin))
    );
    assert_eq!(body["user"]["username"], "heidi");
    assert_eq!(body["blogs"].as_array().unwrap().len(), 2);

    let admin_id = h.tokens.validate_token(&admin).unwrap().user_id;
    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/admin/users/{admin_id}"))
            .insert_header(bearer(&admin))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/admin/users/{user_id}"))
            .insert_header(bearer(&admin))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedBlogsCount"], 2);

    let (_, body) = call!(app, test::TestRequest::get().uri("/api/blogs"));
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_admin_can_create_and_reassign_blogs() {
    let h = harness();
    let admin = seed_admin(&h).await;
    let app = init_app!(h);
    let (user_id, user) = register!(app, "ivan");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/admin/blogs")
            .insert_header(bearer(&admin))
            .insert_header(multipart_content_type())
            .set_payload(multipart(&[("title", "Ann"), ("content", "C"), ("category", "News")], None))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["author"]["username"], "root");
    let id = body["_id"].as_str().unwrap().to_string();

    let (status, body) = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/admin/blogs/{id}"))
            .insert_header(bearer(&admin))
            .insert_header(multipart_content_type())
            .set_payload(multipart(&[("authorId", user_id.as_str())], None))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["author"]["_id"], user_id.as_str());
    assert_eq!(body["title"], "Ann");

    let (status, _) = call!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/admin/blogs/{id}"))
            .insert_header(bearer(&admin))
            .insert_header(multipart_content_type())
            .set_payload(multipart(&[("authorId", "nope")], None))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The new author now owns it on the ordinary route set
    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/blogs/{id}"))
            .insert_header(bearer(&user))
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_deleted_account_token_is_rejected() {
    let h = harness();
    let admin = seed_admin(&h).await;
    let app = init_app!(h);
    let (ghost_id, ghost) = register!(app, "ghost");
    let (_, other) = register!(app, "other");
    let kept = create_blog!(app, other, &[("title", "Kept"), ("content", "C"), ("category", "X")]);

    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/admin/users/{ghost_id}"))
            .insert_header(bearer(&admin))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/blogs")
            .insert_header(bearer(&ghost))
            .insert_header(multipart_content_type())
            .set_payload(multipart(&[("title", "T"), ("content", "C"), ("category", "X")], None))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Account no longer exists");

    let like = format!("/api/blogs/{}/like", kept["_id"].as_str().unwrap());
    let (status, _) = call!(app, test::TestRequest::put().uri(&like).insert_header(bearer(&ghost)));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call!(
        app,
        test::TestRequest::get().uri("/api/users/profile").insert_header(bearer(&ghost))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Optional auth falls back to the anonymous caller
    let (status, body) = call!(
        app,
        test::TestRequest::get().uri("/api/blogs?author=me").insert_header(bearer(&ghost))
    );
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body.as_array().unwrap().iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Kept"]);
    assert_eq!(body[0]["likes"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_listing_is_newest_first() {
    let h = harness();
    let app = init_app!(h);
    let (_, token) = register!(app, "chronicler");

    for title in ["first", "second", "third"] {
        create_blog!(app, token, &[("title", title), ("content", "C"), ("category", "X")]);
        actix_web::rt::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (status, body) = call!(app, test::TestRequest::get().uri("/api/blogs"));
    assert_eq!(status, StatusCode::OK);
    let blogs = body.as_array().unwrap();

    let titles: Vec<&str> = blogs.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    let created: Vec<chrono::DateTime<chrono::FixedOffset>> = blogs
        .iter()
        .map(|b| chrono::DateTime::parse_from_rfc3339(b["createdAt"].as_str().unwrap()).unwrap())
        .collect();
    assert!(created.windows(2).all(|pair| pair[0] > pair[1]), "{created:?}");
}
