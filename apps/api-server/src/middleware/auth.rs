//! Authentication middleware and extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use std::sync::Arc;

use inkwell_core::error::DomainError;
use inkwell_core::ports::{AuthError, TokenClaims, TokenService};
use inkwell_core::{Access, Actor};
use inkwell_shared::ErrorResponse;

use super::error::AppError;
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: uuid::Uuid,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id)
    }

    /// Ownership-checked access for the ordinary route set.
    pub fn as_owner(&self) -> Access {
        Access::Owner(self.actor())
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth => {
                actix_web::http::StatusCode::UNAUTHORIZED
            }
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            _ => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthenticationError> {
    // Get token service from app data
    let Some(token_service) = req.app_data::<web::Data<Arc<dyn TokenService>>>() else {
        tracing::error!("TokenService not found in app data");
        return Err(AuthenticationError(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        )));
    };

    // Extract Bearer token from Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthenticationError(AuthError::MissingAuth))?;

    let auth_str = auth_header.to_str().map_err(|_| {
        AuthenticationError(AuthError::InvalidToken(
            "Invalid authorization header".to_string(),
        ))
    })?;

    // Parse "Bearer <token>"
    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AuthenticationError(AuthError::InvalidToken(
            "Expected Bearer token".to_string(),
        ))
    })?;

    token_service
        .validate_token(token.trim())
        .map(Identity::from)
        .map_err(AuthenticationError)
}

/// Validate the bearer token and confirm the account behind it still exists.
fn resolve(req: &HttpRequest) -> LocalBoxFuture<'static, Result<Identity, actix_web::Error>> {
    let identity = authenticate(req);
    let state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
        let identity = identity?;
        let state = app_state(state)?;

        state
            .accounts
            .require_account(&identity.actor())
            .await
            .map_err(account_error)?;

        Ok::<_, actix_web::Error>(identity)
    })
}

fn app_state(state: Option<web::Data<AppState>>) -> Result<web::Data<AppState>, AppError> {
    state.ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AppError::Internal("Server configuration error".into())
    })
}

fn account_error(err: DomainError) -> AppError {
    match err {
        DomainError::Unauthorized => AppError::Unauthorized("Account no longer exists".into()),
        other => AppError::from(other),
    }
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        resolve(req)
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
///
/// An absent or invalid token, or one whose account is gone, degrades to the
/// anonymous caller.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(Identity::actor)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if !req.headers().contains_key(header::AUTHORIZATION) {
            return Box::pin(async { Ok::<_, actix_web::Error>(OptionalIdentity(None)) });
        }

        let identity = resolve(req);
        Box::pin(async move {
            let identity = match identity.await {
                Ok(identity) => Some(identity),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring unusable credentials");
                    None
                }
            };
            Ok::<_, actix_web::Error>(OptionalIdentity(identity))
        })
    }
}

/// Authenticated identity whose account carries the admin flag.
///
/// The flag is read from the store on every request, so revoking it takes
/// effect immediately.
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity(pub Identity);

impl AdminIdentity {
    pub fn actor(&self) -> Actor {
        self.0.actor()
    }
}

impl FromRequest for AdminIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = authenticate(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let identity = identity?;
            let state = app_state(state)?;

            state
                .accounts
                .require_admin(&identity.actor())
                .await
                .map_err(account_error)?;

            Ok::<_, actix_web::Error>(AdminIdentity(identity))
        })
    }
}
