//! Account lifecycle: registration, login, profiles and admin user CRUD.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    BlogView, ImageUpload, MediaFolder, NewAccount, Registration, User, UserChanges,
};
use crate::error::{DomainError, RepoError};
use crate::policy::{self, Actor};
use crate::ports::{BlogRepository, MediaStore, PasswordService, TokenService, UserRepository};

use super::{non_blank, present};

/// Password given to admin-created accounts that were not assigned one.
/// Publicly known; deployments must force a reset.
pub const PLACEHOLDER_PASSWORD: &str = "temporary123";

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub expires_in: i64,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    blogs: Arc<dyn BlogRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    media: Arc<dyn MediaStore>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        blogs: Arc<dyn BlogRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            users,
            blogs,
            passwords,
            tokens,
            media,
        }
    }

    pub async fn register(&self, req: Registration) -> Result<AuthSession, DomainError> {
        let username = required(Some(req.username), "Username")?;
        let email = required_email(Some(req.email))?;
        if req.password.is_empty() {
            return Err(DomainError::validation("Password is required"));
        }

        self.ensure_email_free(&email, None).await?;

        let password_hash = self.passwords.hash(&req.password)?;
        let user = self.users.save(User::new(username, email, password_hash)).await?;
        tracing::info!(user_id = %user.id, "User registered");

        self.session(user)
    }

    /// Authenticate by email and password. Unknown email and wrong password
    /// are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            return Err(DomainError::Unauthorized);
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(DomainError::Unauthorized);
        }

        self.session(user)
    }

    pub async fn profile(&self, actor: &Actor) -> Result<User, DomainError> {
        self.load(actor.user_id).await
    }

    /// Merge-patch the actor's own profile. A new avatar replaces the stored
    /// reference; the previous image is left in the media store.
    pub async fn update_profile(
        &self,
        actor: &Actor,
        changes: UserChanges,
        avatar: Option<ImageUpload>,
    ) -> Result<User, DomainError> {
        let mut user = self.load(actor.user_id).await?;

        let mut changes = UserChanges {
            username: non_blank(changes.username),
            email: non_blank(changes.email),
            bio: non_blank(changes.bio),
            avatar: None,
        };
        if let Some(email) = &changes.email {
            if email != &user.email {
                self.ensure_email_free(email, Some(user.id)).await?;
            }
        }
        if let Some(image) = avatar {
            changes.avatar = Some(self.media.upload(MediaFolder::Avatars, image).await?);
        }

        user.apply(changes);
        let user = self.users.save(user).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Resolve a token-bearing actor to a live account. A deleted account is
    /// Unauthorized.
    pub async fn require_account(&self, actor: &Actor) -> Result<User, DomainError> {
        self.users
            .find_by_id(actor.user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    /// Gate for the admin route set.
    pub async fn require_admin(&self, actor: &Actor) -> Result<User, DomainError> {
        let user = self.require_account(actor).await?;

        if !user.is_admin {
            tracing::warn!(user_id = %user.id, "Non-admin attempted admin access");
            return Err(DomainError::forbidden("Not authorized as an admin"));
        }
        Ok(user)
    }

    pub async fn admin_list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.list_non_admins().await?)
    }

    /// A user and every blog they wrote, newest first.
    pub async fn admin_get_user(&self, id: Uuid) -> Result<(User, Vec<BlogView>), DomainError> {
        let user = self.load(id).await?;
        let blogs = self.blogs.find_by_author(id).await?;
        let blogs = present(self.users.as_ref(), blogs).await?;
        Ok((user, blogs))
    }

    pub async fn admin_create_user(&self, req: NewAccount) -> Result<User, DomainError> {
        let username = required(Some(req.username), "Username")?;
        let email = required_email(Some(req.email))?;
        self.ensure_email_free(&email, None).await?;

        let password = match non_blank(req.password) {
            Some(password) => password,
            None => {
                tracing::warn!("Admin-created account uses the placeholder password");
                PLACEHOLDER_PASSWORD.to_string()
            }
        };
        let password_hash = self.passwords.hash(&password)?;

        let user = User::new(username, email, password_hash).with_admin(req.is_admin.unwrap_or(false));
        let user = self.users.save(user).await?;
        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User created by admin");
        Ok(user)
    }

    /// Change username and/or email. No password or role changes here.
    pub async fn admin_update_user(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<User, DomainError> {
        let mut user = self.load(id).await?;

        let changes = UserChanges {
            username: non_blank(changes.username),
            email: non_blank(changes.email),
            bio: None,
            avatar: None,
        };
        if let Some(email) = &changes.email {
            if email != &user.email {
                self.ensure_email_free(email, Some(user.id)).await?;
            }
        }

        user.apply(changes);
        let user = self.users.save(user).await?;
        tracing::info!(user_id = %user.id, "User updated by admin");
        Ok(user)
    }

    /// Delete a non-admin user and every blog they wrote. Returns the number
    /// of blogs removed.
    pub async fn admin_delete_user(&self, id: Uuid) -> Result<u64, DomainError> {
        let user = self.load(id).await?;
        if !policy::can_delete_user(&user) {
            return Err(DomainError::validation("Cannot delete admin user"));
        }

        let deleted_blogs = self.blogs.delete_by_author(id).await?;
        match self.users.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => {
                tracing::warn!(user_id = %id, deleted_blogs, "User vanished during deletion");
                return Err(DomainError::not_found("User", id));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %id, deleted_blogs, "User deleted with their blogs");

        Ok(deleted_blogs)
    }

    fn session(&self, user: User) -> Result<AuthSession, DomainError> {
        let token = self.tokens.generate_token(user.id)?;
        Ok(AuthSession {
            user,
            token,
            expires_in: self.tokens.expiration_seconds(),
        })
    }

    async fn load(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("User", id))
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> Result<(), DomainError> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(DomainError::Duplicate("Email already registered".into()))
            }
            _ => Ok(()),
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    non_blank(value)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

fn required_email(value: Option<String>) -> Result<String, DomainError> {
    let email = required(value, "Email")?;
    if !email.contains('@') {
        return Err(DomainError::validation("Invalid email address"));
    }
    Ok(email)
}
