//! User registry service.
//!
//! Persists account metadata for the identity layer. Password hashing and
//! token issuance happen upstream; this service only stores the hash.

use crate::model::timestamp::now_timestamp;
use crate::model::user::User;
use crate::model::validation::{normalize_email, normalize_username, validate_password_hash};
use crate::model::UserId;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::auth::AuthContext;
use crate::service::error::{ResourceKind, ServiceError, ServiceResult};
use log::info;

pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one account.
    ///
    /// # Errors
    /// - `InvalidInput` for blank username/hash or malformed email.
    /// - `DuplicateEmail` when the email (any case) is taken.
    pub fn register_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> ServiceResult<User> {
        let username = normalize_username(username)?;
        let email = normalize_email(email)?;
        validate_password_hash(password_hash)?;
        if self.repo.find_user_by_email(&email)?.is_some() {
            return Err(ServiceError::DuplicateEmail(email));
        }

        let user_id = self
            .repo
            .insert_user(&username, &email, password_hash, &now_timestamp())
            .map_err(|err| match err {
                RepoError::UniqueViolation(_) => ServiceError::DuplicateEmail(email.clone()),
                other => other.into(),
            })?;
        info!("event=user_register module=user_service status=ok user_id={user_id}");
        self.get_user(user_id)
    }

    pub fn get_user(&self, user_id: UserId) -> ServiceResult<User> {
        self.repo
            .find_user(user_id)?
            .ok_or_else(|| ServiceError::not_found(ResourceKind::User, user_id))
    }

    pub fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.repo.find_user_by_email(email.trim())?)
    }

    pub fn change_username(&self, ctx: &AuthContext, username: &str) -> ServiceResult<User> {
        let username = normalize_username(username)?;
        self.repo
            .update_username(ctx.user_id(), &username)
            .map_err(|err| user_write_error(err, ctx))?;
        self.get_user(ctx.user_id())
    }

    pub fn change_password_hash(&self, ctx: &AuthContext, password_hash: &str) -> ServiceResult<()> {
        validate_password_hash(password_hash)?;
        self.repo
            .update_password_hash(ctx.user_id(), password_hash)
            .map_err(|err| user_write_error(err, ctx))
    }
}

fn user_write_error(err: RepoError, ctx: &AuthContext) -> ServiceError {
    match err {
        RepoError::NotFound { .. } => ServiceError::not_found(ResourceKind::User, ctx.user_id()),
        other => other.into(),
    }
}
