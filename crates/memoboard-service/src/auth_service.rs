//! Authentication service implementation.

use async_trait::async_trait;
use chrono::Utc;
use memoboard_core::{MemoError, MemoResult, User, UserId};
use memoboard_repository::UserRepository;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hex SHA-256 of `salt + password`, the stored password format.
#[must_use]
pub fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn digests_match(stored: &str, computed: &str) -> bool {
    let (a, b) = (stored.as_bytes(), computed.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Checks a username/password pair and records the access.
    async fn authenticate(&self, username: &str, password: &str) -> MemoResult<User>;

    /// Looks up the user behind a resolved session, if any.
    async fn current_user(&self, user_id: Option<UserId>) -> MemoResult<Option<User>>;
}

/// Authentication service implementation.
pub struct AuthServiceImpl {
    users: Arc<dyn UserRepository>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn authenticate(&self, username: &str, password: &str) -> MemoResult<User> {
        debug!("Login attempt for: {}", username);

        let mut user = self
            .users
            .find_user_by_name(username)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: user not found - {}", username);
                MemoError::InvalidCredentials
            })?;

        if !digests_match(&user.password_hash, &password_digest(&user.salt, password)) {
            warn!("Login failed: invalid password - {}", user.id);
            return Err(MemoError::InvalidCredentials);
        }

        self.users.update_last_access(user.id).await?;
        user.touch(Utc::now());

        info!("User logged in: {}", user.id);
        Ok(user)
    }

    async fn current_user(&self, user_id: Option<UserId>) -> MemoResult<Option<User>> {
        match user_id {
            Some(id) => self.users.find_user_by_id(id).await,
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for AuthServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryUserRepository;

    fn create_auth_service() -> (Arc<InMemoryUserRepository>, AuthServiceImpl) {
        let repo = Arc::new(InMemoryUserRepository::new());
        (repo.clone(), AuthServiceImpl::new(repo))
    }

    #[test]
    fn test_password_digest_is_salt_then_password() {
        assert_eq!(password_digest("", "hello"), password_digest("he", "llo"));
        assert_eq!(
            password_digest("", "hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_authenticate_success_records_access() {
        let (repo, service) = create_auth_service();
        let id = repo.add_user("alice", "correct horse");

        let user = service.authenticate("alice", "correct horse").await.unwrap();
        assert_eq!(user.id, id);
        assert!(user.last_access.is_some());
        assert!(repo.user(id).unwrap().last_access.is_some());
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let (repo, service) = create_auth_service();
        let id = repo.add_user("alice", "correct horse");

        let err = service.authenticate("alice", "battery").await.unwrap_err();
        assert!(matches!(err, MemoError::InvalidCredentials));
        assert!(repo.user(id).unwrap().last_access.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let (_, service) = create_auth_service();
        let err = service.authenticate("nobody", "pw").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_current_user() {
        let (repo, service) = create_auth_service();
        let id = repo.add_user("alice", "pw");

        assert!(service.current_user(None).await.unwrap().is_none());
        assert_eq!(
            service.current_user(Some(id)).await.unwrap().unwrap().username,
            "alice"
        );
        assert!(service
            .current_user(Some(UserId::new(404)))
            .await
            .unwrap()
            .is_none());
    }
}
