use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, LoginResponseDto, UserInfoDto};
use crate::features::auth::services::TokenService;
use crate::features::auth::store::UserStore;

/// Salted password digest stored in the users table.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Credential verification and token pair issuance.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let user = self
            .users
            .find_by_username(&dto.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password.".to_string()))?;

        if hash_password(&dto.password, &user.password_salt) != user.password_hash {
            return Err(AppError::Unauthorized(
                "Invalid username or password.".to_string(),
            ));
        }

        if !user.is_active {
            return Err(AppError::Unauthorized(
                "This account has been disabled.".to_string(),
            ));
        }

        let pair = self.tokens.issue_pair(&user)?;

        info!("User logged in: {}", user.username);

        Ok(LoginResponseDto {
            access: pair.access,
            refresh: pair.refresh,
            user: UserInfoDto {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use crate::shared::test_helpers::{make_db_user, MemoryTokenBlacklist, MemoryUserStore};

    fn service_with_users(users: Vec<crate::features::auth::store::User>) -> AuthService {
        let tokens = Arc::new(TokenService::new(
            AuthConfig {
                jwt_secret: "unit-test-secret".to_string(),
                access_token_ttl_secs: 3600,
                refresh_token_ttl_secs: 604800,
                rotate_refresh_tokens: true,
            },
            Arc::new(MemoryTokenBlacklist::new()),
        ));
        AuthService::new(Arc::new(MemoryUserStore::with_users(users)), tokens)
    }

    fn login_dto(username: &str, password: &str) -> LoginRequestDto {
        LoginRequestDto {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn login_returns_tokens_and_user_info() {
        let user = make_db_user("alice", Some("editor"), true);
        let service = service_with_users(vec![user.clone()]);

        let response = service.login(login_dto("alice", "secret123")).await.unwrap();

        assert_eq!(response.user.id, user.id);
        assert_eq!(response.user.username, "alice");
        let principal = service.tokens().verify_access_token(&response.access).unwrap();
        assert_eq!(principal.role, Some(crate::features::auth::model::Role::Editor));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_get_the_same_message() {
        let service = service_with_users(vec![make_db_user("alice", None, true)]);

        for dto in [login_dto("alice", "wrong"), login_dto("nobody", "secret123")] {
            let err = service.login(dto).await.unwrap_err();
            assert!(
                matches!(err, AppError::Unauthorized(msg) if msg == "Invalid username or password.")
            );
        }
    }

    #[tokio::test]
    async fn disabled_account_cannot_log_in() {
        let service = service_with_users(vec![make_db_user("alice", Some("admin"), false)]);

        let err = service.login(login_dto("alice", "secret123")).await.unwrap_err();
        assert!(
            matches!(err, AppError::Unauthorized(msg) if msg == "This account has been disabled.")
        );
    }

    #[test]
    fn password_hash_is_salted() {
        let a = hash_password("secret123", "salt-a");
        let b = hash_password("secret123", "salt-b");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("secret123", "salt-a"));
    }
}
