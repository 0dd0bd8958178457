use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Role};
use crate::features::auth::store::{TokenBlacklist, User};

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub role: Option<Role>,
    pub token_type: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Outcome of a refresh-token exchange. `refresh` is present only when
/// rotation is enabled.
#[derive(Debug)]
pub struct RefreshedTokens {
    pub access: String,
    pub refresh: Option<String>,
}

/// Issues and verifies the HS256 access/refresh token pair.
///
/// Access tokens are short-lived and verified statelessly; refresh tokens
/// carry a jti and can be blacklisted (single-use once rotated or logged
/// out).
pub struct TokenService {
    config: AuthConfig,
    blacklist: Arc<dyn TokenBlacklist>,
}

impl TokenService {
    pub fn new(config: AuthConfig, blacklist: Arc<dyn TokenBlacklist>) -> Self {
        Self { config, blacklist }
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        let role = user.role.as_deref().and_then(Role::parse);
        let access = self.issue(
            user.id,
            &user.username,
            &user.email,
            role,
            TOKEN_TYPE_ACCESS,
            self.config.access_token_ttl_secs,
        )?;
        let refresh = self.issue(
            user.id,
            &user.username,
            &user.email,
            role,
            TOKEN_TYPE_REFRESH,
            self.config.refresh_token_ttl_secs,
        )?;
        Ok(TokenPair { access, refresh })
    }

    fn issue(
        &self,
        sub: Uuid,
        username: &str,
        email: &str,
        role: Option<Role>,
        token_type: &str,
        ttl_secs: i64,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub,
            username: username.to_string(),
            email: email.to_string(),
            role,
            token_type: token_type.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_secs,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn decode_claims(&self, token: &str) -> Result<TokenClaims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Token is invalid or expired".to_string()))
    }

    /// Verify a bearer access token and build the request principal from it.
    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.decode_claims(token)?;

        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::Unauthorized(
                "Token is not an access token".to_string(),
            ));
        }

        Ok(AuthenticatedUser {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        })
    }

    async fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims> {
        let claims = self.decode_claims(token)?;

        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(AppError::Unauthorized(
                "Token is not a refresh token".to_string(),
            ));
        }

        if self.blacklist.is_blacklisted(&claims.jti).await? {
            return Err(AppError::Unauthorized("Token is blacklisted".to_string()));
        }

        Ok(claims)
    }

    /// Exchange a refresh token for a new access token. With rotation
    /// enabled the old refresh token is blacklisted and a new one returned.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens> {
        let claims = self.verify_refresh_token(refresh_token).await?;

        let access = self.issue(
            claims.sub,
            &claims.username,
            &claims.email,
            claims.role,
            TOKEN_TYPE_ACCESS,
            self.config.access_token_ttl_secs,
        )?;

        let refresh = if self.config.rotate_refresh_tokens {
            self.blacklist
                .blacklist(&claims.jti, expiry_timestamp(claims.exp))
                .await?;
            Some(self.issue(
                claims.sub,
                &claims.username,
                &claims.email,
                claims.role,
                TOKEN_TYPE_REFRESH,
                self.config.refresh_token_ttl_secs,
            )?)
        } else {
            None
        };

        Ok(RefreshedTokens { access, refresh })
    }

    /// Blacklist a refresh token. Replaying an already blacklisted token is
    /// an authentication failure, not a no-op.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let claims = self.verify_refresh_token(refresh_token).await?;

        self.blacklist
            .blacklist(&claims.jti, expiry_timestamp(claims.exp))
            .await
    }
}

fn expiry_timestamp(exp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(exp, 0).single().unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{make_db_user, MemoryTokenBlacklist};

    fn auth_config(rotate: bool) -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 604800,
            rotate_refresh_tokens: rotate,
        }
    }

    fn service(rotate: bool) -> TokenService {
        TokenService::new(auth_config(rotate), Arc::new(MemoryTokenBlacklist::new()))
    }

    #[tokio::test]
    async fn issued_access_token_verifies_back_to_the_user() {
        let service = service(true);
        let user = make_db_user("alice", Some("editor"), true);

        let pair = service.issue_pair(&user).unwrap();
        let principal = service.verify_access_token(&pair.access).unwrap();

        assert_eq!(principal.id, user.id);
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.role, Some(Role::Editor));
    }

    #[tokio::test]
    async fn refresh_token_is_rejected_as_access_token() {
        let service = service(true);
        let user = make_db_user("alice", None, true);

        let pair = service.issue_pair(&user).unwrap();
        let err = service.verify_access_token(&pair.refresh).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token is not an access token"));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let service = service(true);
        let err = service.refresh("not-a-jwt").await.unwrap_err();
        assert!(
            matches!(err, AppError::Unauthorized(msg) if msg == "Token is invalid or expired")
        );
    }

    #[tokio::test]
    async fn access_token_cannot_be_used_to_refresh() {
        let service = service(true);
        let user = make_db_user("alice", Some("admin"), true);

        let pair = service.issue_pair(&user).unwrap();
        let err = service.refresh(&pair.access).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token is not a refresh token"));
    }

    #[tokio::test]
    async fn rotation_blacklists_the_used_refresh_token() {
        let service = service(true);
        let user = make_db_user("alice", Some("viewer"), true);
        let pair = service.issue_pair(&user).unwrap();

        let refreshed = service.refresh(&pair.refresh).await.unwrap();
        let new_refresh = refreshed.refresh.expect("rotation returns a new refresh token");
        assert!(service.verify_access_token(&refreshed.access).is_ok());

        // Replaying the consumed token fails; the rotated one still works
        let err = service.refresh(&pair.refresh).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token is blacklisted"));
        assert!(service.refresh(&new_refresh).await.is_ok());
    }

    #[tokio::test]
    async fn refresh_without_rotation_keeps_the_old_token_valid() {
        let service = service(false);
        let user = make_db_user("alice", None, true);
        let pair = service.issue_pair(&user).unwrap();

        let refreshed = service.refresh(&pair.refresh).await.unwrap();
        assert!(refreshed.refresh.is_none());
        assert!(service.refresh(&pair.refresh).await.is_ok());
    }

    #[tokio::test]
    async fn logout_blacklists_the_refresh_token() {
        let service = service(true);
        let user = make_db_user("alice", Some("admin"), true);
        let pair = service.issue_pair(&user).unwrap();

        service.logout(&pair.refresh).await.unwrap();

        let err = service.logout(&pair.refresh).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token is blacklisted"));
    }
}
