//! # Authentication
//!
//! Local accounts with email confirmation and revocable sessions.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Account Lifecycle                                │
//! │                                                                         │
//! │  sign_up(email, password, profile)                                      │
//! │       │  argon2 hash, verification token                                │
//! │       ▼                                                                 │
//! │  PendingVerification ──► confirm_email(token) ──► verified              │
//! │                                                      │                  │
//! │                                   sign_in(email, pw) ▼                  │
//! │                               JWT (jti) + sessions row ──► Session      │
//! │                                                      │                  │
//! │                                   sign_out(session)  ▼                  │
//! │                                   sessions.revoked_at = now             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`Session`] carries the signed token and its expiry. The gateway only
//! checks expiry; revocation is checked here by [`AuthService::current_user`].

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pembukuan_core::validation::{normalize_optional, validate_email, validate_password};
use pembukuan_core::Session;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::error::AuthError;

// =============================================================================
// Types
// =============================================================================

/// A signed-up account, without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub business_name: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Optional profile fields collected at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpProfile {
    pub display_name: Option<String>,
    pub business_name: Option<String>,
}

/// Sign-up succeeded; the account stays locked until the token is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    pub email: String,
    /// Delivered to the user out of band (confirmation link).
    pub verification_token: String,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    business_name: Option<String>,
    email_verified: bool,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, AuthError> {
        Ok(User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            business_name: self.business_name,
            email_verified: self.email_verified,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AuthError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AuthError::Database(pembukuan_db::DbError::Decode(e.to_string())))
}

// =============================================================================
// JWT
// =============================================================================

/// Access token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID, the key of the sessions row
    pub jti: String,
}

/// Signs and checks access tokens.
///
/// Expiry is checked against the caller's clock rather than the system
/// time, so tests can pin "now".
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Issues a token for `user_id` valid from `now`.
    pub fn issue(&self, user_id: i64, email: &str, now: DateTime<Utc>) -> Result<(String, Claims), AuthError> {
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(format!("Failed to generate token: {}", e)))?;

        Ok((token, claims))
    }

    /// Checks the signature and that the token has not expired at `now`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?
        .claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Unauthorized("session expired".to_string()));
        }

        Ok(claims)
    }
}

// =============================================================================
// Auth Service
// =============================================================================

/// The sign-in collaborator used by the dashboard.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<PendingVerification, AuthError>;

    /// Marks the account holding `token` as verified.
    async fn confirm_email(&self, token: &str) -> Result<(), AuthError>;

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;

    /// The signed-in user, or `None` if the session is invalid, expired or
    /// signed out.
    async fn current_user(&self, session: &Session) -> Result<Option<User>, AuthError>;
}

/// Accounts and sessions in the local SQLite database.
pub struct LocalAuth {
    pool: SqlitePool,
    jwt: JwtManager,
    clock: Arc<dyn Clock>,
}

impl LocalAuth {
    pub fn new(pool: SqlitePool, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        LocalAuth {
            pool,
            jwt: JwtManager::new(config.jwt_secret.clone(), config.session_lifetime_secs),
            clock,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, display_name, business_name, email_verified, created_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AuthError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl AuthService for LocalAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = validate_email(email)?;

        let Some(user) = self.find_by_email(&email).await? else {
            warn!(email = %email, "Sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let now = self.clock.now();
        let (token, claims) = self.jwt.issue(user.id, &user.email, now)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken("expiry out of range".to_string()))?;

        sqlx::query(
            "INSERT INTO sessions (token_id, user_id, issued_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&claims.jti)
        .bind(user.id)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(user_id = user.id, "Signed in");

        Ok(Session {
            user_id: user.id,
            email: user.email,
            access_token: token,
            expires_at,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<PendingVerification, AuthError> {
        let email = validate_email(email)?;
        validate_password(password)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken(email));
        }

        let password_hash = hash_password(password)?;
        let verification_token = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO users (email, password_hash, display_name, business_name, email_verified, verification_token, created_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(normalize_optional(profile.display_name.as_deref()))
        .bind(normalize_optional(profile.business_name.as_deref()))
        .bind(&verification_token)
        .bind(self.clock.now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(email = %email, "Account created, awaiting confirmation");

        Ok(PendingVerification {
            email,
            verification_token,
        })
    }

    async fn confirm_email(&self, token: &str) -> Result<(), AuthError> {
        let result = sqlx::query(
            "UPDATE users SET email_verified = 1, verification_token = NULL WHERE verification_token = ?",
        )
        .bind(token.trim())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::InvalidToken("unknown verification token".to_string()));
        }

        debug!("Email confirmed");
        Ok(())
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        // An expired token can still be signed out
        let claims = decode::<Claims>(
            &session.access_token,
            &DecodingKey::from_secret(self.jwt.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?
        .claims;

        sqlx::query("UPDATE sessions SET revoked_at = ? WHERE token_id = ? AND revoked_at IS NULL")
            .bind(self.clock.now().to_rfc3339())
            .bind(&claims.jti)
            .execute(&self.pool)
            .await?;

        info!(user_id = session.user_id, "Signed out");
        Ok(())
    }

    async fn current_user(&self, session: &Session) -> Result<Option<User>, AuthError> {
        let claims = match self.jwt.validate(&session.access_token, self.clock.now()) {
            Ok(claims) => claims,
            Err(AuthError::InvalidToken(_)) | Err(AuthError::Unauthorized(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let active: Option<(String,)> = sqlx::query_as(
            "SELECT token_id FROM sessions WHERE token_id = ? AND revoked_at IS NULL",
        )
        .bind(&claims.jti)
        .fetch_optional(&self.pool)
        .await?;

        if active.is_none() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, display_name, business_name, email_verified, created_at
             FROM users WHERE id = ?",
        )
        .bind(session.user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
