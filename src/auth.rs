//! Credentials and tokens.
//!
//! Passwords are stored as Argon2 PHC strings. Access tokens are HS256
//! JWTs carrying the user id, role and a `jti` that logout deny-lists.
//! Refresh tokens are opaque random strings, stored only as SHA-256
//! hashes and rotated on every use.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts;
use crate::config::AppConfig;
use crate::db::{self, with_transaction};
use crate::error::{ServiceError, ServiceResult};
use crate::models::enums::UserRole;
use crate::models::Account;
use crate::validation;

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Token encoding failed: {0}")]
    Encoding(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token revoked")]
    TokenRevoked,
    #[error("Account no longer exists")]
    UnknownAccount,
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PasswordHash(_) | AuthError::Encoding(_) => ServiceError::Internal(err.to_string()),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

/// Signing material and lifetimes, derived from [`AppConfig`].
#[derive(Clone)]
pub struct TokenSettings {
    secret: Vec<u8>,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl TokenSettings {
    pub fn new(secret: impl Into<Vec<u8>>, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes().to_vec(),
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// ── Passwords ──

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHash(e.to_string())),
    }
}

// ── Tokens ──

/// SHA-256 of a refresh token, hex encoded for storage.
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest: [u8; 32] = Sha256::digest(token.as_bytes()).into();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Random refresh token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn issue_access_token(settings: &TokenSettings, user_id: i64, role: UserRole) -> Result<(String, Claims), AuthError> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        iat,
        exp: iat + settings.access_ttl_secs,
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&settings.secret),
    )
    .map_err(|e| AuthError::Encoding(e.to_string()))?;
    Ok((token, claims))
}

/// Check signature and expiry. Revocation is checked by [`authenticate`].
pub fn decode_access_token(settings: &TokenSettings, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(&settings.secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
}

/// Validate a bearer token, including the logout deny-list.
///
/// The account must still exist, and the returned claims carry its stored
/// role rather than the one signed into the token.
pub fn authenticate(conn: &Connection, settings: &TokenSettings, token: &str) -> ServiceResult<Claims> {
    let mut claims = decode_access_token(settings, token)?;
    if db::is_jti_revoked(conn, &claims.jti)? {
        return Err(AuthError::TokenRevoked.into());
    }
    let user = db::get_user(conn, claims.sub)?.ok_or(AuthError::UnknownAccount)?;
    claims.role = user.role;
    Ok(claims)
}

// ── Flows ──

pub fn login(conn: &Connection, settings: &TokenSettings, req: &LoginRequest) -> ServiceResult<TokenPair> {
    let email = req.email.trim().to_lowercase();
    let Some(user) = db::get_user_by_email(conn, &email)? else {
        tracing::warn!("Login rejected: unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login rejected: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }
    let pair = issue_pair(conn, settings, user.id)?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(pair)
}

/// Exchange a refresh token for a new pair. The presented token is consumed.
pub fn refresh(conn: &Connection, settings: &TokenSettings, req: &RefreshRequest) -> ServiceResult<TokenPair> {
    let now = Utc::now().timestamp();
    let hash = hash_token(req.refresh_token.trim());
    with_transaction(conn, |tx| -> ServiceResult<TokenPair> {
        let user_id = db::take_refresh_token(tx, &hash, now)?
            .ok_or(AuthError::InvalidToken)?;
        let pair = issue_pair(tx, settings, user_id)?;
        tracing::info!(user_id, "Refresh token rotated");
        Ok(pair)
    })
}

/// Deny-list the presented access token and drop every refresh token of its user.
pub fn logout(conn: &Connection, claims: &Claims) -> ServiceResult<()> {
    with_transaction(conn, |tx| -> ServiceResult<()> {
        db::revoke_jti(tx, &claims.jti, claims.exp)?;
        db::delete_refresh_tokens_for_user(tx, claims.sub)?;
        db::prune_expired_tokens(tx, Utc::now().timestamp())?;
        Ok(())
    })?;
    tracing::info!(user_id = claims.sub, "User logged out");
    Ok(())
}

/// Replace the password and drop every refresh token of the user.
///
/// Access tokens already issued stay valid until they expire; callers that
/// need the current session gone as well follow up with [`logout`].
pub fn change_password(conn: &Connection, user_id: i64, req: &ChangePasswordRequest) -> ServiceResult<()> {
    let user = db::require_user(conn, user_id)?;
    if !verify_password(&req.current_password, &user.password_hash)? {
        return Err(ServiceError::Unauthorized("Current password is incorrect".into()));
    }
    if req.new_password != req.confirm_password {
        return Err(ServiceError::InvalidInput(
            "confirm_password does not match new_password".into(),
        ));
    }
    validation::password(&req.new_password)?;

    let hash = hash_password(&req.new_password)?;
    with_transaction(conn, |tx| -> ServiceResult<()> {
        db::update_password_hash(tx, user_id, &hash)?;
        db::delete_refresh_tokens_for_user(tx, user_id)?;
        Ok(())
    })?;
    tracing::info!(user_id, "Password changed");
    Ok(())
}

fn issue_pair(conn: &Connection, settings: &TokenSettings, user_id: i64) -> ServiceResult<TokenPair> {
    let account = accounts::account_for(conn, user_id)?;
    let (access_token, _) = issue_access_token(settings, user_id, account.user.role)?;
    let refresh_token = generate_token();
    db::insert_refresh_token(
        conn,
        &hash_token(&refresh_token),
        user_id,
        Utc::now().timestamp() + settings.refresh_ttl_secs,
    )?;
    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: TOKEN_TYPE,
        expires_in: settings.access_ttl_secs,
        user: account,
    })
}
