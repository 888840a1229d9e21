//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::{BootstrapConfig, Config};
use crate::error::{AppError, AppResult};
use shared::models::{LoginInput, RegisterInput, UserSummary, ROLE_ADMIN};

/// bcrypt work factor for stored passwords
pub const PASSWORD_HASH_COST: u32 = 12;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Successful login
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserSummary,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            token_expiry: config.jwt.token_expiry,
        }
    }

    /// Authenticate user with email and password
    pub async fn login(&self, input: &LoginInput) -> AppResult<LoginResult> {
        let (user_id, password_hash, is_active) = sqlx::query_as::<_, (i64, String, bool)>(
            r#"
            SELECT id, password_hash, is_active
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(&input.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !is_active {
            return Err(AppError::InactiveUser);
        }

        if !check_password(&password_hash, &input.password) {
            return Err(AppError::InvalidCredentials);
        }

        let roles = self.get_user_roles(user_id).await?;
        let token = self.issue_token(user_id, &roles)?;

        tracing::info!(user_id, "User logged in");

        Ok(LoginResult {
            token,
            user: UserSummary {
                id: user_id,
                email: input.email.clone(),
                roles,
            },
        })
    }

    /// Create a user and assign its role in one transaction
    pub async fn register(&self, input: &RegisterInput, created_by: Option<i64>) -> AppResult<i64> {
        let password_hash = hash_password(&input.password)?;

        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (name, email, password_hash, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let assigned = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            "#,
        )
        .bind(user_id)
        .bind(&input.role)
        .execute(&mut *tx)
        .await?;

        if assigned.rows_affected() == 0 {
            return Err(AppError::InvalidRole(input.role.clone()));
        }

        tx.commit().await?;

        tracing::info!(user_id, role = %input.role, "User registered");

        Ok(user_id)
    }

    /// Create the configured administrator when no user exists yet
    pub async fn bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<Option<i64>> {
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password)
        else {
            return Ok(None);
        };

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Ok(None);
        }

        let input = RegisterInput {
            name: bootstrap
                .admin_name
                .clone()
                .unwrap_or_else(|| "Administrator".to_string()),
            email: email.clone(),
            password: password.clone(),
            role: ROLE_ADMIN.to_string(),
        };

        self.register(&input, None).await.map(Some)
    }

    /// Get role names of a user
    async fn get_user_roles(&self, user_id: i64) -> AppResult<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }

    /// Sign an access token
    fn issue_token(&self, user_id: i64, roles: &[String]) -> AppResult<String> {
        encode_token(user_id, roles, &self.jwt_secret, self.token_expiry)
    }
}

/// Sign an HS256 access token valid for `expiry_secs`
pub fn encode_token(user_id: i64, roles: &[String], secret: &str, expiry_secs: i64) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        user_id,
        roles: roles.to_vec(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Decode and validate an HS256 access token
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::Unauthorized("invalid token".to_string())
    })
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Compare a password with its stored hash; malformed hashes never match
pub fn check_password(hashed: &str, password: &str) -> bool {
    verify(password, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let roles = vec!["admin".to_string(), "cashier".to_string()];
        let token = encode_token(42, &roles, SECRET, 3600).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.roles, roles);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_with_wrong_secret() {
        let token = encode_token(1, &[], SECRET, 3600).unwrap();
        assert!(matches!(
            decode_token(&token, "other-secret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let token = encode_token(1, &[], SECRET, -3600).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_password_hash_and_check() {
        // Low cost keeps the test fast; the verify path is identical
        let hashed = hash("s3cret-pass", 4).unwrap();
        assert!(check_password(&hashed, "s3cret-pass"));
        assert!(!check_password(&hashed, "wrong-pass"));
        assert!(!check_password("not-a-hash", "s3cret-pass"));
    }
}
