//! User account models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Role allowed to manage user accounts
pub const ROLE_ADMIN: &str = "admin";

/// Role for counter staff
pub const ROLE_CASHIER: &str = "cashier";

/// Login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Input for creating a user account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    /// Role name, e.g. `admin` or `cashier`
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

/// Public view of a logged-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub roles: Vec<String>,
}
