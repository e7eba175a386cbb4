use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored account record. Carries the password hash, so it is never
/// serialized directly; responses go through [`UserResponse`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Bookmark record, owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub user_id: i32,
}

/// Signup and login payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(email(message = "email must be an email"))]
    pub email: String,

    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

/// Partial profile update. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "email must be an email"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookmarkRequest {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(url(message = "link must be a URL"))]
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EditBookmarkRequest {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(url(message = "link must be a URL"))]
    pub link: Option<String>,
}

/// Issued bearer credential
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// User data for responses (without the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
