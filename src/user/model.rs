use std::fmt;

use async_graphql::{InputObject, Object, SimpleObject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::FieldError;

pub const MIN_USERNAME_LEN: usize = 5;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, FromRow, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Argon2 PHC string, never exposed through GraphQL.
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[Object]
impl User {
    pub async fn id(&self) -> i32 {
        self.id
    }

    pub async fn username(&self) -> String {
        self.username.to_owned()
    }

    pub async fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, InputObject)]
pub struct UsernamePasswordInput {
    pub username: String,
    pub password: String,
}

impl UsernamePasswordInput {
    /// First failing rule wins, username before password.
    pub fn validate(&self) -> Option<FieldError> {
        if self.username.chars().count() < MIN_USERNAME_LEN {
            return Some(FieldError::new(
                "username",
                format!("Username must be at least {MIN_USERNAME_LEN} characters"),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Some(FieldError::new(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        None
    }
}

/// Either a user or the errors explaining why there isn't one.
#[derive(SimpleObject, Default)]
pub struct UserResponse {
    pub errors: Option<Vec<FieldError>>,
    pub user: Option<User>,
}

impl UserResponse {
    pub fn from_user(user: User) -> Self {
        Self {
            errors: None,
            user: Some(user),
        }
    }

    pub fn from_error(error: FieldError) -> Self {
        Self {
            errors: Some(vec![error]),
            user: None,
        }
    }
}

/// Raised by `UserRepository::create_user` when the username is already stored.
#[derive(Debug)]
pub struct UsernameTaken {
    pub username: String,
}

impl fmt::Display for UsernameTaken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "username {} already exists", self.username)
    }
}

impl std::error::Error for UsernameTaken {}

/// Storage operations for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error>;

    /// Fails with a [`UsernameTaken`] error when `username` exists.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, anyhow::Error>;
}
