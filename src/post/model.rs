use async_graphql::SimpleObject;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, SimpleObject, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage operations for posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, ordered by id.
    async fn find_posts(&self) -> Result<Vec<Post>, anyhow::Error>;

    async fn find_post(&self, id: i32) -> Result<Option<Post>, anyhow::Error>;

    async fn create_post(&self, title: &str) -> Result<Post, anyhow::Error>;

    /// Writes the post's title back and refreshes `updated_at`. `None` when the
    /// row no longer exists.
    async fn persist_post(&self, post: &Post) -> Result<Option<Post>, anyhow::Error>;

    /// Returns the number of rows removed.
    async fn delete_post(&self, id: i32) -> Result<u64, anyhow::Error>;
}
