use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;

use crate::{
    post::model::{Post, PostRepository},
    user::model::{User, UserRepository, UsernameTaken},
};

#[derive(Default)]
struct Tables {
    posts: BTreeMap<i32, Post>,
    users: BTreeMap<i32, User>,
    last_post_id: i32,
    last_user_id: i32,
}

/// Keeps everything in process memory. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, anyhow::Error> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_posts(&self) -> Result<Vec<Post>, anyhow::Error> {
        Ok(self.tables()?.posts.values().cloned().collect())
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>, anyhow::Error> {
        Ok(self.tables()?.posts.get(&id).cloned())
    }

    async fn create_post(&self, title: &str) -> Result<Post, anyhow::Error> {
        let mut tables = self.tables()?;
        tables.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: tables.last_post_id,
            title: title.to_owned(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn persist_post(&self, post: &Post) -> Result<Option<Post>, anyhow::Error> {
        let mut tables = self.tables()?;
        let Some(stored) = tables.posts.get_mut(&post.id) else {
            return Ok(None);
        };
        stored.title = post.title.clone();
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_post(&self, id: i32) -> Result<u64, anyhow::Error> {
        let removed = self.tables()?.posts.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error> {
        let tables = self.tables()?;
        let user = tables.users.values().find(|u| u.username == username);
        Ok(user.cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, anyhow::Error> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.username == username) {
            return Err(UsernameTaken {
                username: username.to_owned(),
            }
            .into());
        }
        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}
