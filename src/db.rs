use std::str::FromStr;

use async_trait::async_trait;
use log::LevelFilter;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};

use crate::{
    config::Config,
    post::model::{Post, PostRepository},
    user::model::{User, UserRepository, UsernameTaken},
};

/// Postgres-backed store.
#[derive(Clone)]
pub struct Database {
    pub db: PgPool,
}

impl Database {
    pub async fn connect(config: &Config) -> Result<Self, anyhow::Error> {
        let mut options = PgConnectOptions::from_str(&config.database_url)?;
        options = if config.debug {
            options.log_statements(LevelFilter::Debug)
        } else {
            options.disable_statement_logging()
        };

        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        log::info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl PostRepository for Database {
    async fn find_posts(&self) -> Result<Vec<Post>, anyhow::Error> {
        let posts = sqlx::query_as::<_, Post>(
            r#"SELECT id, title, created_at, updated_at FROM "post" ORDER BY id"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(posts)
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>, anyhow::Error> {
        let post = sqlx::query_as::<_, Post>(
            r#"SELECT id, title, created_at, updated_at FROM "post" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(post)
    }

    async fn create_post(&self, title: &str) -> Result<Post, anyhow::Error> {
        let mut tx = self.db.begin().await?;
        let post = sqlx::query_as::<_, Post>(
            r#"INSERT INTO "post" (title) VALUES ($1)
                RETURNING id, title, created_at, updated_at"#,
        )
        .bind(title)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(post)
    }

    async fn persist_post(&self, post: &Post) -> Result<Option<Post>, anyhow::Error> {
        let mut tx = self.db.begin().await?;
        let updated = sqlx::query_as::<_, Post>(
            r#"UPDATE "post" SET title = $1, updated_at = now()
                WHERE id = $2
                RETURNING id, title, created_at, updated_at"#,
        )
        .bind(&post.title)
        .bind(post.id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_post(&self, id: i32) -> Result<u64, anyhow::Error> {
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(r#"DELETE FROM "post" WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, password_hash, created_at, updated_at
                FROM "user" WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, anyhow::Error> {
        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO "user" (username, password_hash) VALUES ($1, $2)
                RETURNING id, username, password_hash, created_at, updated_at"#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                anyhow::Error::new(UsernameTaken {
                    username: username.to_owned(),
                })
            }
            e => e.into(),
        })?;
        tx.commit().await?;
        Ok(user)
    }
}
