use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::anyhow;
use async_graphql::{Request, Variables};
use async_trait::async_trait;
use lireddit_server::{
    config::Config,
    context::{RequestContext, SessionStore},
    graphql::{get_schema, LiredditSchema},
    memory::MemoryStore,
    post::model::{Post, PostRepository},
    user::model::{User, UserRepository},
};
use serde_json::{json, Value};

pub struct TestStore {
    pub store: Arc<MemoryStore>,
}

impl TestStore {
    pub fn new() -> Self {
        TestStore {
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn get_schema_for_tests(&self, config: Config) -> LiredditSchema {
        get_schema(self.store.clone(), config)
    }
}

/// Runs `request` and returns its data, failing the test on any GraphQL error.
pub async fn execute(schema: &LiredditSchema, request: impl Into<Request>) -> Value {
    let response = schema.execute(request).await;
    if response.is_err() {
        panic!("Error executing request: {:?}", response.errors);
    }
    response
        .data
        .into_json()
        .expect("Something went wrong parsing the response")
}

fn with_variables(query: &str, variables: Value) -> Request {
    Request::new(query).variables(Variables::from_json(variables))
}

pub fn create_post(title: &str) -> Request {
    with_variables(
        r#"mutation CreatePost($title: String!) {
            createPost(title: $title) {
                id,
                title,
                createdAt,
                updatedAt
            }
        }"#,
        json!({ "title": title }),
    )
}

pub fn get_post(id: i64) -> Request {
    with_variables(
        r#"query GetPost($id: Int!) {
            getPost(id: $id) {
                id,
                title
            }
        }"#,
        json!({ "id": id }),
    )
}

pub fn update_post(id: i64, title: &str) -> Request {
    with_variables(
        r#"mutation UpdatePost($id: Int!, $title: String!) {
            updatePost(id: $id, title: $title) {
                id,
                title
            }
        }"#,
        json!({ "id": id, "title": title }),
    )
}

pub fn delete_post(id: i64) -> Request {
    with_variables(
        r#"mutation DeletePost($id: Int!) {
            deletePost(id: $id)
        }"#,
        json!({ "id": id }),
    )
}

pub fn register(username: &str, password: &str) -> Request {
    user_mutation("register", username, password)
}

pub fn login(username: &str, password: &str) -> Request {
    user_mutation("login", username, password)
}

fn user_mutation(name: &str, username: &str, password: &str) -> Request {
    let query = format!(
        r#"mutation ($options: UsernamePasswordInput!) {{
            {}(options: $options) {{
                errors {{
                    field,
                    message
                }}
                user {{
                    id,
                    username
                }}
            }}
        }}"#,
        name
    );
    with_variables(
        &query,
        json!({ "options": { "username": username, "password": password } }),
    )
}

/// Session that just remembers what was written to it.
#[derive(Default)]
pub struct RecordingSession {
    pub values: Mutex<HashMap<String, String>>,
}

impl SessionStore for RecordingSession {
    fn set(&self, key: &str, value: String) {
        self.values.lock().unwrap().insert(key.to_owned(), value);
    }
}

pub fn with_session(request: Request, session: Arc<RecordingSession>) -> Request {
    request.data(RequestContext::new(session))
}

/// Store whose every operation fails, as if the database were unreachable.
pub struct BrokenStore;

#[async_trait]
impl PostRepository for BrokenStore {
    async fn find_posts(&self) -> Result<Vec<Post>, anyhow::Error> {
        Err(anyhow!("connection refused: postgres://secret@db"))
    }

    async fn find_post(&self, _id: i32) -> Result<Option<Post>, anyhow::Error> {
        Err(anyhow!("connection refused: postgres://secret@db"))
    }

    async fn create_post(&self, _title: &str) -> Result<Post, anyhow::Error> {
        Err(anyhow!("connection refused: postgres://secret@db"))
    }

    async fn persist_post(&self, _post: &Post) -> Result<Option<Post>, anyhow::Error> {
        Err(anyhow!("connection refused: postgres://secret@db"))
    }

    async fn delete_post(&self, _id: i32) -> Result<u64, anyhow::Error> {
        Err(anyhow!("foreign key violation"))
    }
}

#[async_trait]
impl UserRepository for BrokenStore {
    async fn find_user_by_username(&self, _username: &str) -> Result<Option<User>, anyhow::Error> {
        Err(anyhow!("connection refused: postgres://secret@db"))
    }

    async fn create_user(&self, _username: &str, _password_hash: &str) -> Result<User, anyhow::Error> {
        Err(anyhow!("connection refused: postgres://secret@db"))
    }
}
