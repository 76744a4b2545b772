use std::fmt;

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// A validation or authentication failure tied to one input field.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub const INTERNAL_ERROR: &str = "internal server error";

/// Logs the full cause chain and hands the client an opaque error instead.
pub fn internal(err: anyhow::Error) -> async_graphql::Error {
    log::error!("{err:#}");
    async_graphql::Error::new(INTERNAL_ERROR)
}
