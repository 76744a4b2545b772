use std::env;

use anyhow::Context;

/// Runtime settings, read from the process environment (after `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Log every SQL statement at debug level.
    pub debug: bool,
    pub cors_origin: Option<String>,
    pub session_secret: Option<String>,
    /// Write the authenticated user id into the session on login.
    pub persist_login_session: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4000,
            database_url: database_url_from_parts("postgres", "", "localhost", "lireddit"),
            max_connections: 5,
            debug: true,
            cors_origin: None,
            session_secret: None,
            persist_login_session: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests don't
    /// have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {port}"))?,
            None => defaults.port,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(max) => max
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {max}"))?,
            None => defaults.max_connections,
        };

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(
                &lookup("POSTGRES_USER").unwrap_or_else(|| "postgres".to_owned()),
                &lookup("POSTGRES_PASSWORD").unwrap_or_default(),
                &lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_owned()),
                &lookup("POSTGRES_DB").unwrap_or_else(|| "lireddit".to_owned()),
            ),
        };

        let persist_login_session = match lookup("SESSION_LOGIN") {
            Some(flag) => parse_flag(&flag)
                .with_context(|| format!("SESSION_LOGIN must be true or false, got {flag}"))?,
            None => defaults.persist_login_session,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            database_url,
            max_connections,
            debug: lookup("APP_ENV").as_deref() != Some("production"),
            cors_origin: lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty()),
            session_secret: lookup("SESSION_SECRET").filter(|secret| !secret.is_empty()),
            persist_login_session,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn database_url_from_parts(user: &str, password: &str, host: &str, db_name: &str) -> String {
    if password.is_empty() {
        format!("postgres://{user}@{host}/{db_name}")
    } else {
        format!("postgres://{user}:{password}@{host}/{db_name}")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
