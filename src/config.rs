use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Connection settings for a MongoDB deployment
#[derive(Clone, Debug)]
pub struct MongoDriverOptions {
    pub database: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub app_name: Option<String>,
    pub server_selection_timeout: Option<Duration>,
}

impl MongoDriverOptions {
    pub fn new(
        database: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            app_name: None,
            server_selection_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port = match env::var("MONGO_PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MONGO_PORT must be a port number, got '{}'", raw))?,
            Err(_) => 27017,
        };

        Ok(MongoDriverOptions {
            database: env::var("MONGO_DATABASE")
                .unwrap_or_else(|_| "app".to_string()),
            host: env::var("MONGO_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            port,
            username: env::var("MONGO_USERNAME")
                .unwrap_or_else(|_| "root".to_string()),
            password: env::var("MONGO_PASSWORD")
                .unwrap_or_else(|_| "example".to_string()),
            app_name: env::var("MONGO_APP_NAME").ok(),
            server_selection_timeout: env::var("MONGO_SERVER_SELECTION_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis),
        })
    }

    /// Connection string handed to the driver.
    ///
    /// Credentials are interpolated as-is: reserved URI characters in the
    /// username or password are not escaped and will malform the string.
    pub fn mongo_uri(&self) -> String {
        format!(
            "mongodb://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }

    /// Same as [`mongo_uri`](Self::mongo_uri) with the password masked, for logs
    pub fn redacted_uri(&self) -> String {
        format!("mongodb://{}:***@{}:{}", self.username, self.host, self.port)
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }
}
