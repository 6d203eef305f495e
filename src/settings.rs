use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::server::pagination::QUESTIONS_PER_PAGE;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub api: ApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub questions_per_page: usize,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Defaults, then `trivia.toml` (or `$TRIVIA_CONFIG`), then `TRIVIA__*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let file = dotenv::var("TRIVIA_CONFIG").unwrap_or_else(|_| "trivia".to_owned());
        Self::builder()?
            .add_source(File::with_name(&file).required(false))
            .add_source(
                Environment::with_prefix("TRIVIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("database.path", "trivia.db")?
            .set_default("api.questions_per_page", QUESTIONS_PER_PAGE as i64)
    }
}
