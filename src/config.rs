use std::env;

use crate::codes::DEFAULT_ITEM_CODE_PREFIX;
use crate::services::WorkflowSettings;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub item_code_prefix: String,
    pub item_code_attempts: u32,
    pub max_batch_size: i64,
    pub maintenance_enabled: bool,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();

        Self::from_source(|key| env::var(key))
    }

    fn from_source<F>(var: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let flag = |key: &str, default: bool| {
            var(key)
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(default)
        };

        Ok(Config {
            database_url: var("DATABASE_URL")?,
            server_host: var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: var("SERVER_PORT")
                .unwrap_or_else(|_| "50051".to_string())
                .parse()
                .unwrap_or(50051),
            item_code_prefix: var("ITEM_CODE_PREFIX")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ITEM_CODE_PREFIX.to_string()),
            item_code_attempts: var("ITEM_CODE_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(3),
            max_batch_size: var("MAX_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(500),
            maintenance_enabled: flag("MAINTENANCE_ENABLED", true),
            run_migrations: flag("RUN_MIGRATIONS", false),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            item_code_prefix: self.item_code_prefix.clone(),
            item_code_attempts: self.item_code_attempts,
            max_batch_size: self.max_batch_size,
        }
    }
}
