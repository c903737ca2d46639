use serde::{Deserialize, Serialize};
use std::env;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub db_type: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub api_key: String,
}

impl DatabaseConfig {
    pub fn is_sqlite(&self) -> bool {
        self.db_type == "sqlite"
    }
}

impl Config {
    pub fn new() -> AppResult<Self> {
        // Load environment variables
        dotenvy::dotenv().ok();

        let api_key = env::var("API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "Missing required environment variable:\n  API_KEY - Shared secret every request must present".to_string(),
                )
            })?;

        let db_type = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());

        let database = if db_type == "sqlite" {
            DatabaseConfig {
                db_type,
                host: String::new(),
                port: 0,
                username: String::new(),
                password: String::new(),
                name: env::var("DB_NAME").unwrap_or_else(|_| "users.db".to_string()),
                max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
                min_connections: 1,
            }
        } else {
            // Server-backed datastores need the full connection set
            let db_required_vars = [
                ("DB_HOST", "Database host (e.g., localhost, db)"),
                ("DB_PORT", "Database port (e.g., 5432 for PostgreSQL, 3306 for MariaDB)"),
                ("DB_USER", "Database username"),
                ("DB_PASSWORD", "Database password"),
                ("DB_NAME", "Database name"),
            ];

            let missing_db_vars: Vec<String> = db_required_vars
                .iter()
                .filter(|(var_name, _)| env::var(var_name).is_err())
                .map(|(var_name, description)| format!("  {} - {}", var_name, description))
                .collect();

            if !missing_db_vars.is_empty() {
                return Err(AppError::Config(format!(
                    "Missing required database environment variables:\n{}",
                    missing_db_vars.join("\n")
                )));
            }

            let port_str = required_var("DB_PORT")?;
            let port = port_str.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "Invalid DB_PORT '{}': Must be a valid port number (e.g., 5432 for PostgreSQL, 3306 for MariaDB)",
                    port_str
                ))
            })?;

            DatabaseConfig {
                db_type,
                host: required_var("DB_HOST")?,
                port,
                username: required_var("DB_USER")?,
                password: required_var("DB_PASSWORD")?,
                name: required_var("DB_NAME")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
                min_connections: 1,
            }
        };

        let server = ServerConfig {
            port: parse_var("SERVER_PORT", 8787)?,
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        };

        let security = SecurityConfig { api_key };

        Ok(Config {
            database,
            server,
            security,
        })
    }

    pub fn database_url(&self) -> String {
        if self.database.is_sqlite() {
            return format!("sqlite:{}", self.database.name);
        }

        // URL encode username and password to handle special characters
        let encoded_username = urlencoding::encode(&self.database.username);
        let encoded_password = urlencoding::encode(&self.database.password);

        let scheme = match self.database.db_type.as_str() {
            "postgresql" => "postgresql",
            _ => "mysql",
        };

        format!(
            "{}://{}:{}@{}:{}/{}",
            scheme,
            encoded_username,
            encoded_password,
            self.database.host,
            self.database.port,
            self.database.name
        )
    }
}

fn required_var(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Config(format!("Missing required environment variable {}", name)))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid {} '{}'", name, value))),
        Err(_) => Ok(default),
    }
}
