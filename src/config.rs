use std::env;

use crate::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_MAX_PAGE_LIMIT, DEFAULT_TOKEN_TTL_HOURS, MAX_BCRYPT_COST,
    MIN_BCRYPT_COST,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Postgres connection string. `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub max_page_limit: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| "Invalid DATABASE_MAX_CONNECTIONS")?;

        let allowed_origins = parse_origins(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set for token signing")?;
        if jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET must not be empty".to_string());
        }

        let token_ttl_hours: i64 = env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_HOURS.to_string())
            .parse()
            .map_err(|_| "Invalid TOKEN_TTL_HOURS")?;
        if token_ttl_hours <= 0 {
            return Err("TOKEN_TTL_HOURS must be positive".to_string());
        }

        let bcrypt_cost: u32 = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| DEFAULT_BCRYPT_COST.to_string())
            .parse()
            .map_err(|_| "Invalid BCRYPT_COST")?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(format!(
                "BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            ));
        }

        let max_page_limit: i64 = env::var("MAX_PAGE_LIMIT")
            .unwrap_or_else(|_| DEFAULT_MAX_PAGE_LIMIT.to_string())
            .parse()
            .map_err(|_| "Invalid MAX_PAGE_LIMIT")?;
        if max_page_limit < 1 {
            return Err("MAX_PAGE_LIMIT must be at least 1".to_string());
        }

        Ok(Config {
            server_host,
            server_port,
            database_url,
            database_max_connections,
            allowed_origins,
            environment,
            jwt_secret,
            token_ttl_hours,
            bcrypt_cost,
            max_page_limit,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_server_address() {
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 3001,
            database_url: None,
            database_max_connections: 10,
            allowed_origins: vec![],
            environment: "test".to_string(),
            jwt_secret: "secret".to_string(),
            token_ttl_hours: 24,
            bcrypt_cost: 4,
            max_page_limit: 100,
        };
        assert_eq!(config.server_address(), "127.0.0.1:3001");
    }
}
