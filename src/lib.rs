//! Compliance analysis history API
//!
//! Account signup/signin with bearer tokens, and a per-user store of
//! document analysis results.

pub mod accounts;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod history;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;

pub use accounts::Accounts;
pub use config::Config;
pub use db::{Db, MemoryStore, PgStore};
pub use error::{AppError, Result};
pub use history::History;
pub use routes::app;

use security::SessionIssuer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub accounts: Accounts,
    pub history: History,
}

impl AppState {
    /// Create a new AppState with the given storage and configuration
    pub fn new(db: Db, config: Config) -> Self {
        let sessions = SessionIssuer::new(&config.jwt_secret, config.token_ttl_hours);
        let accounts = Accounts::new(db.clone(), sessions, config.bcrypt_cost);
        let history = History::new(db.clone(), config.max_page_limit);

        Self {
            db,
            config,
            accounts,
            history,
        }
    }
}
