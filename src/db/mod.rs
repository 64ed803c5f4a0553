pub mod memory;
pub mod pool;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AnalysisRecord, AnalysisSummary, DeletedAnalysis, NewAnalysis, NewUser, ProfileUpdate, User,
};

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use postgres::PgStore;

/// Shared storage handle (Arc-wrapped for sharing across handlers)
pub type Db = Arc<dyn Store>;

/// Persisted user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `UserAlreadyExists` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    /// Exact, case-sensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Apply a partial profile update and refresh `updated_at`
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<Option<User>>;

    /// Remove a user and, by cascade, every analysis they own
    async fn delete_user(&self, id: i64) -> Result<bool>;
}

/// Persisted analysis history. Every operation is scoped to the owning user.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert_analysis(&self, user_id: i64, analysis: NewAnalysis)
        -> Result<AnalysisRecord>;

    /// Newest first (`created_at DESC, id DESC`), with the owner's total count
    async fn list_analyses(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AnalysisSummary>, i64)>;

    async fn find_analysis(&self, user_id: i64, id: i64) -> Result<Option<AnalysisRecord>>;

    async fn delete_analysis(&self, user_id: i64, id: i64) -> Result<Option<DeletedAnalysis>>;
}

#[async_trait]
pub trait Store: UserStore + AnalysisStore {
    /// Cheap connectivity check for the health endpoint
    async fn ping(&self) -> Result<()>;
}
