use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AnalysisStore, Store, UserStore};
use crate::error::{AppError, Result};
use crate::models::{
    AnalysisRecord, AnalysisSummary, DeletedAnalysis, NewAnalysis, NewUser, ProfileUpdate, User,
};

/// In-process store for tests and database-less development.
/// Mirrors the Postgres schema rules: unique emails and cascading user deletes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    analyses: BTreeMap<i64, AnalysisRecord>,
    next_user_id: i64,
    next_analysis_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.inner.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::UserAlreadyExists);
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let record = User {
            id: tables.next_user_id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            company: user.company,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut tables = self.inner.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        update.apply(user, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        let mut tables = self.inner.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.analyses.retain(|_, record| record.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn insert_analysis(
        &self,
        user_id: i64,
        analysis: NewAnalysis,
    ) -> Result<AnalysisRecord> {
        let mut tables = self.inner.write().await;

        // Foreign key on analysis_history.user_id
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::NotFound("User not found"));
        }

        tables.next_analysis_id += 1;
        let record = AnalysisRecord {
            id: tables.next_analysis_id,
            user_id,
            document_name: analysis.document_name,
            document_type: analysis.document_type,
            analysis_type: analysis.analysis_type,
            industry: analysis.industry,
            frameworks: analysis.frameworks,
            organization_details: analysis.organization_details,
            analysis_results: analysis.analysis_results,
            gaps_found: analysis.gaps_found,
            compliance_score: analysis.compliance_score,
            created_at: Utc::now(),
        };
        tables.analyses.insert(record.id, record.clone());

        Ok(record)
    }

    async fn list_analyses(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AnalysisSummary>, i64)> {
        let tables = self.inner.read().await;

        let mut owned: Vec<&AnalysisRecord> = tables
            .analyses
            .values()
            .filter(|record| record.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = owned.len() as i64;
        let items = owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(AnalysisRecord::summary)
            .collect();

        Ok((items, total))
    }

    async fn find_analysis(&self, user_id: i64, id: i64) -> Result<Option<AnalysisRecord>> {
        let tables = self.inner.read().await;
        Ok(tables
            .analyses
            .get(&id)
            .filter(|record| record.user_id == user_id)
            .cloned())
    }

    async fn delete_analysis(&self, user_id: i64, id: i64) -> Result<Option<DeletedAnalysis>> {
        let mut tables = self.inner.write().await;

        let owned = tables
            .analyses
            .get(&id)
            .is_some_and(|record| record.user_id == user_id);
        if !owned {
            return Ok(None);
        }

        Ok(tables.analyses.remove(&id).map(|record| DeletedAnalysis {
            id: record.id,
            document_name: record.document_name,
        }))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
