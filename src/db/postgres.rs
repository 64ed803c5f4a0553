use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, PgPool};

use super::{AnalysisStore, Store, UserStore};
use crate::error::{AppError, Result};
use crate::models::{
    AnalysisRecord, AnalysisSummary, AnalysisType, DeletedAnalysis, NewAnalysis, NewUser,
    ProfileUpdate, StructuredDocument, User,
};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, company, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, document_name, document_type, analysis_type, industry, \
     frameworks, gaps_found, compliance_score, created_at";

const RECORD_COLUMNS: &str = "id, user_id, document_name, document_type, analysis_type, \
     industry, frameworks, organization_details, analysis_results, gaps_found, \
     compliance_score, created_at";

/// Postgres-backed store. Every statement is parameterized.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations from `./migrations`
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    document_name: String,
    document_type: Option<String>,
    analysis_type: String,
    industry: Option<String>,
    frameworks: Vec<String>,
    gaps_found: i32,
    compliance_score: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for AnalysisSummary {
    type Error = AppError;

    fn try_from(row: SummaryRow) -> Result<Self> {
        Ok(AnalysisSummary {
            id: row.id,
            document_name: row.document_name,
            document_type: row.document_type,
            analysis_type: parse_analysis_type(&row.analysis_type)?,
            industry: row.industry,
            frameworks: row.frameworks,
            gaps_found: row.gaps_found,
            compliance_score: row.compliance_score,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: i64,
    user_id: i64,
    document_name: String,
    document_type: Option<String>,
    analysis_type: String,
    industry: Option<String>,
    frameworks: Vec<String>,
    organization_details: Json<Value>,
    analysis_results: Json<Value>,
    gaps_found: i32,
    compliance_score: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for AnalysisRecord {
    type Error = AppError;

    fn try_from(row: RecordRow) -> Result<Self> {
        let analysis_results = StructuredDocument::new(row.analysis_results.0).ok_or_else(|| {
            AppError::Internal(format!("analysis {} has non-structured results", row.id))
        })?;

        Ok(AnalysisRecord {
            id: row.id,
            user_id: row.user_id,
            document_name: row.document_name,
            document_type: row.document_type,
            analysis_type: parse_analysis_type(&row.analysis_type)?,
            industry: row.industry,
            frameworks: row.frameworks,
            organization_details: StructuredDocument::new(row.organization_details.0)
                .unwrap_or_default(),
            analysis_results,
            gaps_found: row.gaps_found,
            compliance_score: row.compliance_score,
            created_at: row.created_at,
        })
    }
}

fn parse_analysis_type(raw: &str) -> Result<AnalysisType> {
    raw.parse().map_err(AppError::Internal)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, company) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.company)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::UserAlreadyExists
                } else {
                    AppError::Database(e)
                }
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                company = COALESCE($4, company), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.company)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnalysisStore for PgStore {
    async fn insert_analysis(
        &self,
        user_id: i64,
        analysis: NewAnalysis,
    ) -> Result<AnalysisRecord> {
        let sql = format!(
            "INSERT INTO analysis_history (user_id, document_name, document_type, analysis_type, \
                industry, frameworks, organization_details, analysis_results, gaps_found, \
                compliance_score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {RECORD_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(user_id)
            .bind(&analysis.document_name)
            .bind(&analysis.document_type)
            .bind(analysis.analysis_type.as_str())
            .bind(&analysis.industry)
            .bind(&analysis.frameworks)
            .bind(Json(analysis.organization_details.as_value()))
            .bind(Json(analysis.analysis_results.as_value()))
            .bind(analysis.gaps_found)
            .bind(analysis.compliance_score)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::NotFound("User not found")
                } else {
                    AppError::Database(e)
                }
            })?;

        row.try_into()
    }

    async fn list_analyses(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AnalysisSummary>, i64)> {
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS} FROM analysis_history WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM analysis_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let items = rows
            .into_iter()
            .map(AnalysisSummary::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn find_analysis(&self, user_id: i64, id: i64) -> Result<Option<AnalysisRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM analysis_history WHERE id = $1 AND user_id = $2"
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AnalysisRecord::try_from).transpose()
    }

    async fn delete_analysis(&self, user_id: i64, id: i64) -> Result<Option<DeletedAnalysis>> {
        let deleted = sqlx::query_as::<_, DeletedAnalysis>(
            "DELETE FROM analysis_history WHERE id = $1 AND user_id = $2 \
             RETURNING id, document_name",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
