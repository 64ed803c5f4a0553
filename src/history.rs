//! Per-user analysis history: save, paginated list, detail and delete.

use serde::Deserialize;
use serde_json::Value;

use crate::constants::{
    DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, ERR_ANALYSIS_RESULTS_REQUIRED, ERR_ANALYSIS_RESULTS_SHAPE,
    ERR_COMPLIANCE_SCORE_RANGE, ERR_DOCUMENT_NAME_REQUIRED, ERR_GAPS_FOUND_NEGATIVE,
    ERR_INVALID_PAGINATION, ERR_ORGANIZATION_DETAILS_SHAPE, MAX_COMPLIANCE_SCORE,
};
use crate::db::{AnalysisStore, Db};
use crate::error::{AppError, Result};
use crate::models::{
    AnalysisRecord, AnalysisType, DeletedAnalysis, HistoryPage, NewAnalysis, Pagination,
    SavedAnalysis, StructuredDocument,
};

const ERR_ANALYSIS_NOT_FOUND: &str = "Analysis not found";

/// Body of `POST /api/analysis/save`
#[derive(Debug, Default, Deserialize)]
pub struct SaveAnalysisRequest {
    pub document_name: Option<String>,
    pub document_type: Option<String>,
    pub analysis_type: Option<AnalysisType>,
    pub industry: Option<String>,
    pub frameworks: Option<Vec<String>>,
    pub organization_details: Option<Value>,
    pub analysis_results: Option<Value>,
    pub gaps_found: Option<i32>,
    pub compliance_score: Option<i32>,
}

impl SaveAnalysisRequest {
    /// Check required fields and fill in defaults
    pub fn validate(self) -> Result<NewAnalysis> {
        let document_name = self
            .document_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::validation(ERR_DOCUMENT_NAME_REQUIRED))?;

        let analysis_results = self
            .analysis_results
            .ok_or_else(|| AppError::validation(ERR_ANALYSIS_RESULTS_REQUIRED))?;
        let analysis_results = StructuredDocument::new(analysis_results)
            .filter(|doc| !doc.is_empty())
            .ok_or_else(|| AppError::validation(ERR_ANALYSIS_RESULTS_SHAPE))?;

        let organization_details = match self.organization_details {
            None => StructuredDocument::default(),
            Some(value) => StructuredDocument::new(value)
                .ok_or_else(|| AppError::validation(ERR_ORGANIZATION_DETAILS_SHAPE))?,
        };

        let gaps_found = self.gaps_found.unwrap_or(0);
        if gaps_found < 0 {
            return Err(AppError::validation(ERR_GAPS_FOUND_NEGATIVE));
        }

        let compliance_score = self.compliance_score.unwrap_or(0);
        if !(0..=MAX_COMPLIANCE_SCORE).contains(&compliance_score) {
            return Err(AppError::validation(ERR_COMPLIANCE_SCORE_RANGE));
        }

        Ok(NewAnalysis {
            document_name,
            document_type: self.document_type,
            analysis_type: self.analysis_type.unwrap_or_default(),
            industry: self.industry,
            frameworks: self.frameworks.unwrap_or_default(),
            organization_details,
            analysis_results,
            gaps_found,
            compliance_score,
        })
    }
}

/// Query string of `GET /api/analysis/history`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct History {
    db: Db,
    max_page_limit: i64,
}

impl History {
    pub fn new(db: Db, max_page_limit: i64) -> Self {
        Self { db, max_page_limit }
    }

    pub async fn save(&self, user_id: i64, request: SaveAnalysisRequest) -> Result<SavedAnalysis> {
        let analysis = request.validate()?;
        let record = self.db.insert_analysis(user_id, analysis).await?;

        tracing::info!(
            user_id,
            analysis_id = record.id,
            analysis_type = %record.analysis_type,
            "Analysis saved"
        );

        Ok(SavedAnalysis {
            id: record.id,
            document_name: record.document_name,
            created_at: record.created_at,
        })
    }

    /// One page of the user's history, newest first.
    ///
    /// `limit` is clamped to the configured maximum; a page past the end is empty.
    pub async fn list(&self, user_id: i64, query: HistoryQuery) -> Result<HistoryPage> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page < 1 || limit < 1 {
            return Err(AppError::validation(ERR_INVALID_PAGINATION));
        }
        let limit = limit.min(self.max_page_limit);

        let (history, total) = self
            .db
            .list_analyses(user_id, limit, Pagination::offset(page, limit))
            .await?;

        Ok(HistoryPage {
            history,
            pagination: Pagination::new(page, limit, total),
        })
    }

    /// Records owned by someone else are reported as missing
    pub async fn get(&self, user_id: i64, id: i64) -> Result<AnalysisRecord> {
        self.db
            .find_analysis(user_id, id)
            .await?
            .ok_or(AppError::NotFound(ERR_ANALYSIS_NOT_FOUND))
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<DeletedAnalysis> {
        let deleted = self
            .db
            .delete_analysis(user_id, id)
            .await?
            .ok_or(AppError::NotFound(ERR_ANALYSIS_NOT_FOUND))?;

        tracing::info!(user_id, analysis_id = deleted.id, "Analysis deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, UserStore};
    use crate::models::NewUser;
    use serde_json::json;
    use std::sync::Arc;

    fn request(name: &str) -> SaveAnalysisRequest {
        SaveAnalysisRequest {
            document_name: Some(name.to_string()),
            analysis_results: Some(json!({"summary": "ok"})),
            ..Default::default()
        }
    }

    async fn setup() -> (History, i64, i64) {
        let store = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for email in ["alice@example.com", "bob@example.com"] {
            let user = store
                .insert_user(NewUser {
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                    first_name: None,
                    last_name: None,
                    company: None,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (History::new(store, 100), ids[0], ids[1])
    }

    #[test]
    fn test_validate_applies_defaults() {
        let analysis = request("DPA.pdf").validate().unwrap();
        assert_eq!(analysis.analysis_type, AnalysisType::PolicyAnalysis);
        assert!(analysis.frameworks.is_empty());
        assert_eq!(analysis.organization_details.as_value(), &json!({}));
        assert_eq!(analysis.gaps_found, 0);
        assert_eq!(analysis.compliance_score, 0);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let no_name = SaveAnalysisRequest {
            document_name: Some("  ".to_string()),
            ..request("x")
        };
        assert!(matches!(no_name.validate(), Err(AppError::Validation(_))));

        let no_results = SaveAnalysisRequest {
            analysis_results: None,
            ..request("x.pdf")
        };
        assert!(matches!(no_results.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_primitive_or_empty_results() {
        for value in [json!("ok"), json!(12), json!({}), json!([])] {
            let req = SaveAnalysisRequest {
                analysis_results: Some(value),
                ..request("x.pdf")
            };
            assert!(matches!(req.validate(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_validate_score_bounds() {
        let too_high = SaveAnalysisRequest {
            compliance_score: Some(101),
            ..request("x.pdf")
        };
        assert!(too_high.validate().is_err());

        let negative_gaps = SaveAnalysisRequest {
            gaps_found: Some(-1),
            ..request("x.pdf")
        };
        assert!(negative_gaps.validate().is_err());

        let edge = SaveAnalysisRequest {
            compliance_score: Some(100),
            ..request("x.pdf")
        };
        assert_eq!(edge.validate().unwrap().compliance_score, 100);
    }

    #[tokio::test]
    async fn test_save_then_get_roundtrips_results() {
        let (history, alice, _) = setup().await;
        let results = json!({
            "summary": "Mostly compliant",
            "gaps": [{"article": "32", "severity": "high"}],
            "scores": {"overall": 73, "weights": [0.5, 1.25e-3]},
            "notes": null
        });

        let saved = history
            .save(
                alice,
                SaveAnalysisRequest {
                    analysis_results: Some(results.clone()),
                    analysis_type: Some(AnalysisType::RiskAssessment),
                    frameworks: Some(vec!["GDPR".into(), "HIPAA".into()]),
                    ..request("DPA.pdf")
                },
            )
            .await
            .unwrap();

        let record = history.get(alice, saved.id).await.unwrap();
        assert_eq!(record.analysis_results.as_value(), &results);
        assert_eq!(record.analysis_type, AnalysisType::RiskAssessment);
        assert_eq!(record.frameworks, vec!["GDPR", "HIPAA"]);
        assert_eq!(record.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_other_users_records_are_not_found() {
        let (history, alice, bob) = setup().await;
        let saved = history.save(alice, request("DPA.pdf")).await.unwrap();

        assert!(matches!(
            history.get(bob, saved.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            history.delete(bob, saved.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(history.get(alice, saved.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_pagination_bounds() {
        let (history, alice, _) = setup().await;
        for i in 0..7 {
            history
                .save(alice, request(&format!("doc-{i}.pdf")))
                .await
                .unwrap();
        }

        let last = history
            .list(alice, HistoryQuery { page: Some(3), limit: Some(3) })
            .await
            .unwrap();
        assert_eq!(last.pagination, Pagination::new(3, 3, 7));
        assert_eq!(last.pagination.pages, 3);
        assert_eq!(last.history.len(), 1);
        assert_eq!(last.history[0].document_name, "doc-0.pdf");

        let beyond = history
            .list(alice, HistoryQuery { page: Some(4), limit: Some(3) })
            .await
            .unwrap();
        assert!(beyond.history.is_empty());
        assert_eq!(beyond.pagination.pages, 3);
    }

    #[tokio::test]
    async fn test_list_defaults_and_clamp() {
        let (history, alice, _) = setup().await;
        history.save(alice, request("a.pdf")).await.unwrap();

        let page = history.list(alice, HistoryQuery::default()).await.unwrap();
        assert_eq!(page.pagination, Pagination::new(1, 10, 1));

        let clamped = history
            .list(alice, HistoryQuery { page: None, limit: Some(5000) })
            .await
            .unwrap();
        assert_eq!(clamped.pagination.limit, 100);

        let invalid = history
            .list(alice, HistoryQuery { page: Some(0), limit: None })
            .await;
        assert!(matches!(invalid, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (history, alice, _) = setup().await;
        let saved = history.save(alice, request("DPA.pdf")).await.unwrap();

        let deleted = history.delete(alice, saved.id).await.unwrap();
        assert_eq!(deleted.id, saved.id);
        assert_eq!(deleted.document_name, "DPA.pdf");
        assert!(matches!(
            history.get(alice, saved.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
