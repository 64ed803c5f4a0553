use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two kinds of analysis that share the history table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    PolicyAnalysis,
    RiskAssessment,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::PolicyAnalysis => "policy_analysis",
            AnalysisType::RiskAssessment => "risk_assessment",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "policy_analysis" => Ok(AnalysisType::PolicyAnalysis),
            "risk_assessment" => Ok(AnalysisType::RiskAssessment),
            other => Err(format!("Unknown analysis type: {}", other)),
        }
    }
}

/// Opaque JSON document stored verbatim.
///
/// Only objects and arrays are accepted; the internal shape is never inspected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StructuredDocument(Value);

impl StructuredDocument {
    /// Wrap a value, rejecting null and primitives
    pub fn new(value: Value) -> Option<Self> {
        match value {
            Value::Object(_) | Value::Array(_) => Some(Self(value)),
            _ => None,
        }
    }

    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => true,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Default for StructuredDocument {
    fn default() -> Self {
        Self::empty_object()
    }
}

/// A validated analysis ready to be stored
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub document_name: String,
    pub document_type: Option<String>,
    pub analysis_type: AnalysisType,
    pub industry: Option<String>,
    pub frameworks: Vec<String>,
    pub organization_details: StructuredDocument,
    pub analysis_results: StructuredDocument,
    pub gaps_found: i32,
    pub compliance_score: i32,
}

/// Full analysis record, as returned by the detail endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub user_id: i64,
    pub document_name: String,
    pub document_type: Option<String>,
    pub analysis_type: AnalysisType,
    pub industry: Option<String>,
    pub frameworks: Vec<String>,
    pub organization_details: StructuredDocument,
    pub analysis_results: StructuredDocument,
    pub gaps_found: i32,
    pub compliance_score: i32,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            id: self.id,
            document_name: self.document_name.clone(),
            document_type: self.document_type.clone(),
            analysis_type: self.analysis_type,
            industry: self.industry.clone(),
            frameworks: self.frameworks.clone(),
            gaps_found: self.gaps_found,
            compliance_score: self.compliance_score,
            created_at: self.created_at,
        }
    }
}

/// History list entry (omits the bulky JSON documents)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub id: i64,
    pub document_name: String,
    pub document_type: Option<String>,
    pub analysis_type: AnalysisType,
    pub industry: Option<String>,
    pub frameworks: Vec<String>,
    pub gaps_found: i32,
    pub compliance_score: i32,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgment returned after a save
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedAnalysis {
    pub id: i64,
    pub document_name: String,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgment returned after a delete
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DeletedAnalysis {
    pub id: i64,
    pub document_name: String,
}

/// One page of history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub history: Vec<AnalysisSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// `pages` is `ceil(total / limit)`; `limit` must be positive
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total <= 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }

    /// Row offset of the first item on `page`
    pub fn offset(page: i64, limit: i64) -> i64 {
        (page - 1).saturating_mul(limit)
    }
}
