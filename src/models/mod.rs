pub mod analysis;
pub mod user;

pub use analysis::{
    AnalysisRecord, AnalysisSummary, AnalysisType, DeletedAnalysis, HistoryPage, NewAnalysis,
    Pagination, SavedAnalysis, StructuredDocument,
};
pub use user::{NewUser, ProfileUpdate, User, UserProfile};
