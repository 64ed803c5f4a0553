/// Default bcrypt work factor for password hashes
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest and highest work factors bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Default lifetime of an issued session token
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// History pagination defaults
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const DEFAULT_MAX_PAGE_LIMIT: i64 = 100;

/// Upper bound for `compliance_score`
pub const MAX_COMPLIANCE_SCORE: i32 = 100;

/// Number of hex characters kept when fingerprinting an email for logs
pub const EMAIL_FINGERPRINT_LEN: usize = 12;

// =============================================================================
// Messages
// =============================================================================

pub const ERR_EMAIL_PASSWORD_REQUIRED: &str = "Email and password are required";

pub const ERR_EMAIL_REQUIRED: &str = "Email is required";

pub const ERR_INVALID_CREDENTIALS: &str = "Invalid credentials";

pub const ERR_DOCUMENT_NAME_REQUIRED: &str = "Document name is required";

pub const ERR_ANALYSIS_RESULTS_REQUIRED: &str = "Analysis results are required";

pub const ERR_ANALYSIS_RESULTS_SHAPE: &str =
    "Analysis results must be a non-empty JSON object or array";

pub const ERR_ORGANIZATION_DETAILS_SHAPE: &str =
    "Organization details must be a JSON object or array";

pub const ERR_COMPLIANCE_SCORE_RANGE: &str = "Compliance score must be between 0 and 100";

pub const ERR_GAPS_FOUND_NEGATIVE: &str = "Gaps found must not be negative";

pub const ERR_INVALID_PAGINATION: &str = "Page and limit must be positive integers";

pub const ERR_INVALID_ANALYSIS_ID: &str = "Invalid analysis id";

/// Acknowledgment returned by reset-password whether or not the account exists
pub const MSG_RESET_PASSWORD: &str =
    "If an account with that email exists, password reset instructions have been sent";

pub const MSG_SIGNED_OUT: &str = "Signed out successfully";
