use thiserror::Error;

/// A violated release precondition.
///
/// Every variant is deterministic given the same input and repository
/// state, so none of them is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid version format: '{input}' - expected vMAJOR.MINOR.PATCH[-rcN]")]
    InvalidFormat { input: String },

    #[error("Invalid release: '{input}' - rc0 is reserved for the marker created when a release branch is cut")]
    InvalidRelease { input: String },

    #[error("Tag '{tag}' already exists")]
    TagExists { tag: String },

    #[error("Release branch '{branch}' already exists; the first release candidate of a minor line creates it")]
    BranchAlreadyExists { branch: String },

    #[error("Version file '{path}' must contain '{expected}' before the first release candidate, found '{found}'")]
    VersionFileMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Release branch '{branch}' does not exist")]
    BranchMissing { branch: String },

    #[error("Previous release candidate '{previous}' does not exist; release candidates must be sequential")]
    PreviousRcMissing { previous: String },

    #[error("No release candidate matching '{pattern}' found for a final release")]
    NoRcFound { pattern: String },

    #[error("CI job '{job}' has not passed for {tag} ({commit}): {status}")]
    CiNotPassed {
        tag: String,
        commit: String,
        job: String,
        status: String,
    },

    #[error("Timed out after {seconds}s waiting for CI job '{job}' on {commit}")]
    CiTimeout {
        commit: String,
        job: String,
        seconds: u64,
    },
}

impl ValidationError {
    /// Stable machine-readable name of the violated rule
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidFormat { .. } => "invalid_format",
            ValidationError::InvalidRelease { .. } => "invalid_release",
            ValidationError::TagExists { .. } => "tag_exists",
            ValidationError::BranchAlreadyExists { .. } => "branch_already_exists",
            ValidationError::VersionFileMismatch { .. } => "version_file_mismatch",
            ValidationError::BranchMissing { .. } => "branch_missing",
            ValidationError::PreviousRcMissing { .. } => "previous_rc_missing",
            ValidationError::NoRcFound { .. } => "no_rc_found",
            ValidationError::CiNotPassed { .. } => "ci_not_passed",
            ValidationError::CiTimeout { .. } => "ci_timeout",
        }
    }
}

/// Unified error type for release-validator operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CI query failed: {0}")]
    Ci(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-validator
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a CI error with context
    pub fn ci(msg: impl Into<String>) -> Self {
        ReleaseError::Ci(msg.into())
    }

    /// True when the error is a violated release rule rather than an
    /// infrastructure failure
    pub fn is_validation(&self) -> bool {
        matches!(self, ReleaseError::Validation(_))
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_validation() {
            1
        } else {
            2
        }
    }
}
