//! CI run queries
//!
//! The validator only needs one question answered: did the test-suite job
//! pass for a given commit? [CiProvider] is that seam; [github] answers it
//! from the GitHub Actions REST API and [mock] from memory.

pub mod github;
pub mod mock;
pub mod wait;

pub use github::GitHubActionsClient;
pub use mock::MockCiProvider;
pub use wait::{wait_for_success, WaitOptions};

use crate::error::Result;
use serde::Serialize;
use std::fmt;

/// Final outcome of a CI run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    Stale,
    Other(String),
}

impl Conclusion {
    pub fn is_success(&self) -> bool {
        matches!(self, Conclusion::Success)
    }
}

impl From<&str> for Conclusion {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "success" => Conclusion::Success,
            "failure" => Conclusion::Failure,
            "cancelled" => Conclusion::Cancelled,
            "skipped" => Conclusion::Skipped,
            "timed_out" => Conclusion::TimedOut,
            "action_required" => Conclusion::ActionRequired,
            "neutral" => Conclusion::Neutral,
            "stale" => Conclusion::Stale,
            other => Conclusion::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conclusion::Success => write!(f, "success"),
            Conclusion::Failure => write!(f, "failure"),
            Conclusion::Cancelled => write!(f, "cancelled"),
            Conclusion::Skipped => write!(f, "skipped"),
            Conclusion::TimedOut => write!(f, "timed_out"),
            Conclusion::ActionRequired => write!(f, "action_required"),
            Conclusion::Neutral => write!(f, "neutral"),
            Conclusion::Stale => write!(f, "stale"),
            Conclusion::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Read-only access to CI run history
pub trait CiProvider {
    /// Conclusion of the most recent run of `job_name` for `commit`.
    ///
    /// # Returns
    /// * `Ok(Some(_))` - The run has completed
    /// * `Ok(None)` - No such run, or it is still in progress
    /// * `Err` - The CI platform could not be queried
    fn run_conclusion(&self, commit: &str, job_name: &str) -> Result<Option<Conclusion>>;
}
