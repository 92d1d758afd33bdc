use super::{CiProvider, Conclusion};
use crate::error::{ReleaseError, Result};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// Mock CI provider with scripted answers per (commit, job)
///
/// Each query pops the next scripted answer; the last one repeats forever.
#[derive(Debug, Default)]
pub struct MockCiProvider {
    answers: RefCell<HashMap<(String, String), VecDeque<Option<Conclusion>>>>,
    calls: RefCell<Vec<(String, String)>>,
    unavailable: bool,
}

impl MockCiProvider {
    /// Create a provider that knows no runs
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every query fails, as if the API were down
    pub fn unavailable() -> Self {
        MockCiProvider {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Record a completed run
    pub fn with_run(self, commit: &str, job: &str, conclusion: Conclusion) -> Self {
        self.with_sequence(commit, job, vec![Some(conclusion)])
    }

    /// Script successive answers for a (commit, job) pair
    pub fn with_sequence(self, commit: &str, job: &str, answers: Vec<Option<Conclusion>>) -> Self {
        self.answers
            .borrow_mut()
            .insert((commit.to_string(), job.to_string()), answers.into());
        self
    }

    /// Queries made so far, in order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

impl CiProvider for MockCiProvider {
    fn run_conclusion(&self, commit: &str, job_name: &str) -> Result<Option<Conclusion>> {
        self.calls
            .borrow_mut()
            .push((commit.to_string(), job_name.to_string()));

        if self.unavailable {
            return Err(ReleaseError::ci("mock CI provider is unavailable"));
        }

        let mut answers = self.answers.borrow_mut();
        let Some(queue) = answers.get_mut(&(commit.to_string(), job_name.to_string())) else {
            return Ok(None);
        };

        if queue.len() > 1 {
            Ok(queue.pop_front().flatten())
        } else {
            Ok(queue.front().cloned().flatten())
        }
    }
}
