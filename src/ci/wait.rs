use std::thread;
use std::time::{Duration, Instant};

use super::{CiProvider, Conclusion};
use crate::error::{Result, ValidationError};

/// Polling parameters for [wait_for_success]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up once this much time has passed
    pub timeout: Duration,
    /// Pause between polls
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions {
            timeout: Duration::from_secs(30 * 60),
            interval: Duration::from_secs(30),
        }
    }
}

/// Poll until the run of `job` on `commit` concludes.
///
/// A missing or still-running run keeps the loop going. The last pause is
/// cut short so one final poll happens at the deadline. Any conclusion
/// other than success ends it with `CiNotPassed`; running out of time ends
/// it with `CiTimeout`.
pub fn wait_for_success<C: CiProvider + ?Sized>(
    provider: &C,
    tag: &str,
    commit: &str,
    job: &str,
    options: WaitOptions,
) -> Result<Conclusion> {
    let deadline = Instant::now().checked_add(options.timeout);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match provider.run_conclusion(commit, job)? {
            Some(conclusion) if conclusion.is_success() => {
                tracing::info!(tag, commit, job, attempt, "CI run succeeded");
                return Ok(conclusion);
            }
            Some(conclusion) => {
                return Err(ValidationError::CiNotPassed {
                    tag: tag.to_string(),
                    commit: commit.to_string(),
                    job: job.to_string(),
                    status: conclusion.to_string(),
                }
                .into());
            }
            None => {
                tracing::debug!(tag, commit, job, attempt, "CI run not finished yet");
            }
        }

        // An unrepresentable deadline never arrives.
        let pause = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(ValidationError::CiTimeout {
                        commit: commit.to_string(),
                        job: job.to_string(),
                        seconds: options.timeout.as_secs(),
                    }
                    .into());
                }
                options.interval.min(remaining)
            }
            None => options.interval,
        };

        thread::sleep(pause);
    }
}
