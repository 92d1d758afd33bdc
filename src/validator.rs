//! Release version validation
//!
//! Checks a requested release version against the state of the repository
//! and CI, in a fixed order, stopping at the first violated rule:
//!
//! 1. the version parses and is not an `-rc0` marker
//! 2. its tag does not exist yet
//! 3. first release candidate of a minor line: the release branch does not
//!    exist yet and the version file holds the `-rc0` marker
//! 4. anything else: the release branch exists, and
//!    - a later release candidate follows its predecessor without gaps
//!    - a final release has at least one release candidate, whose CI run
//!      passed when CI credentials are available

use serde::Serialize;

use crate::ci::CiProvider;
use crate::config::Config;
use crate::domain::{ReleaseTrain, ReleaseVersion};
use crate::error::{Result, ValidationError};
use crate::git::Repository;

/// What happened to the CI gate during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CiCheck {
    /// Release candidates are not gated on CI
    NotRequired,
    /// The last release candidate's test run succeeded
    Passed,
    /// No CI credentials were available
    Skipped,
}

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Version without the leading `v` (e.g. "1.2.0-rc1")
    pub version: String,
    pub major_minor: String,
    pub release_branch: String,
    pub is_first_rc: bool,
    pub is_release_candidate: bool,
    pub is_minor: bool,
    pub tag: String,
    /// Release candidate a final release is cut from
    pub last_rc: Option<String>,
    pub ci: CiCheck,
}

/// Settings that shape validation but not its rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Path of the `-rc0` marker file, relative to the repository root
    pub version_file: String,
    /// CI job that must succeed before a final release
    pub job_name: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions::from(&Config::default())
    }
}

impl From<&Config> for ValidatorOptions {
    fn from(config: &Config) -> Self {
        ValidatorOptions {
            version_file: config.release.version_file.clone(),
            job_name: config.ci.job_name.clone(),
        }
    }
}

/// Release version validator over read-only repository and CI queries
pub struct Validator<'a, R: Repository + ?Sized> {
    repo: &'a R,
    ci: Option<&'a dyn CiProvider>,
    options: ValidatorOptions,
}

impl<'a, R: Repository + ?Sized> Validator<'a, R> {
    /// Validator without a CI provider; the final-release CI gate is skipped
    pub fn new(repo: &'a R) -> Self {
        Validator {
            repo,
            ci: None,
            options: ValidatorOptions::default(),
        }
    }

    /// Gate final releases on this CI provider
    pub fn with_ci(mut self, ci: &'a dyn CiProvider) -> Self {
        self.ci = Some(ci);
        self
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate a requested release version such as "v2.99.0-rc1"
    pub fn validate(&self, raw: &str) -> Result<ValidationResult> {
        let version = ReleaseVersion::parse(raw)?;
        let train = ReleaseTrain::new(version);

        tracing::debug!(
            version = %version,
            release_branch = %train.release_branch,
            "parsed release version"
        );

        if self.repo.tag_exists(&train.tag)? {
            return Err(ValidationError::TagExists { tag: train.tag }.into());
        }

        let mut last_rc = None;
        let mut ci = CiCheck::NotRequired;

        if version.is_first_rc() {
            self.check_first_rc(&train)?;
        } else {
            if !self.repo.remote_branch_exists(&train.release_branch)? {
                return Err(ValidationError::BranchMissing {
                    branch: train.release_branch,
                }
                .into());
            }

            if let Some(previous) = train.previous_rc_tag() {
                if !self.repo.tag_exists(&previous)? {
                    return Err(ValidationError::PreviousRcMissing { previous }.into());
                }
            } else if !version.is_release_candidate() {
                let rc_tag = self.find_last_rc(&train)?;
                ci = self.check_ci(&rc_tag)?;
                last_rc = Some(rc_tag);
            }
        }

        Ok(ValidationResult {
            version: version.to_string(),
            major_minor: train.major_minor,
            release_branch: train.release_branch,
            is_first_rc: version.is_first_rc(),
            is_release_candidate: version.is_release_candidate(),
            is_minor: version.is_minor(),
            tag: train.tag,
            last_rc,
            ci,
        })
    }

    fn check_first_rc(&self, train: &ReleaseTrain) -> Result<()> {
        if self.repo.remote_branch_exists(&train.release_branch)? {
            return Err(ValidationError::BranchAlreadyExists {
                branch: train.release_branch.clone(),
            }
            .into());
        }

        let expected = train.expected_marker();
        let content = self.repo.read_file(&self.options.version_file)?;
        let found = content.trim();
        if found != expected {
            return Err(ValidationError::VersionFileMismatch {
                path: self.options.version_file.clone(),
                expected,
                found: found.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Tag of the highest release candidate, as it is named in the repository
    fn find_last_rc(&self, train: &ReleaseTrain) -> Result<String> {
        let pattern = train.rc_tag_glob();
        let tags = self.repo.list_tags_matching(&pattern)?;

        let (_, last) = train
            .last_rc(&tags)
            .ok_or(ValidationError::NoRcFound { pattern })?;

        tracing::debug!(last_rc = %last, candidates = tags.len(), "selected last release candidate");
        Ok(last.clone())
    }

    fn check_ci(&self, rc_tag: &str) -> Result<CiCheck> {
        let Some(ci) = self.ci else {
            tracing::debug!(tag = rc_tag, "no CI credentials, skipping CI check");
            return Ok(CiCheck::Skipped);
        };

        let commit = self.repo.resolve_commit(rc_tag)?;
        let job = &self.options.job_name;

        match ci.run_conclusion(&commit, job)? {
            Some(conclusion) if conclusion.is_success() => Ok(CiCheck::Passed),
            other => Err(ValidationError::CiNotPassed {
                tag: rc_tag.to_string(),
                commit,
                job: job.clone(),
                status: other
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "no completed run".to_string()),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::{Conclusion, MockCiProvider};
    use crate::error::ReleaseError;
    use crate::git::MockRepository;

    fn kind(err: ReleaseError) -> &'static str {
        match err {
            ReleaseError::Validation(v) => v.kind(),
            other => panic!("expected a validation error, got: {other}"),
        }
    }

    fn first_rc_repo(marker: &str) -> MockRepository {
        MockRepository::new()
            .with_tag("v1.2.0-rc0", "c0")
            .with_file("VERSION.txt", marker)
    }

    fn branch_repo() -> MockRepository {
        MockRepository::new()
            .with_remote_branch("v1.2.x")
            .with_tag("v1.2.0-rc0", "c0")
            .with_tag("v1.2.0-rc1", "c1")
    }

    #[test]
    fn test_first_rc_succeeds() {
        let repo = first_rc_repo("1.2.0-rc0\n");
        let result = Validator::new(&repo).validate("v1.2.0-rc1").unwrap();

        assert_eq!(
            result,
            ValidationResult {
                version: "1.2.0-rc1".to_string(),
                major_minor: "1.2".to_string(),
                release_branch: "v1.2.x".to_string(),
                is_first_rc: true,
                is_release_candidate: true,
                is_minor: true,
                tag: "v1.2.0-rc1".to_string(),
                last_rc: None,
                ci: CiCheck::NotRequired,
            }
        );
    }

    #[test]
    fn test_first_rc_marker_mismatch() {
        let repo = first_rc_repo("1.2.0-rc1");
        let err = Validator::new(&repo).validate("v1.2.0-rc1").unwrap_err();
        assert_eq!(kind(err), "version_file_mismatch");
    }

    #[test]
    fn test_first_rc_branch_already_exists() {
        let repo = first_rc_repo("1.2.0-rc0").with_remote_branch("v1.2.x");
        let err = Validator::new(&repo).validate("v1.2.0-rc1").unwrap_err();
        assert_eq!(kind(err), "branch_already_exists");
    }

    #[test]
    fn test_first_rc_missing_marker_file_is_infrastructure_error() {
        let repo = MockRepository::new();
        let err = Validator::new(&repo).validate("v1.2.0-rc1").unwrap_err();
        assert!(matches!(err, ReleaseError::Io(_)));
    }

    #[test]
    fn test_custom_version_file() {
        let repo = MockRepository::new().with_file("release/VERSION", "3.4.0-rc0");
        let options = ValidatorOptions {
            version_file: "release/VERSION".to_string(),
            job_name: "Tests".to_string(),
        };

        let result = Validator::new(&repo)
            .with_options(options)
            .validate("v3.4.0-rc1")
            .unwrap();
        assert!(result.is_first_rc);
    }

    #[test]
    fn test_invalid_format_and_rc0() {
        let repo = MockRepository::new();
        let validator = Validator::new(&repo);

        for input in ["v1.2", "1.2.3", "v1.2.3-beta1", "v1.2.3-rc"] {
            assert_eq!(kind(validator.validate(input).unwrap_err()), "invalid_format");
        }
        assert_eq!(
            kind(validator.validate("v1.2.3-rc0").unwrap_err()),
            "invalid_release"
        );
    }

    #[test]
    fn test_rc0_rejected_regardless_of_state() {
        let repo = branch_repo().with_file("VERSION.txt", "1.2.0-rc0");
        let err = Validator::new(&repo).validate("v1.2.0-rc0").unwrap_err();
        assert_eq!(kind(err), "invalid_release");
    }

    #[test]
    fn test_tag_exists() {
        let repo = branch_repo();
        let err = Validator::new(&repo).validate("v1.2.0-rc1").unwrap_err();
        assert_eq!(kind(err), "tag_exists");
    }

    #[test]
    fn test_rc_sequence() {
        let repo = branch_repo();
        let validator = Validator::new(&repo);

        assert_eq!(
            kind(validator.validate("v1.2.0-rc3").unwrap_err()),
            "previous_rc_missing"
        );

        let result = validator.validate("v1.2.0-rc2").unwrap();
        assert!(!result.is_first_rc);
        assert_eq!(result.release_branch, "v1.2.x");
        assert_eq!(result.ci, CiCheck::NotRequired);
    }

    #[test]
    fn test_previous_rc_message_names_missing_tag() {
        let repo = branch_repo();
        let err = Validator::new(&repo).validate("v1.2.0-rc3").unwrap_err();
        assert!(err.to_string().contains("v1.2.0-rc2"));
    }

    #[test]
    fn test_branch_missing() {
        let repo = MockRepository::new().with_tag("v1.2.0-rc1", "c1");
        let validator = Validator::new(&repo);

        for input in ["v1.2.0-rc2", "v1.2.0", "v1.2.1-rc1"] {
            assert_eq!(kind(validator.validate(input).unwrap_err()), "branch_missing");
        }
    }

    #[test]
    fn test_patch_rc1_needs_only_branch() {
        let repo = branch_repo();
        let result = Validator::new(&repo).validate("v1.2.1-rc1").unwrap();
        assert!(!result.is_first_rc);
        assert!(!result.is_minor);
        assert_eq!(result.tag, "v1.2.1-rc1");
    }

    #[test]
    fn test_final_release_without_rc() {
        let repo = MockRepository::new()
            .with_remote_branch("v1.2.x")
            .with_tag("v1.2.0-rc0", "c0");
        let err = Validator::new(&repo).validate("v1.2.0").unwrap_err();
        assert_eq!(kind(err), "no_rc_found");
    }

    #[test]
    fn test_final_release_skips_ci_without_provider() {
        let repo = branch_repo();
        let result = Validator::new(&repo).validate("v1.2.0").unwrap();

        assert_eq!(result.version, "1.2.0");
        assert!(!result.is_first_rc);
        assert_eq!(result.last_rc.as_deref(), Some("v1.2.0-rc1"));
        assert_eq!(result.ci, CiCheck::Skipped);
    }

    #[test]
    fn test_final_release_checks_highest_rc_numerically() {
        let repo = branch_repo()
            .with_tag("v1.2.0-rc9", "c9")
            .with_tag("v1.2.0-rc10", "c10");
        let ci = MockCiProvider::new()
            .with_run("c9", "Tests", Conclusion::Success)
            .with_run("c10", "Tests", Conclusion::Success);

        let result = Validator::new(&repo).with_ci(&ci).validate("v1.2.0").unwrap();
        assert_eq!(result.last_rc.as_deref(), Some("v1.2.0-rc10"));
        assert_eq!(result.ci, CiCheck::Passed);
        assert_eq!(ci.calls(), vec![("c10".to_string(), "Tests".to_string())]);
    }

    #[test]
    fn test_final_release_resolves_zero_padded_rc_tag() {
        let repo = MockRepository::new()
            .with_remote_branch("v1.2.x")
            .with_tag("v1.2.0-rc0", "c0")
            .with_tag("v1.2.0-rc01", "c1");
        let ci = MockCiProvider::new().with_run("c1", "Tests", Conclusion::Success);

        let result = Validator::new(&repo).with_ci(&ci).validate("v1.2.0").unwrap();
        assert_eq!(result.last_rc.as_deref(), Some("v1.2.0-rc01"));
        assert_eq!(result.ci, CiCheck::Passed);
        assert_eq!(ci.calls(), vec![("c1".to_string(), "Tests".to_string())]);
    }

    #[test]
    fn test_final_release_ci_failed() {
        let repo = branch_repo();
        let ci = MockCiProvider::new().with_run("c1", "Tests", Conclusion::Failure);

        let err = Validator::new(&repo).with_ci(&ci).validate("v1.2.0").unwrap_err();
        assert_eq!(kind(err), "ci_not_passed");
    }

    #[test]
    fn test_final_release_no_ci_run() {
        let repo = branch_repo();
        let ci = MockCiProvider::new();

        let err = Validator::new(&repo).with_ci(&ci).validate("v1.2.0").unwrap_err();
        assert!(err.to_string().contains("no completed run"));
    }

    #[test]
    fn test_final_release_uses_configured_job() {
        let repo = branch_repo();
        let ci = MockCiProvider::new().with_run("c1", "Integration", Conclusion::Success);
        let options = ValidatorOptions {
            version_file: "VERSION.txt".to_string(),
            job_name: "Integration".to_string(),
        };

        let result = Validator::new(&repo)
            .with_ci(&ci)
            .with_options(options)
            .validate("v1.2.0")
            .unwrap();
        assert_eq!(result.ci, CiCheck::Passed);
    }

    #[test]
    fn test_ci_not_queried_for_release_candidates() {
        let repo = branch_repo();
        let ci = MockCiProvider::unavailable();

        Validator::new(&repo).with_ci(&ci).validate("v1.2.0-rc2").unwrap();
        assert!(ci.calls().is_empty());
    }

    #[test]
    fn test_first_failure_short_circuits() {
        // Both the tag and the missing branch are violations; the tag check runs first.
        let repo = MockRepository::new().with_tag("v1.2.0-rc2", "c2");
        let err = Validator::new(&repo).validate("v1.2.0-rc2").unwrap_err();
        assert_eq!(kind(err), "tag_exists");
    }

    #[test]
    fn test_validation_is_repeatable() {
        let repo = branch_repo();
        let validator = Validator::new(&repo);

        assert_eq!(
            validator.validate("v1.2.0-rc2").unwrap(),
            validator.validate("v1.2.0-rc2").unwrap()
        );
        assert_eq!(
            kind(validator.validate("v1.2.0-rc4").unwrap_err()),
            kind(validator.validate("v1.2.0-rc4").unwrap_err())
        );
    }
}
