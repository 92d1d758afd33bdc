//! Git queries abstraction layer
//!
//! This module provides a trait-based abstraction over the read-only
//! repository queries the validator needs, so validation can run against
//! a real repository or an in-memory fake.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! # Usage
//!
//! Code should depend on the [Repository] trait rather than on a concrete
//! implementation.
//!
//! ```rust
//! # use release_validator::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! if repo.tag_exists("v1.2.0-rc1")? {
//!     let commit = repo.resolve_commit("v1.2.0-rc1")?;
//!     println!("v1.2.0-rc1 points at {}", commit);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Read-only repository queries used during release validation
///
/// Implementations never mutate the repository: running the same query
/// twice against the same state gives the same answer.
///
/// ## Error Handling
///
/// Absence is reported through the return value (`false`, empty list).
/// `Err` is reserved for failures to answer the question at all, mapped to
/// [crate::error::ReleaseError] variants.
pub trait Repository {
    /// Whether a tag with exactly this name exists
    ///
    /// # Arguments
    /// * `name` - Tag name without the `refs/tags/` prefix (e.g., "v1.2.0-rc1")
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Whether a branch with this name exists on the release remote
    ///
    /// # Arguments
    /// * `name` - Branch name without any remote prefix (e.g., "v1.2.x")
    fn remote_branch_exists(&self, name: &str) -> Result<bool>;

    /// Read a file from the working tree
    ///
    /// # Arguments
    /// * `path` - Path relative to the repository root
    fn read_file(&self, path: &str) -> Result<String>;

    /// List tag names matching a shell glob
    ///
    /// # Arguments
    /// * `glob` - fnmatch pattern (e.g., "v1.2.0-rc*")
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Matching tag names, in no particular order
    fn list_tags_matching(&self, glob: &str) -> Result<Vec<String>>;

    /// Resolve a tag to the full hex id of the commit it points at
    ///
    /// Annotated tags are peeled to their commit.
    fn resolve_commit(&self, tag: &str) -> Result<String>;
}
