use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::collections::{HashMap, HashSet};

/// Mock repository for testing without actual git operations
#[derive(Debug, Clone)]
pub struct MockRepository {
    tags: HashMap<String, String>,
    remote_branches: HashSet<String>,
    files: HashMap<String, String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            tags: HashMap::new(),
            remote_branches: HashSet::new(),
            files: HashMap::new(),
        }
    }

    /// Add a tag pointing to a commit id
    pub fn add_tag(&mut self, name: impl Into<String>, commit: impl Into<String>) {
        self.tags.insert(name.into(), commit.into());
    }

    /// Add a branch to the simulated remote
    pub fn add_remote_branch(&mut self, name: impl Into<String>) {
        self.remote_branches.insert(name.into());
    }

    /// Set a working-tree file's content
    pub fn set_file(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Builder form of [MockRepository::add_tag]
    pub fn with_tag(mut self, name: impl Into<String>, commit: impl Into<String>) -> Self {
        self.add_tag(name, commit);
        self
    }

    /// Builder form of [MockRepository::add_remote_branch]
    pub fn with_remote_branch(mut self, name: impl Into<String>) -> Self {
        self.add_remote_branch(name);
        self
    }

    /// Builder form of [MockRepository::set_file]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate an fnmatch glob into an anchored regex (`*` and `?` only)
fn glob_to_regex(glob: &str) -> Result<regex::Regex> {
    let escaped = regex::escape(glob);
    let pattern = escaped.replace(r"\*", ".*").replace(r"\?", ".");

    regex::Regex::new(&format!("^{}$", pattern))
        .map_err(|e| ReleaseError::config(format!("Invalid tag glob '{}': {}", glob, e)))
}

impl Repository for MockRepository {
    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.contains_key(name))
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.remote_branches.contains(name))
    }

    fn read_file(&self, path: &str) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            ReleaseError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: file not found", path),
            ))
        })
    }

    fn list_tags_matching(&self, glob: &str) -> Result<Vec<String>> {
        let re = glob_to_regex(glob)?;
        Ok(self
            .tags
            .keys()
            .filter(|name| re.is_match(name))
            .cloned()
            .collect())
    }

    fn resolve_commit(&self, tag: &str) -> Result<String> {
        self.tags
            .get(tag)
            .cloned()
            .ok_or_else(|| ReleaseError::Git(git2::Error::from_str(&format!("tag not found: {}", tag))))
    }
}
