use crate::error::{ReleaseError, Result};
use git2::{Direction, ErrorCode, RemoteCallbacks, Repository as Git2Repo};
use std::fs;
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    remote: String,
}

impl Git2Repository {
    /// Open or discover a git repository, querying branches on `remote`
    pub fn open<P: AsRef<Path>>(path: P, remote: impl Into<String>) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo,
            remote: remote.into(),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo, remote: impl Into<String>) -> Self {
        Git2Repository {
            repo,
            remote: remote.into(),
        }
    }

    /// Name of the remote branch queries go to
    pub fn remote_name(&self) -> &str {
        &self.remote
    }

    /// URL of the configured remote, if it has one
    pub fn remote_url(&self) -> Result<Option<String>> {
        match self.repo.find_remote(&self.remote) {
            Ok(remote) => Ok(remote.url().ok().filter(|s| !s.is_empty()).map(|s| s.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn tracking_branch_exists(&self, name: &str) -> Result<bool> {
        let reference_name = format!("refs/remotes/{}/{}", self.remote, name);

        match self.repo.find_reference(&reference_name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Credential callbacks for talking to the remote: SSH keys from
/// `~/.ssh`, then the SSH agent, then git's default credentials.
fn credential_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

impl super::Repository for Git2Repository {
    fn tag_exists(&self, name: &str) -> Result<bool> {
        let reference_name = format!("refs/tags/{}", name);

        match self.repo.find_reference(&reference_name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        let mut remote = self.repo.find_remote(&self.remote).map_err(|e| {
            ReleaseError::config(format!("Cannot find remote '{}': {}", self.remote, e))
        })?;

        let wanted = format!("refs/heads/{}", name);

        let listed = match remote.connect_auth(Direction::Fetch, Some(credential_callbacks()), None)
        {
            Ok(connection) => {
                let heads = connection.list()?;
                Some(heads.iter().any(|head| head.name() == wanted))
            }
            Err(e) => {
                tracing::warn!(
                    remote = %self.remote,
                    error = %e,
                    "cannot list remote heads, using remote-tracking refs"
                );
                None
            }
        };

        match listed {
            Some(found) => Ok(found),
            None => self.tracking_branch_exists(name),
        }
    }

    fn read_file(&self, path: &str) -> Result<String> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| ReleaseError::config("Repository has no working directory"))?;

        fs::read_to_string(workdir.join(path)).map_err(|e| {
            ReleaseError::Io(std::io::Error::new(e.kind(), format!("{}: {}", path, e)))
        })
    }

    fn list_tags_matching(&self, glob: &str) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(Some(glob))?;

        Ok(tags.iter().flatten().flatten().map(|s| s.to_string()).collect())
    }

    fn resolve_commit(&self, tag: &str) -> Result<String> {
        let commit = self
            .repo
            .find_reference(&format!("refs/tags/{}", tag))?
            .peel_to_commit()?;

        Ok(commit.id().to_string())
    }
}
