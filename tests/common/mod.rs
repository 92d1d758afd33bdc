#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use git2::{Oid, Repository};
use tempfile::TempDir;
use tiny_http::{Header, Response, Server, StatusCode};

/// A working repository with a bare `origin` next to it
pub struct GitFixture {
    pub work: TempDir,
    pub remote: TempDir,
    pub repo: Repository,
}

impl GitFixture {
    pub fn new() -> Self {
        let work = TempDir::new().expect("Could not create temp dir");
        let remote = TempDir::new().expect("Could not create remote dir");

        Repository::init_bare(remote.path()).expect("Could not init bare remote");
        let repo = Repository::init(work.path()).expect("Could not init git repo");
        {
            let mut config = repo.config().expect("Could not get config");
            config
                .set_str("user.name", "Test User")
                .expect("Could not set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Could not set user.email");
        }
        repo.remote("origin", remote.path().to_str().expect("utf-8 path"))
            .expect("Could not add origin");

        let fixture = GitFixture { work, remote, repo };
        fixture.commit("README.md", "release train\n");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.work.path()
    }

    /// Write a file and commit it on HEAD
    pub fn commit(&self, name: &str, content: &str) -> Oid {
        fs::write(self.work.path().join(name), content).expect("Could not write file");

        let mut index = self.repo.index().expect("Could not get index");
        index
            .add_path(Path::new(name))
            .expect("Could not add file to index");
        index.write().expect("Could not write index");

        let tree_id = index.write_tree().expect("Could not write tree");
        let tree = self.repo.find_tree(tree_id).expect("Could not find tree");
        let sig = self.repo.signature().expect("Could not get sig");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, &format!("update {}", name), &tree, &parents)
            .expect("Could not create commit")
    }

    /// Lightweight tag at HEAD; returns the tagged commit
    pub fn tag(&self, name: &str) -> Oid {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .expect("Could not create tag");
        head.id()
    }

    /// Create `name` at HEAD and push it to origin
    pub fn push_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo
            .branch(name, &head, true)
            .expect("Could not create branch");

        let mut origin = self.repo.find_remote("origin").unwrap();
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", name);
        origin
            .push(&[refspec.as_str()], None)
            .expect("Could not push branch");
    }
}

/// Fake GitHub API answering a fixed number of requests with one body
pub struct FakeGitHub {
    pub base_url: String,
    pub seen: Arc<Mutex<Vec<(String, Option<String>)>>>,
    handle: thread::JoinHandle<()>,
}

impl FakeGitHub {
    pub fn spawn(status: u16, body: String, expected_requests: usize) -> Self {
        let server = Server::http("127.0.0.1:0").expect("server");
        let base_url = format!("http://{}", server.server_addr());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_thread = Arc::clone(&seen);

        let handle = thread::spawn(move || {
            for _ in 0..expected_requests {
                let req = server.recv().expect("request");
                let auth = req
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());
                seen_thread
                    .lock()
                    .expect("lock")
                    .push((req.url().to_string(), auth));

                let resp = Response::from_string(body.clone())
                    .with_status_code(StatusCode(status))
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json").expect("header"),
                    );
                req.respond(resp).expect("respond");
            }
        });

        FakeGitHub {
            base_url,
            seen,
            handle,
        }
    }

    pub fn join(self) -> Vec<(String, Option<String>)> {
        self.handle.join().expect("join server");
        let seen = self.seen.lock().expect("lock");
        seen.clone()
    }
}

/// A runs listing with one completed run
pub fn runs_body(name: &str, sha: &str, conclusion: &str) -> String {
    format!(
        r#"{{"total_count":1,"workflow_runs":[{{"id":42,"name":"{}","head_sha":"{}","status":"completed","conclusion":"{}"}}]}}"#,
        name, sha, conclusion
    )
}
