//! git-backed version control

use crate::error::DbResult;
use crate::traits::{Executor, VersionControl};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Talks to the `git` binary in the current working directory
pub struct GitCli {
    exec: Arc<dyn Executor>,
    program: String,
    remote: String,
}

impl GitCli {
    pub fn new(exec: Arc<dyn Executor>) -> Self {
        Self {
            exec,
            program: "git".to_string(),
            remote: "origin".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    fn remote_ref(&self, branch: &str) -> String {
        format!("{}/{}", self.remote, branch)
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn fetch(&self, branch: &str) -> DbResult<()> {
        let args = vec!["fetch".to_string(), self.remote.clone(), branch.to_string()];
        self.exec.run_with_output(&self.program, &args).await.map(|_| ())
    }

    async fn added_files(&self, branch: &str, pattern: &str) -> DbResult<Vec<PathBuf>> {
        let args = vec![
            "diff".to_string(),
            "--name-only".to_string(),
            "--diff-filter=A".to_string(),
            self.remote_ref(branch),
            "--".to_string(),
            pattern.to_string(),
        ];
        let output = self.exec.run_with_output(&self.program, &args).await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    async fn is_repository(&self) -> bool {
        let args = vec!["rev-parse".to_string(), "--git-dir".to_string()];
        self.exec.run_with_output(&self.program, &args).await.is_ok()
    }
}
