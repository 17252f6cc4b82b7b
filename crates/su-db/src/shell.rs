//! Process-backed executor

use crate::error::{DbError, DbResult};
use crate::traits::{Executor, SQL_FIELD_SEPARATOR};
use crate::url::redact;
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// Executor spawning real processes through tokio.
///
/// Every call checks the cancellation token before spawning and races the
/// child against it; a cancelled child is killed.
pub struct ShellExecutor {
    psql: String,
    cancel: CancellationToken,
}

/// How a child's stdout is handled
#[derive(Clone, Copy, PartialEq, Eq)]
enum StdoutMode {
    Inherit,
    Capture,
}

impl ShellExecutor {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            psql: "psql".to_string(),
            cancel,
        }
    }

    /// Override the psql binary
    pub fn with_psql(mut self, psql: impl Into<String>) -> Self {
        self.psql = psql.into();
        self
    }

    async fn execute(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&[u8]>,
        stdout: StdoutMode,
    ) -> DbResult<String> {
        let command = display_command(program, args);
        if self.cancel.is_cancelled() {
            return Err(DbError::Cancelled { command });
        }
        log::debug!("$ {}", command);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .kill_on_drop(true)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(match stdout {
                StdoutMode::Inherit => Stdio::inherit(),
                StdoutMode::Capture => Stdio::piped(),
            })
            .stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| DbError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

        let output = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                // dropping the child future kills the process
                return Err(DbError::Cancelled { command });
            }
            result = feed_and_wait(child, stdin) => result.map_err(|e| DbError::Spawn {
                program: program.to_string(),
                source: e,
            })?,
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(DbError::ExternalProcess {
                command,
                status,
                stderr,
            });
        }

        // Streamed commands keep their diagnostics visible.
        if stdout == StdoutMode::Inherit && !stderr.trim().is_empty() {
            eprint!("{}", stderr);
        } else if !stderr.trim().is_empty() {
            log::debug!("{}: {}", program, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

async fn feed_and_wait(mut child: Child, stdin: Option<&[u8]>) -> std::io::Result<Output> {
    let pipe = child.stdin.take();
    let feed = async move {
        if let (Some(mut pipe), Some(bytes)) = (pipe, stdin) {
            pipe.write_all(bytes).await?;
            pipe.shutdown().await?;
        }
        Ok::<(), std::io::Error>(())
    };
    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;
    // A child that exits without reading all input breaks the pipe; its
    // exit status is the meaningful result then.
    if let Err(e) = fed {
        if output.status.success() {
            return Err(e);
        }
    }
    Ok(output)
}

/// Render a command line for logs and errors with credentials masked.
fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| redact(a)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn run(&self, program: &str, args: &[String]) -> DbResult<()> {
        self.execute(program, args, None, StdoutMode::Inherit)
            .await
            .map(|_| ())
    }

    async fn run_with_output(&self, program: &str, args: &[String]) -> DbResult<String> {
        self.execute(program, args, None, StdoutMode::Capture).await
    }

    async fn run_with_stdin(&self, program: &str, args: &[String], stdin: &[u8]) -> DbResult<()> {
        self.execute(program, args, Some(stdin), StdoutMode::Inherit)
            .await
            .map(|_| ())
    }

    async fn run_sql(&self, database_url: &str, sql: &str) -> DbResult<String> {
        let args = vec![
            "-X".to_string(),
            "-t".to_string(),
            "-A".to_string(),
            "-F".to_string(),
            SQL_FIELD_SEPARATOR.to_string(),
            "-v".to_string(),
            "ON_ERROR_STOP=1".to_string(),
            "-c".to_string(),
            sql.to_string(),
            database_url.to_string(),
        ];
        self.run_with_output(&self.psql, &args).await
    }

    async fn run_sql_file(&self, database_url: &str, path: &Path) -> DbResult<()> {
        let args = vec![
            "-X".to_string(),
            "-q".to_string(),
            "-v".to_string(),
            "ON_ERROR_STOP=on".to_string(),
            "-f".to_string(),
            path.display().to_string(),
            database_url.to_string(),
        ];
        self.run(&self.psql, &args).await
    }
}

#[cfg(all(test, unix))]
#[path = "shell_test.rs"]
mod tests;
