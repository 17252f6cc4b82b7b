//! Shared test doubles for su-db collaborators
//!
//! Fakes record intent (which statements, which verbs) rather than process
//! mechanics, so callers can assert on what business logic asked for.

use crate::error::{DbError, DbResult};
use crate::traits::{Executor, MigrationRunner, SchemaDumper, VersionControl};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use su_core::AppliedVersion;

/// One recorded executor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Run { program: String, args: Vec<String> },
    Output { program: String, args: Vec<String> },
    Stdin { program: String, args: Vec<String>, stdin: Vec<u8> },
    Sql { url: String, sql: String },
    /// Script contents are captured at call time; the file is usually a
    /// temp file gone by the time the test inspects it.
    SqlFile { url: String, path: PathBuf, script: String },
}

type SqlFileHook = Box<dyn Fn(&Path, &str) -> DbResult<()> + Send + Sync>;

/// Executor that records calls and replays scripted responses in order.
///
/// Calls beyond the scripted responses succeed with empty output.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<DbResult<String>>>,
    sql_file_hook: Option<SqlFileHook>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` with the script path and contents on every `run_sql_file`.
    pub fn with_sql_file_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Path, &str) -> DbResult<()> + Send + Sync + 'static,
    {
        self.sql_file_hook = Some(Box::new(hook));
        self
    }

    pub fn push_output(&self, output: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(output.into()));
    }

    pub fn push_error(&self, error: DbError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> DbResult<String> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn run(&self, program: &str, args: &[String]) -> DbResult<()> {
        self.record(Call::Run {
            program: program.to_string(),
            args: args.to_vec(),
        })
        .map(|_| ())
    }

    async fn run_with_output(&self, program: &str, args: &[String]) -> DbResult<String> {
        self.record(Call::Output {
            program: program.to_string(),
            args: args.to_vec(),
        })
    }

    async fn run_with_stdin(&self, program: &str, args: &[String], stdin: &[u8]) -> DbResult<()> {
        self.record(Call::Stdin {
            program: program.to_string(),
            args: args.to_vec(),
            stdin: stdin.to_vec(),
        })
        .map(|_| ())
    }

    async fn run_sql(&self, database_url: &str, sql: &str) -> DbResult<String> {
        self.record(Call::Sql {
            url: database_url.to_string(),
            sql: sql.to_string(),
        })
    }

    async fn run_sql_file(&self, database_url: &str, path: &Path) -> DbResult<()> {
        let script = std::fs::read_to_string(path).unwrap_or_default();
        let result = self.record(Call::SqlFile {
            url: database_url.to_string(),
            path: path.to_path_buf(),
            script: script.clone(),
        });
        result?;
        if let Some(hook) = &self.sql_file_hook {
            hook(path, &script)?;
        }
        Ok(())
    }
}

/// Migration runner recording verbs
#[derive(Default)]
pub struct FakeRunner {
    pub applied: Mutex<Vec<AppliedVersion>>,
    verbs: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl FakeRunner {
    pub fn with_applied(versions: &[&str]) -> Self {
        Self {
            applied: Mutex::new(
                versions
                    .iter()
                    .map(|v| AppliedVersion::try_new(*v).expect("numeric version"))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Make `verb` fail with an external-process error
    pub fn failing_on(mut self, verb: &str) -> Self {
        self.fail_on = Some(verb.to_string());
        self
    }

    pub fn verbs(&self) -> Vec<String> {
        self.verbs.lock().unwrap().clone()
    }

    fn record(&self, verb: &str) -> DbResult<()> {
        self.verbs.lock().unwrap().push(verb.to_string());
        if self.fail_on.as_deref() == Some(verb) {
            return Err(DbError::ExternalProcess {
                command: format!("goose {}", verb),
                status: "exit code 1".to_string(),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MigrationRunner for FakeRunner {
    async fn apply_all(&self, _database_url: &str, _migrations_dir: &Path) -> DbResult<()> {
        self.record("up")
    }

    async fn apply_next(&self, _database_url: &str, _migrations_dir: &Path) -> DbResult<()> {
        self.record("up-by-one")
    }

    async fn rollback_last(&self, _database_url: &str, _migrations_dir: &Path) -> DbResult<()> {
        self.record("down")
    }

    async fn status(&self, _database_url: &str, _migrations_dir: &Path) -> DbResult<()> {
        self.record("status")
    }

    async fn applied_versions(&self, _database_url: &str) -> DbResult<Vec<AppliedVersion>> {
        self.record("applied_versions")?;
        Ok(self.applied.lock().unwrap().clone())
    }

    fn version_table(&self) -> &str {
        su_core::config::DEFAULT_VERSION_TABLE
    }
}

/// Version control returning a fixed set of added files
#[derive(Default)]
pub struct FakeVcs {
    added: Vec<PathBuf>,
    fetch_fails: bool,
    fetch_cancelled: bool,
    fetched: Mutex<Vec<String>>,
}

impl FakeVcs {
    pub fn with_added(paths: &[&str]) -> Self {
        Self {
            added: paths.iter().map(PathBuf::from).collect(),
            ..Self::default()
        }
    }

    /// Make `fetch` fail like an unreachable remote.
    pub fn failing_fetch(mut self) -> Self {
        self.fetch_fails = true;
        self
    }

    /// Make `fetch` report cancellation.
    pub fn cancelled_fetch(mut self) -> Self {
        self.fetch_cancelled = true;
        self
    }

    /// Branches passed to `fetch`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn fetch(&self, branch: &str) -> DbResult<()> {
        self.fetched.lock().unwrap().push(branch.to_string());
        if self.fetch_cancelled {
            return Err(DbError::Cancelled {
                command: format!("git fetch origin {}", branch),
            });
        }
        if self.fetch_fails {
            return Err(DbError::ExternalProcess {
                command: format!("git fetch origin {}", branch),
                status: "exit code 128".to_string(),
                stderr: "fatal: unable to access remote".to_string(),
            });
        }
        Ok(())
    }

    async fn added_files(&self, _branch: &str, _pattern: &str) -> DbResult<Vec<PathBuf>> {
        Ok(self.added.clone())
    }

    async fn is_repository(&self) -> bool {
        true
    }
}

/// Schema dumper returning a canned dump
pub struct FakeDumper {
    pub dump: String,
    excludes: Mutex<Vec<String>>,
}

impl FakeDumper {
    pub fn new(dump: impl Into<String>) -> Self {
        Self {
            dump: dump.into(),
            excludes: Mutex::new(Vec::new()),
        }
    }

    pub fn excludes(&self) -> Vec<String> {
        self.excludes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchemaDumper for FakeDumper {
    async fn dump_schema(&self, _database_url: &str, exclude_tables: &[String]) -> DbResult<String> {
        *self.excludes.lock().unwrap() = exclude_tables.to_vec();
        Ok(self.dump.clone())
    }
}
