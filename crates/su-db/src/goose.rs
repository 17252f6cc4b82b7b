//! goose-backed migration runner

use crate::error::{DbError, DbResult};
use crate::traits::{Executor, MigrationRunner};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use su_core::config::DEFAULT_VERSION_TABLE;
use su_core::sql_utils::quote_dotted;
use su_core::AppliedVersion;

/// Runs goose's postgres driver against a migrations directory
pub struct GooseRunner {
    exec: Arc<dyn Executor>,
    program: String,
    version_table: String,
}

impl GooseRunner {
    pub fn new(exec: Arc<dyn Executor>) -> Self {
        Self {
            exec,
            program: "goose".to_string(),
            version_table: DEFAULT_VERSION_TABLE.to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_version_table(mut self, table: impl Into<String>) -> Self {
        self.version_table = table.into();
        self
    }

    fn args(&self, database_url: &str, migrations_dir: &Path, verb: &str) -> Vec<String> {
        let mut args = vec![
            "-dir".to_string(),
            migrations_dir.display().to_string(),
        ];
        if self.version_table != DEFAULT_VERSION_TABLE {
            args.push("-table".to_string());
            args.push(self.version_table.clone());
        }
        args.push("postgres".to_string());
        args.push(database_url.to_string());
        args.push(verb.to_string());
        args
    }

    async fn invoke(&self, database_url: &str, migrations_dir: &Path, verb: &str) -> DbResult<()> {
        let args = self.args(database_url, migrations_dir, verb);
        self.exec.run(&self.program, &args).await
    }

    /// Query reading applied versions, ascending.
    ///
    /// goose seeds its table with a version 0 row; it is not a migration.
    pub fn applied_versions_sql(&self) -> String {
        format!(
            "SELECT DISTINCT version_id FROM {} WHERE is_applied AND version_id > 0 ORDER BY version_id",
            quote_dotted(&self.version_table)
        )
    }
}

#[async_trait]
impl MigrationRunner for GooseRunner {
    async fn apply_all(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()> {
        self.invoke(database_url, migrations_dir, "up").await
    }

    async fn apply_next(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()> {
        self.invoke(database_url, migrations_dir, "up-by-one").await
    }

    async fn rollback_last(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()> {
        self.invoke(database_url, migrations_dir, "down").await
    }

    async fn status(&self, database_url: &str, migrations_dir: &Path) -> DbResult<()> {
        self.invoke(database_url, migrations_dir, "status").await
    }

    async fn applied_versions(&self, database_url: &str) -> DbResult<Vec<AppliedVersion>> {
        let sql = self.applied_versions_sql();
        let output = self.exec.run_sql(database_url, &sql).await?;
        parse_versions(&output, &sql)
    }

    fn version_table(&self) -> &str {
        &self.version_table
    }
}

fn parse_versions(output: &str, sql: &str) -> DbResult<Vec<AppliedVersion>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            AppliedVersion::try_new(line).ok_or_else(|| DbError::UnexpectedOutput {
                command: sql.to_string(),
                message: format!("'{}' is not a version", line),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Call, RecordingExecutor};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_apply_all_invokes_up() {
        let exec = Arc::new(RecordingExecutor::new());
        let runner = GooseRunner::new(exec.clone());
        runner
            .apply_all("postgres://localhost/app", Path::new("migrations"))
            .await
            .unwrap();

        assert_eq!(
            exec.calls(),
            vec![Call::Run {
                program: "goose".to_string(),
                args: vec![
                    "-dir".to_string(),
                    "migrations".to_string(),
                    "postgres".to_string(),
                    "postgres://localhost/app".to_string(),
                    "up".to_string(),
                ],
            }]
        );
    }

    #[tokio::test]
    async fn test_verbs() {
        let exec = Arc::new(RecordingExecutor::new());
        let runner = GooseRunner::new(exec.clone()).with_program("/opt/goose");
        let dir = PathBuf::from("m");
        runner.apply_next("u", &dir).await.unwrap();
        runner.rollback_last("u", &dir).await.unwrap();
        runner.status("u", &dir).await.unwrap();

        let verbs: Vec<String> = exec
            .calls()
            .into_iter()
            .map(|c| match c {
                Call::Run { program, args } => {
                    assert_eq!(program, "/opt/goose");
                    args.last().unwrap().clone()
                }
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(verbs, vec!["up-by-one", "down", "status"]);
    }

    #[tokio::test]
    async fn test_custom_table_is_passed_to_goose() {
        let exec = Arc::new(RecordingExecutor::new());
        let runner = GooseRunner::new(exec.clone()).with_version_table("meta.versions");
        runner.apply_all("u", Path::new("m")).await.unwrap();
        match &exec.calls()[0] {
            Call::Run { args, .. } => {
                assert!(args.windows(2).any(|w| w[0] == "-table" && w[1] == "meta.versions"));
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert!(runner.applied_versions_sql().contains(r#""meta"."versions""#));
    }

    #[tokio::test]
    async fn test_applied_versions_parsed_in_order() {
        let exec = Arc::new(RecordingExecutor::new());
        exec.push_output("20240101000000\n20240102000000\n\n");
        let runner = GooseRunner::new(exec.clone());
        let versions = runner.applied_versions("u").await.unwrap();
        let versions: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(versions, vec!["20240101000000", "20240102000000"]);

        match &exec.calls()[0] {
            Call::Sql { sql, .. } => {
                assert!(sql.contains(r#"FROM "goose_db_version""#));
                assert!(sql.contains("ORDER BY version_id"));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_applied_versions_empty() {
        let exec = Arc::new(RecordingExecutor::new());
        exec.push_output("");
        let runner = GooseRunner::new(exec);
        assert!(runner.applied_versions("u").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_applied_versions_rejects_garbage() {
        let exec = Arc::new(RecordingExecutor::new());
        exec.push_output("(0 rows)\n");
        let runner = GooseRunner::new(exec);
        let err = runner.applied_versions("u").await.unwrap_err();
        assert!(matches!(err, DbError::UnexpectedOutput { .. }));
    }
}
