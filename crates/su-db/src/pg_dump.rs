//! pg_dump-backed schema dumper

use crate::error::DbResult;
use crate::traits::{Executor, SchemaDumper};
use async_trait::async_trait;
use std::sync::Arc;

pub struct PgDump {
    exec: Arc<dyn Executor>,
    program: String,
}

impl PgDump {
    pub fn new(exec: Arc<dyn Executor>) -> Self {
        Self {
            exec,
            program: "pg_dump".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl SchemaDumper for PgDump {
    async fn dump_schema(&self, database_url: &str, exclude_tables: &[String]) -> DbResult<String> {
        let mut args = vec![
            database_url.to_string(),
            "--schema-only".to_string(),
            "--no-owner".to_string(),
            "--no-privileges".to_string(),
        ];
        args.extend(exclude_tables.iter().map(|t| format!("--exclude-table={}", t)));
        self.exec.run_with_output(&self.program, &args).await
    }
}
