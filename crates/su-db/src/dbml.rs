//! DBML schema documentation through the external `dbml` tool

use crate::error::DbResult;
use crate::traits::{DocGenerator, DocOptions, Executor};
use crate::url::ensure_ssl_mode;
use async_trait::async_trait;
use std::sync::Arc;

pub struct DbmlCli {
    exec: Arc<dyn Executor>,
    program: String,
}

impl DbmlCli {
    pub fn new(exec: Arc<dyn Executor>) -> Self {
        Self {
            exec,
            program: "dbml".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

fn dbml_args(database_url: &str, options: &DocOptions) -> Vec<String> {
    let mut args = vec!["--url".to_string(), ensure_ssl_mode(database_url)];
    if let Some(output) = &options.output {
        args.push("--output".to_string());
        args.push(output.display().to_string());
    }
    if options.all_schemas {
        args.push("--all-schemas".to_string());
    } else if !options.schemas.is_empty() {
        args.push("--schemas".to_string());
        args.push(options.schemas.join(","));
    }
    if !options.exclude_tables.is_empty() {
        args.push("--exclude-tables".to_string());
        args.push(options.exclude_tables.join(","));
    }
    args
}

#[async_trait]
impl DocGenerator for DbmlCli {
    async fn generate(&self, database_url: &str, options: &DocOptions) -> DbResult<()> {
        let args = dbml_args(database_url, options);
        self.exec.run(&self.program, &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_minimal_args_add_sslmode() {
        let args = dbml_args("postgres://app@localhost:5432/shop", &DocOptions::default());
        assert_eq!(
            args,
            vec!["--url", "postgres://app@localhost:5432/shop?sslmode=disable"]
        );
    }

    #[test]
    fn test_all_schemas_wins_over_list() {
        let options = DocOptions {
            output: Some(PathBuf::from("schema.dbml")),
            schemas: vec!["public".to_string(), "sales".to_string()],
            exclude_tables: vec!["goose_db_version".to_string()],
            all_schemas: true,
        };
        let args = dbml_args("postgres://app@localhost/shop?sslmode=require", &options);
        assert!(args.contains(&"--all-schemas".to_string()));
        assert!(!args.contains(&"--schemas".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--output" && w[1] == "schema.dbml"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "--exclude-tables" && w[1] == "goose_db_version"));
    }

    #[test]
    fn test_schema_list_joined() {
        let options = DocOptions {
            schemas: vec!["public".to_string(), "sales".to_string()],
            ..DocOptions::default()
        };
        let args = dbml_args("postgres://app@localhost/shop", &options);
        assert!(args.windows(2).any(|w| w[0] == "--schemas" && w[1] == "public,sales"));
    }
}
