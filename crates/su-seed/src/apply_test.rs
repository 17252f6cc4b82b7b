use super::*;
use std::fs;
use std::sync::Arc;
use su_db::test_utils::{Call, FakeDumper, FakeRunner, RecordingExecutor};
use su_db::DbError;
use tempfile::TempDir;

const URL: &str = "postgres://app@localhost/app";

struct Fixture {
    exec: Arc<RecordingExecutor>,
    runner: Arc<FakeRunner>,
    seeder: Seeder,
    dir: TempDir,
}

fn fixture(runner: FakeRunner) -> Fixture {
    let exec = Arc::new(RecordingExecutor::new());
    let runner = Arc::new(runner);
    let seeder = Seeder::new(exec.clone(), runner.clone(), Arc::new(FakeDumper::new("")));
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("migrations")).unwrap();
    fs::create_dir_all(dir.path().join("seed")).unwrap();
    Fixture {
        exec,
        runner,
        seeder,
        dir,
    }
}

impl Fixture {
    fn migrations(&self) -> std::path::PathBuf {
        self.dir.path().join("migrations")
    }

    fn seed(&self) -> std::path::PathBuf {
        self.dir.path().join("seed")
    }

    fn write_csv(&self, name: &str, contents: &str) {
        fs::write(self.seed().join(name), contents).unwrap();
    }

    async fn apply(&self) -> SeedResult<ApplyReport> {
        self.seeder.apply(URL, &self.migrations(), &self.seed()).await
    }

    fn scripts(&self) -> Vec<String> {
        self.exec
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SqlFile { script, .. } => Some(script),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn test_empty_seed_dir_only_migrates() {
    let f = fixture(FakeRunner::default());
    let report = f.apply().await.unwrap();

    assert!(report.loaded.is_empty());
    assert_eq!(f.runner.verbs(), vec!["up-by-one", "up"]);
    assert!(f.exec.calls().is_empty());
}

#[tokio::test]
async fn test_missing_seed_dir_is_empty() {
    let f = fixture(FakeRunner::default());
    let missing = f.dir.path().join("nope");
    f.seeder.apply(URL, &f.migrations(), &missing).await.unwrap();
    assert_eq!(f.runner.verbs(), vec!["up-by-one", "up"]);
}

#[tokio::test]
async fn test_load_between_baseline_and_rest() {
    let f = fixture(FakeRunner::default());
    f.write_csv("public.users.csv", "id,email\n1,a@example.com\n");
    f.write_csv("sales.orders.csv", "order_id,user_id\n7,1\n");
    f.write_csv("notes.txt", "ignored");

    let report = f.apply().await.unwrap();

    assert_eq!(
        report.loaded,
        vec![TableInfo::new("public", "users"), TableInfo::new("sales", "orders")]
    );
    assert_eq!(f.runner.verbs(), vec!["up-by-one", "up"]);

    let scripts = f.scripts();
    assert_eq!(scripts.len(), 1);
    let script = &scripts[0];
    let users_csv = fs::canonicalize(f.seed().join("public.users.csv")).unwrap();
    assert!(script.starts_with("BEGIN;\nSET session_replication_role = 'replica';\n"));
    assert!(script.contains(&format!(
        "\\copy \"public\".\"users\" FROM '{}' WITH CSV HEADER",
        users_csv.display()
    )));
    assert!(script.contains("UPDATE \"sales\".\"orders\" SET \"order_id\" = \"order_id\";"));
    assert!(script.ends_with("SET session_replication_role = 'origin';\n\
         UPDATE \"public\".\"users\" SET \"id\" = \"id\";\n\
         UPDATE \"sales\".\"orders\" SET \"order_id\" = \"order_id\";\n\
         COMMIT;\n"));
}

#[tokio::test]
async fn test_stem_without_schema_targets_public() {
    let f = fixture(FakeRunner::default());
    f.write_csv("users.csv", "id\n1\n");
    let report = f.apply().await.unwrap();
    assert_eq!(report.loaded, vec![TableInfo::new("public", "users")]);
}

#[tokio::test]
async fn test_empty_csv_rejected_before_migrating() {
    let f = fixture(FakeRunner::default());
    f.write_csv("public.users.csv", "id\n1\n");
    f.write_csv("public.empty.csv", "");

    let err = f.apply().await.unwrap_err();
    match err {
        SeedError::MalformedSeedFile { path, reason } => {
            assert!(path.ends_with("public.empty.csv"));
            assert_eq!(reason, "missing header row");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(f.runner.verbs().is_empty());
    assert!(f.exec.calls().is_empty());
}

#[tokio::test]
async fn test_blank_first_header_rejected() {
    let f = fixture(FakeRunner::default());
    f.write_csv("public.users.csv", " ,email\n1,a\n");
    assert!(matches!(
        f.apply().await,
        Err(SeedError::MalformedSeedFile { .. })
    ));
    assert!(f.runner.verbs().is_empty());
}

#[tokio::test]
async fn test_load_failure_stops_after_baseline() {
    let f = fixture(FakeRunner::default());
    f.write_csv("public.users.csv", "id\n1\n");
    f.exec.push_error(DbError::ExternalProcess {
        command: "psql".to_string(),
        status: "exit code 3".to_string(),
        stderr: "ERROR: insert or update violates foreign key constraint".to_string(),
    });

    let err = f.apply().await.unwrap_err();
    assert!(matches!(err, SeedError::Db(DbError::ExternalProcess { .. })));
    assert_eq!(f.runner.verbs(), vec!["up-by-one"]);
}

#[tokio::test]
async fn test_baseline_failure_skips_load() {
    let f = fixture(FakeRunner::default().failing_on("up-by-one"));
    f.write_csv("public.users.csv", "id\n1\n");

    assert!(f.apply().await.is_err());
    assert!(f.exec.calls().is_empty());
}

#[test]
fn test_read_seed_file_trims_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("billing.invoices.csv");
    fs::write(&path, "  invoice_id ,amount\n").unwrap();

    let file = read_seed_file(&path).unwrap();
    assert_eq!(file.table, TableInfo::new("billing", "invoices"));
    assert_eq!(file.first_column, "invoice_id");
    assert!(file.path.is_absolute());
}

#[cfg(unix)]
#[tokio::test]
async fn test_line_break_in_file_name_rejected_before_migrating() {
    let f = fixture(FakeRunner::default());
    f.write_csv("public.t\n\\! touch owned.csv", "id\n1\n");

    match f.apply().await.unwrap_err() {
        SeedError::MalformedSeedFile { reason, .. } => {
            assert_eq!(reason, "file name contains a line break");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(f.runner.verbs().is_empty());
    assert!(f.exec.calls().is_empty());
}
