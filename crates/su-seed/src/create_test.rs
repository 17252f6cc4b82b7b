use super::*;
use std::fs;
use std::sync::Arc;
use su_db::test_utils::{Call, FakeDumper, FakeRunner, RecordingExecutor};
use su_db::{DbError, DbResult};
use tempfile::TempDir;

const URL: &str = "postgres://app@localhost/app";

const TABLE_ROWS: &str = "public\tgoose_db_version\npublic\tusers\nsales\torders\n";

/// Stand in for psql: write a small CSV wherever a `\copy ... TO` points.
fn fake_export(_path: &Path, script: &str) -> DbResult<()> {
    for line in script.lines().filter(|l| l.starts_with("\\copy")) {
        let target = line
            .split(" TO '")
            .nth(1)
            .and_then(|rest| rest.strip_suffix("' CSV HEADER"))
            .expect("copy target");
        fs::write(target, "id\n1\n").expect("write export");
    }
    Ok(())
}

struct Fixture {
    exec: Arc<RecordingExecutor>,
    runner: Arc<FakeRunner>,
    seeder: Seeder,
    dir: TempDir,
}

fn fixture(exec: RecordingExecutor) -> Fixture {
    exec.push_output(TABLE_ROWS);
    let exec = Arc::new(exec);
    let runner = Arc::new(FakeRunner::with_applied(&["20240101000000", "20240102000000"]));
    let dumper = Arc::new(FakeDumper::new("CREATE TABLE public.users (id bigint);"));
    let seeder = Seeder::new(exec.clone(), runner.clone(), dumper);

    let dir = TempDir::new().unwrap();
    let migrations = dir.path().join("migrations");
    let seed = dir.path().join("seed").join("dev");
    fs::create_dir_all(&migrations).unwrap();
    fs::create_dir_all(&seed).unwrap();
    fs::write(migrations.join("20240101000000_init.sql"), "-- init\n").unwrap();
    fs::write(migrations.join("20240102000000_users.sql"), "-- users\n").unwrap();
    fs::write(seed.join("public.stale.csv"), "id\n9\n").unwrap();
    fs::write(seed.join("README.md"), "dev seed\n").unwrap();

    Fixture {
        exec,
        runner,
        seeder,
        dir,
    }
}

impl Fixture {
    fn migrations(&self) -> PathBuf {
        self.dir.path().join("migrations")
    }

    fn seed(&self) -> PathBuf {
        self.dir.path().join("seed").join("dev")
    }

    fn query(&self) -> PathBuf {
        self.dir.path().join("seed").join("dev.sql")
    }

    async fn create(&self, dry_run: bool) -> SeedResult<CreateReport> {
        self.seeder
            .create(
                URL,
                &self.migrations(),
                &self.seed(),
                Some(&self.query()),
                CreateOptions { dry_run },
            )
            .await
    }

    fn script(&self) -> String {
        self.exec
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::SqlFile { script, .. } => Some(script),
                _ => None,
            })
            .expect("extraction script ran")
    }
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_create_replaces_seed_and_flattens() {
    let f = fixture(RecordingExecutor::new().with_sql_file_hook(fake_export));
    fs::write(
        f.query(),
        "INSERT INTO pg_temp.\"seed.public.users\" SELECT * FROM public.users LIMIT 5;",
    )
    .unwrap();

    let report = f.create(false).await.unwrap();

    assert_eq!(
        report.tables,
        vec![TableInfo::new("public", "users"), TableInfo::new("sales", "orders")]
    );
    assert_eq!(report.files, vec!["public.users.csv", "sales.orders.csv"]);
    assert!(report.flatten.is_some());

    assert_eq!(
        listing(&f.seed()),
        vec!["README.md", "public.users.csv", "sales.orders.csv"]
    );
    assert_eq!(
        fs::read_to_string(f.seed().join("public.users.csv")).unwrap(),
        "id\n1\n"
    );
    assert_eq!(listing(&f.migrations()), vec!["20240102000000_initial.sql"]);

    let script = f.script();
    assert!(!script.contains("goose_db_version"));
    assert!(script.contains("SELECT * FROM public.users LIMIT 5;"));
    assert!(script.contains("\\echo Exported sales.orders"));
}

#[tokio::test]
async fn test_table_listing_query_first() {
    let f = fixture(RecordingExecutor::new().with_sql_file_hook(fake_export));
    f.create(true).await.unwrap();

    match &f.exec.calls()[0] {
        Call::Sql { url, sql } => {
            assert_eq!(url, URL);
            assert_eq!(sql, TABLES_SQL);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn test_dry_run_leaves_files_untouched() {
    let f = fixture(RecordingExecutor::new().with_sql_file_hook(fake_export));
    let seed_before = listing(&f.seed());
    let migrations_before = listing(&f.migrations());

    let report = f.create(true).await.unwrap();

    assert!(report.flatten.is_none());
    assert_eq!(report.files.len(), 2);
    assert_eq!(listing(&f.seed()), seed_before);
    assert_eq!(listing(&f.migrations()), migrations_before);
    assert_eq!(
        fs::read_to_string(f.seed().join("public.stale.csv")).unwrap(),
        "id\n9\n"
    );
    assert!(f.runner.verbs().is_empty());
}

#[tokio::test]
async fn test_missing_query_file_exports_empty_staging() {
    let f = fixture(RecordingExecutor::new().with_sql_file_hook(fake_export));
    f.create(true).await.unwrap();

    let script = f.script();
    assert!(!script.contains("\n\n"));
    assert!(script.starts_with("CREATE TEMP TABLE pg_temp.\"seed.public.users\""));
}

#[tokio::test]
async fn test_unreadable_query_file_is_fatal() {
    let f = fixture(RecordingExecutor::new());
    fs::create_dir_all(f.query()).unwrap();

    let err = f.create(false).await.unwrap_err();
    assert!(matches!(err, SeedError::QueryFile { .. }));
    assert_eq!(listing(&f.seed()), vec!["README.md", "public.stale.csv"]);
}

#[tokio::test]
async fn test_failed_extraction_keeps_existing_seed() {
    let exec = RecordingExecutor::new().with_sql_file_hook(|_, _| {
        Err(DbError::ExternalProcess {
            command: "psql".to_string(),
            status: "exit code 3".to_string(),
            stderr: "ERROR: relation \"users\" does not exist".to_string(),
        })
    });
    let f = fixture(exec);

    assert!(matches!(f.create(false).await, Err(SeedError::Db(_))));
    assert_eq!(listing(&f.seed()), vec!["README.md", "public.stale.csv"]);
    assert_eq!(listing(&f.migrations()).len(), 2);
    assert!(f.runner.verbs().is_empty());
}

#[tokio::test]
async fn test_malformed_listing_row() {
    let exec = RecordingExecutor::new();
    exec.push_output("public users without separator\n");
    let seeder = Seeder::new(
        Arc::new(exec),
        Arc::new(FakeRunner::default()),
        Arc::new(FakeDumper::new("")),
    );
    let dir = TempDir::new().unwrap();
    let err = seeder
        .create(URL, dir.path(), dir.path(), None, CreateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SeedError::TableListing { .. }));
}

#[tokio::test]
async fn test_line_break_in_listed_table_rejected() {
    let exec = RecordingExecutor::new();
    exec.push_output("public\tusers\npublic\tt\r\\! touch owned\n");
    let exec = Arc::new(exec);
    let seeder = Seeder::new(
        exec.clone(),
        Arc::new(FakeRunner::default()),
        Arc::new(FakeDumper::new("")),
    );
    let dir = TempDir::new().unwrap();
    let err = seeder
        .create(URL, dir.path(), dir.path(), None, CreateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SeedError::Core(su_core::CoreError::LineBreakInMetaCommand { .. })
    ));
    assert_eq!(exec.calls().len(), 1);
}
