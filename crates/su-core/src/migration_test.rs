use super::*;
use std::fs;
use tempfile::tempdir;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), "-- +goose Up\n").unwrap();
}

#[test]
fn test_split_file_name() {
    let (version, slug) = split_file_name("20240101000000_init.sql").unwrap();
    assert_eq!(version.as_str(), "20240101000000");
    assert_eq!(slug, "init");
}

#[test]
fn test_split_file_name_keeps_underscores_in_slug() {
    let (_, slug) = split_file_name("20240101000000_add_user_email.sql").unwrap();
    assert_eq!(slug, "add_user_email");
}

#[test]
fn test_split_file_name_rejects_short_version() {
    assert!(matches!(
        split_file_name("2024_init.sql"),
        Err(CoreError::InvalidMigrationName { .. })
    ));
}

#[test]
fn test_split_file_name_rejects_other_extensions() {
    assert!(split_file_name("20240101000000_init.sql.bak").is_err());
    assert!(!is_migration_file_name("README.md"));
}

#[test]
fn test_list_all_sorted_newest_first() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "20240101000000_init.sql");
    touch(dir.path(), "20240103000000_add_index.sql");
    touch(dir.path(), "20240102000000_add_col.sql");

    let files = list_all(dir.path()).unwrap();
    let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();
    assert_eq!(
        names,
        vec![
            "20240103000000_add_index.sql",
            "20240102000000_add_col.sql",
            "20240101000000_init.sql",
        ]
    );
}

#[test]
fn test_list_all_ties_broken_by_slug() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "20240101000000_alpha.sql");
    touch(dir.path(), "20240101000000_beta.sql");

    let files = list_all(dir.path()).unwrap();
    assert_eq!(files[0].slug, "beta");
    assert_eq!(files[1].slug, "alpha");
}

#[test]
fn test_list_all_skips_foreign_files_and_dirs() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "20240101000000_init.sql");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "seed.sql");
    fs::create_dir(dir.path().join("20240102000000_dir.sql")).unwrap();

    let files = list_all(dir.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].slug, "init");
}

#[test]
fn test_list_all_empty_directory() {
    let dir = tempdir().unwrap();
    assert!(list_all(dir.path()).unwrap().is_empty());
}

#[test]
fn test_list_all_missing_directory_is_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = list_all(&missing).unwrap_err();
    assert!(matches!(err, CoreError::DirectoryError { .. }));
    assert!(err.to_string().contains("nope"));
}

#[test]
fn test_file_name_ignores_prefix() {
    assert_eq!(
        file_name(Path::new("db/migrations/20240101000000_init.sql")),
        file_name(Path::new("/abs/repo/db/migrations/20240101000000_init.sql"))
    );
}
