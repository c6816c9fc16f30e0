// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests for the chunk table, both called directly and queried
//! through DataFusion SQL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_array::{Array, BinaryArray, Int64Array, StringArray};
use chunktable::testing::{FakeMetadata, OTHER_UID};
use chunktable::{
    ChunkTable, ConstraintSet, ConstraintValue, Operator, TableConfig, TableDescriptor,
    TableRegistry,
};
use datafusion::prelude::SessionContext;
use tempfile::TempDir;

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

/// a.txt: 1500 bytes, b.txt: 300 bytes, c.log: 10 bytes
fn create_test_tree() -> (TempDir, Vec<u8>) {
    let dir = TempDir::new().expect("create temp dir");
    let a = patterned(1500);
    std::fs::write(dir.path().join("a.txt"), &a).unwrap();
    std::fs::write(dir.path().join("b.txt"), patterned(300)).unwrap();
    std::fs::write(dir.path().join("c.log"), b"0123456789").unwrap();
    (dir, a)
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

fn text(s: impl Into<String>) -> ConstraintValue {
    ConstraintValue::Text(s.into())
}

fn path_equals(path: &Path) -> ConstraintSet {
    ConstraintSet::new().with("path", Operator::Equals, text(path_str(path)))
}

fn b_is_foreign(dir: &TempDir) -> ChunkTable {
    FakeMetadata::default()
        .with_owner(dir.path().join("b.txt"), OTHER_UID)
        .chunk_table(&TableConfig::default())
        .unwrap()
}

#[tokio::test]
async fn test_first_window_defaults_to_offset_zero() {
    let (dir, a) = create_test_tree();
    let table = b_is_foreign(&dir);
    let a_path = dir.path().join("a.txt");

    let rows = table.generate_rows(&path_equals(&a_path)).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].path, path_str(&a_path));
    assert_eq!(rows[0].offset, 0);
    assert_eq!(rows[0].size, 1024);
    assert_eq!(rows[0].bytes, &a[..1024]);
}

#[tokio::test]
async fn test_second_window_is_short() {
    let (dir, a) = create_test_tree();
    let table = b_is_foreign(&dir);
    let constraints = path_equals(&dir.path().join("a.txt")).with(
        "offset",
        Operator::Equals,
        ConstraintValue::Integer(1024),
    );

    let rows = table.generate_rows(&constraints).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].offset, 1024);
    assert_eq!(rows[0].size, 476);
    assert_eq!(rows[0].bytes, &a[1024..]);
}

#[tokio::test]
async fn test_offset_past_end_has_no_rows() {
    let (dir, _) = create_test_tree();
    let table = b_is_foreign(&dir);
    let constraints = path_equals(&dir.path().join("a.txt")).with(
        "offset",
        Operator::Equals,
        ConstraintValue::Integer(2000),
    );

    assert!(table.generate_rows(&constraints).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_foreign_owned_file_filtered_from_pattern() {
    let (dir, _) = create_test_tree();
    let table = b_is_foreign(&dir);
    let like = format!("{}/%.txt", dir.path().display());
    let constraints = ConstraintSet::new().with("path", Operator::Like, text(like));

    let rows = table.generate_rows(&constraints).await.unwrap();

    let paths: Vec<_> = rows.iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec![path_str(&dir.path().join("a.txt"))]);
}

#[tokio::test]
async fn test_foreign_owned_file_denied_by_equality() {
    let (dir, _) = create_test_tree();
    let table = b_is_foreign(&dir);

    let rows = table
        .generate_rows(&path_equals(&dir.path().join("b.txt")))
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_missing_and_directory_paths_skipped() {
    let (dir, _) = create_test_tree();
    let table = b_is_foreign(&dir);
    let constraints = ConstraintSet::new()
        .with("path", Operator::Equals, text(path_str(&dir.path().join("nope"))))
        .with("path", Operator::Equals, text(path_str(dir.path())))
        .with("path", Operator::Equals, text(path_str(&dir.path().join("c.log"))));

    let rows = table.generate_rows(&constraints).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].bytes, b"0123456789");
}

#[tokio::test]
async fn test_identity_failure_returns_nothing() {
    let (dir, _) = create_test_tree();
    let constraints = path_equals(&dir.path().join("a.txt"));

    for metadata in [
        FakeMetadata {
            self_rows: 0,
            ..FakeMetadata::default()
        },
        FakeMetadata {
            self_rows: 2,
            ..FakeMetadata::default()
        },
        FakeMetadata {
            process_rows: 0,
            ..FakeMetadata::default()
        },
        FakeMetadata {
            process_rows: 3,
            ..FakeMetadata::default()
        },
    ] {
        let table = metadata.chunk_table(&TableConfig::default()).unwrap();
        assert!(table.generate_rows(&constraints).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_repeated_query_is_identical() {
    let (dir, _) = create_test_tree();
    let table = b_is_foreign(&dir);
    let constraints = ConstraintSet::new()
        .with("path", Operator::Like, text(format!("{}/%", dir.path().display())))
        .with("offset", Operator::Equals, ConstraintValue::Integer(5));

    let first = table.generate_rows(&constraints).await.unwrap();
    let second = table.generate_rows(&constraints).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_each_path_appears_once() {
    let (dir, _) = create_test_tree();
    let table = b_is_foreign(&dir);
    let a = path_str(&dir.path().join("a.txt"));
    let constraints = ConstraintSet::new()
        .with("path", Operator::Equals, text(a.clone()))
        .with("path", Operator::Equals, text(a.clone()))
        .with("path", Operator::Like, text(format!("{}/a%", dir.path().display())));

    let rows = table.generate_rows(&constraints).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].path, a);
}

#[tokio::test]
async fn test_pattern_with_punctuation_reads_owned_file() {
    let (dir, _) = create_test_tree();
    std::fs::write(dir.path().join("wow!_1.txt"), b"bang").unwrap();
    std::fs::write(dir.path().join("wow!X1.txt"), b"other").unwrap();
    let table = b_is_foreign(&dir);
    let like = format!("{}/wow!_%", dir.path().display());

    let rows = table
        .generate_rows(&ConstraintSet::new().with("path", Operator::Like, text(like)))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].path, path_str(&dir.path().join("wow!_1.txt")));
    assert_eq!(rows[0].bytes, b"bang");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_host_table_reads_own_files() {
    let (dir, a) = create_test_tree();
    let table = ChunkTable::host(&TableConfig::default()).unwrap();

    let rows = table
        .generate_rows(&path_equals(&dir.path().join("a.txt")))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].bytes, &a[..1024]);
}

// SQL through DataFusion

fn session(table: ChunkTable) -> SessionContext {
    let mut registry = TableRegistry::new();
    registry
        .register(TableDescriptor::table("challenge", "0.0.1", Arc::new(table)))
        .unwrap();
    let ctx = SessionContext::new();
    registry.attach(&ctx).unwrap();
    ctx
}

async fn query(ctx: &SessionContext, sql: &str) -> Vec<RecordBatch> {
    ctx.sql(sql).await.unwrap().collect().await.unwrap()
}

fn total_rows(batches: &[RecordBatch]) -> usize {
    batches.iter().map(|b| b.num_rows()).sum()
}

fn single_row(batches: &[RecordBatch]) -> (String, i64, Vec<u8>, i64) {
    let batch = batches.iter().find(|b| b.num_rows() > 0).unwrap();
    assert_eq!(total_rows(batches), 1);
    let column = |name: &str| batch.column_by_name(name).unwrap().clone();
    let path = column("path");
    let offset = column("offset");
    let bytes = column("bytes");
    let size = column("size");
    (
        path.as_any().downcast_ref::<StringArray>().unwrap().value(0).to_string(),
        offset.as_any().downcast_ref::<Int64Array>().unwrap().value(0),
        bytes.as_any().downcast_ref::<BinaryArray>().unwrap().value(0).to_vec(),
        size.as_any().downcast_ref::<Int64Array>().unwrap().value(0),
    )
}

#[tokio::test]
async fn test_sql_windows() {
    let (dir, a) = create_test_tree();
    let ctx = session(b_is_foreign(&dir));
    let a_path: PathBuf = dir.path().join("a.txt");

    let batches = query(
        &ctx,
        &format!("SELECT * FROM challenge WHERE path = '{}'", a_path.display()),
    )
    .await;
    let (path, offset, bytes, size) = single_row(&batches);
    assert_eq!(path, path_str(&a_path));
    assert_eq!((offset, size), (0, 1024));
    assert_eq!(bytes, &a[..1024]);

    let batches = query(
        &ctx,
        &format!(
            "SELECT * FROM challenge WHERE path = '{}' AND \"offset\" = 1024",
            a_path.display()
        ),
    )
    .await;
    let (_, offset, bytes, size) = single_row(&batches);
    assert_eq!((offset, size), (1024, 476));
    assert_eq!(bytes, &a[1024..]);

    let batches = query(
        &ctx,
        &format!(
            "SELECT * FROM challenge WHERE path = '{}' AND \"offset\" = 2000",
            a_path.display()
        ),
    )
    .await;
    assert_eq!(total_rows(&batches), 0);
}

#[tokio::test]
async fn test_sql_like_respects_ownership() {
    let (dir, _) = create_test_tree();
    let ctx = session(b_is_foreign(&dir));

    let batches = query(
        &ctx,
        &format!(
            "SELECT path, size FROM challenge WHERE path LIKE '{}/%.txt'",
            dir.path().display()
        ),
    )
    .await;

    assert_eq!(total_rows(&batches), 1);
    let batch = batches.iter().find(|b| b.num_rows() > 0).unwrap();
    assert_eq!(batch.num_columns(), 2);
    let paths = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(paths.value(0), path_str(&dir.path().join("a.txt")));
}

#[tokio::test]
async fn test_sql_in_list() {
    let (dir, _) = create_test_tree();
    let ctx = session(b_is_foreign(&dir));

    let batches = query(
        &ctx,
        &format!(
            "SELECT path FROM challenge WHERE path IN ('{}', '{}', '{}')",
            dir.path().join("a.txt").display(),
            dir.path().join("b.txt").display(),
            dir.path().join("c.log").display(),
        ),
    )
    .await;

    assert_eq!(total_rows(&batches), 2);
}

#[tokio::test]
async fn test_sql_requires_path_constraint() {
    let (dir, _) = create_test_tree();
    let ctx = session(b_is_foreign(&dir));

    let result = match ctx.sql("SELECT * FROM challenge").await {
        Ok(df) => df.collect().await.map(|_| ()),
        Err(e) => Err(e),
    };

    let err = result.unwrap_err().to_string();
    assert!(err.contains("requires a constraint on column 'path'"), "{err}");
}

#[tokio::test]
async fn test_sql_count_matches_direct_generate() {
    let (dir, _) = create_test_tree();
    let like = format!("{}/%", dir.path().display());
    let direct = b_is_foreign(&dir)
        .generate_rows(&ConstraintSet::new().with("path", Operator::Like, text(like.clone())))
        .await
        .unwrap();
    let ctx = session(b_is_foreign(&dir));

    let batches = query(
        &ctx,
        &format!("SELECT path FROM challenge WHERE path LIKE '{}'", like),
    )
    .await;

    assert_eq!(total_rows(&batches), direct.len());
    assert!(!batches.iter().any(|b| b.column(0).null_count() > 0));
}
