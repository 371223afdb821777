//! File-level round trips through the atomic writer and resilient reader.

use serde::{Deserialize, Serialize};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use trellis_jsonl::{read_jsonl_resilient, write_jsonl_atomic, write_jsonl_atomic_iter, Warning};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Feature {
    id: String,
    name: String,
    items: Vec<String>,
}

fn feature(id: &str, items: &[&str]) -> Feature {
    Feature {
        id: id.to_string(),
        name: format!("Feature {id}"),
        items: items.iter().map(ToString::to_string).collect(),
    }
}

#[tokio::test]
async fn written_file_reads_back_without_warnings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.jsonl");
    let features = vec![feature("f1", &["a", "b"]), feature("f2", &[])];

    write_jsonl_atomic(&path, &features).await.unwrap();
    let (loaded, warnings): (Vec<Feature>, _) = read_jsonl_resilient(&path).await.unwrap();

    assert!(warnings.is_empty());
    assert_eq!(loaded, features);
}

#[tokio::test]
async fn iterator_variant_writes_lazily_built_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.jsonl");

    write_jsonl_atomic_iter(&path, (0..3).map(|i| feature(&format!("f{i}"), &[])))
        .await
        .unwrap();

    let (loaded, _): (Vec<Feature>, _) = read_jsonl_resilient(&path).await.unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[2].id, "f2");
}

#[tokio::test]
async fn corrupted_lines_become_warnings() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"id":"f1","name":"One","items":[]}}"#).unwrap();
    writeln!(file, r#"{{"id":"f2","name":"#).unwrap();
    writeln!(file).unwrap();
    writeln!(file, r#"{{"id":"f3","name":"Three","items":["x"]}}"#).unwrap();
    file.flush().unwrap();

    let (loaded, warnings): (Vec<Feature>, _) = read_jsonl_resilient(file.path()).await.unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].id, "f3");
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], Warning::MalformedJson { line_number: 2, .. }));
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let result = read_jsonl_resilient::<Feature, _>(dir.path().join("absent.jsonl")).await;
    assert!(matches!(result, Err(trellis_jsonl::Error::Io(_))));
}
