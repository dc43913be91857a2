mod common;

use common::{attrs, EventLog, Outcome};
use modelkit_core::db::open_db_in_memory;
use modelkit_core::{CoreConfig, ModelType, SqliteBackend};
use serde_json::json;
use std::rc::Rc;

#[test]
fn save_generates_an_id_and_stores_the_record() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend.clone()).build();
    let post = posts.instantiate(attrs(json!({"title": "draft"})));
    let log = EventLog::new();
    let sink = log.clone();
    post.on("change:id", move |_, _| sink.push("change:id"));

    let outcome = Outcome::new();
    post.save_with(outcome.callback());

    assert_eq!(outcome.results(), vec![true]);
    assert_eq!(log.entries(), vec!["change:id"]);
    let id = post.id().expect("generated id");
    let id = id.as_str().expect("string id").to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert!(!post.has_changes());
    assert!(!post.is_new());

    let stored = backend.fetch("Post", &json!(id)).unwrap().expect("stored record");
    assert_eq!(stored, attrs(json!({"title": "draft", "id": id})));
    assert_eq!(backend.count("Post").unwrap(), 1);
}

#[test]
fn resave_updates_the_same_row() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend.clone()).build();
    let post = posts.instantiate(attrs(json!({"id": 7, "title": "v1"})));

    post.save();
    post.set("title", "v2").save();

    assert_eq!(backend.count("Post").unwrap(), 1);
    let stored = backend.fetch("Post", &json!(7)).unwrap().expect("stored record");
    assert_eq!(stored.get("title"), Some(&json!("v2")));
    assert_eq!(post.id(), Some(json!(7)));
}

#[test]
fn records_are_scoped_by_model_name() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend.clone()).build();
    let comments = ModelType::builder("Comment").backend(backend.clone()).build();

    posts.instantiate(attrs(json!({"id": "1"}))).save();
    comments.instantiate(attrs(json!({"id": "1"}))).save();
    comments.instantiate(attrs(json!({"id": "2"}))).save();

    assert_eq!(backend.count("Post").unwrap(), 1);
    assert_eq!(backend.count("Comment").unwrap(), 2);
    assert_eq!(backend.count("Missing").unwrap(), 0);
}

#[test]
fn numeric_and_string_ids_are_different_records() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend.clone()).build();
    let numeric = posts.instantiate(attrs(json!({"id": 7, "title": "number"})));
    let text = posts.instantiate(attrs(json!({"id": "7", "title": "string"})));

    numeric.save();
    text.save();
    assert_eq!(posts.collection().len(), 2);
    assert_eq!(backend.count("Post").unwrap(), 2);

    text.destroy();
    assert_eq!(backend.count("Post").unwrap(), 1);
    let stored = backend
        .fetch("Post", &json!(7))
        .unwrap()
        .expect("numeric record survives");
    assert_eq!(stored.get("title"), Some(&json!("number")));
    assert!(backend.fetch("Post", &json!("7")).unwrap().is_none());
    assert!(posts.collection().contains(&numeric));
}

#[test]
fn fetch_rejects_unsupported_ids() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    assert!(backend.fetch("Post", &json!(null)).is_err());
}

#[test]
fn dropping_the_type_closes_the_backend() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend.clone()).build();
    posts.instantiate_empty().set("title", "x").save();
    assert_eq!(posts.collection().len(), 1);
    assert_eq!(Rc::strong_count(&backend), 2);

    drop(posts);
    assert_eq!(Rc::strong_count(&backend), 1);
}

#[test]
fn destroy_deletes_the_row() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend.clone()).build();
    let post = posts.instantiate(attrs(json!({"id": "a"})));
    post.save();

    let outcome = Outcome::new();
    post.destroy_with(outcome.callback());

    assert_eq!(outcome.results(), vec![true]);
    assert!(backend.fetch("Post", &json!("a")).unwrap().is_none());
    assert!(posts.collection().is_empty());
}

#[test]
fn destroy_without_id_succeeds_without_sql() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend).build();

    let outcome = Outcome::new();
    posts.instantiate_empty().destroy_with(outcome.callback());
    assert_eq!(outcome.results(), vec![true]);
}

#[test]
fn unsupported_id_is_rejected() {
    let backend = Rc::new(SqliteBackend::open_in_memory().unwrap());
    let posts = ModelType::builder("Post").backend(backend.clone()).build();
    let post = posts.instantiate(attrs(json!({"id": {"nested": true}})));

    let outcome = Outcome::new();
    post.save_with(outcome.callback());

    assert_eq!(outcome.results(), vec![false]);
    assert_eq!(backend.count("Post").unwrap(), 0);
    assert!(posts.collection().is_empty());
}

#[test]
fn write_failure_leaves_the_model_untouched() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE model_records;").unwrap();
    let posts = ModelType::builder("Post")
        .backend(Rc::new(SqliteBackend::new(conn)))
        .build();
    let post = posts.instantiate_empty();
    post.set("title", "draft");

    let outcome = Outcome::new();
    post.save_with(outcome.callback());

    assert_eq!(outcome.results(), vec![false]);
    assert_eq!(post.id(), None);
    assert_eq!(post.changes(), attrs(json!({"title": "draft"})));
    assert!(post.attributes().is_empty());
    assert!(posts.collection().is_empty());
}

#[test]
fn configured_sqlite_storage_persists_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");
    let config = CoreConfig::from_json_str(&format!(
        r#"{{"storage": {{"kind": "sqlite", "path": {}}}}}"#,
        json!(path.to_string_lossy())
    ))
    .unwrap();

    let posts = ModelType::builder("Post")
        .backend(config.storage.build_backend().unwrap())
        .build();
    posts.instantiate(attrs(json!({"id": "p1", "title": "saved"}))).save();

    let reader = SqliteBackend::open(&path).unwrap();
    let stored = reader.fetch("Post", &json!("p1")).unwrap().expect("stored record");
    assert_eq!(stored.get("title"), Some(&json!("saved")));
}
