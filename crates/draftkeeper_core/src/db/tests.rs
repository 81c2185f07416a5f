use crate::test_support::setup_temp_db;
use std::thread::sleep;
use std::time::Duration;

#[test]
fn upsert_creates_then_updates_revision() {
    let (db, _dir) = setup_temp_db();

    let created = db
        .documents
        .upsert("lesson-1", "intro".to_string())
        .expect("create");
    assert!(created.changed);
    assert_eq!(created.document.revision, 1);

    let updated = db
        .documents
        .upsert("lesson-1", "intro, revised".to_string())
        .expect("update");
    assert!(updated.changed);
    assert_eq!(updated.document.revision, 2);

    let stored = db.documents.get("lesson-1").expect("get").expect("row");
    assert_eq!(stored.content, "intro, revised");
    assert_eq!(stored.revision, 2);
}

#[test]
fn upsert_with_identical_content_keeps_revision() {
    let (db, _dir) = setup_temp_db();
    db.documents
        .upsert("lesson-1", "same".to_string())
        .expect("create");

    let again = db
        .documents
        .upsert("lesson-1", "same".to_string())
        .expect("noop");
    assert!(!again.changed);
    assert_eq!(again.document.revision, 1);
}

#[test]
fn get_missing_document_returns_none() {
    let (db, _dir) = setup_temp_db();
    assert!(db.documents.get("nope").expect("get").is_none());
}

#[test]
fn list_meta_orders_by_most_recent_update() {
    let (db, _dir) = setup_temp_db();
    db.documents.upsert("a", "1".to_string()).expect("a");
    sleep(Duration::from_millis(5));
    db.documents.upsert("b", "1".to_string()).expect("b");
    sleep(Duration::from_millis(5));
    db.documents.upsert("a", "2".to_string()).expect("a2");

    let metas = db.documents.list_meta(10).expect("list");
    let ids: Vec<&str> = metas.iter().map(|meta| meta.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(metas[0].revision, 2);

    assert_eq!(db.documents.list_meta(1).expect("limited").len(), 1);
    assert!(db.documents.list_meta(0).expect("empty").is_empty());
}

#[test]
fn shared_handle_sees_same_rows() {
    let (db, _dir) = setup_temp_db();
    let shared = db.share().expect("share");
    db.documents.upsert("doc", "body".to_string()).expect("write");
    let row = shared.documents.get("doc").expect("get").expect("row");
    assert_eq!(row.content, "body");
}
