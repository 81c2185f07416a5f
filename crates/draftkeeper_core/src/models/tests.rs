use super::document::*;

#[test]
fn new_document_starts_at_revision_one_with_hash() {
    let doc = Document::new("lesson-7", "Fractions".to_string());
    assert_eq!(doc.revision, 1);
    assert_eq!(doc.content_hash, content_hash("Fractions"));
    assert_eq!(doc.created_at, doc.updated_at);
}

#[test]
fn apply_content_ignores_identical_content() {
    let mut doc = Document::new("lesson-7", "Fractions".to_string());
    let before = doc.clone();
    assert!(!doc.apply_content("Fractions".to_string()));
    assert_eq!(doc, before);
}

#[test]
fn apply_content_bumps_revision_on_change() {
    let mut doc = Document::new("lesson-7", "Fractions".to_string());
    assert!(doc.apply_content("Decimals".to_string()));
    assert_eq!(doc.revision, 2);
    assert_eq!(doc.content, "Decimals");
    assert_eq!(doc.content_hash, content_hash("Decimals"));
    assert!(doc.updated_at >= doc.created_at);
}

#[test]
fn document_id_serializes_as_plain_string() {
    let id = DocumentId::new("skill-42");
    assert_eq!(serde_json::to_string(&id).expect("encode"), "\"skill-42\"");
    assert_eq!(id.to_string(), "skill-42");
}

#[test]
fn meta_reports_content_length_in_bytes() {
    let doc = Document::new("form-1", "héllo".to_string());
    let meta = DocumentMeta::from(&doc);
    assert_eq!(meta.content_len, "héllo".len());
    assert_eq!(meta.revision, 1);
}
