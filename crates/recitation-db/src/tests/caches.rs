use super::test_db;

#[test]
fn test_open_cache_namespace_is_idempotent() {
    let db = test_db();
    assert!(db.open_cache_namespace("sacred-recitations-v1").unwrap());
    assert!(!db.open_cache_namespace("sacred-recitations-v1").unwrap());
    assert_eq!(
        db.cache_namespace_names().unwrap(),
        vec!["sacred-recitations-v1".to_string()]
    );
}

#[test]
fn test_open_cache_namespace_rejects_empty_name() {
    let db = test_db();
    assert!(db.open_cache_namespace("").is_err());
}

#[test]
fn test_delete_cache_namespace() {
    let db = test_db();
    db.open_cache_namespace("sacred-recitations-v0").unwrap();
    db.open_cache_namespace("sacred-recitations-v1").unwrap();

    assert!(db.delete_cache_namespace("sacred-recitations-v0").unwrap());
    assert!(!db.delete_cache_namespace("sacred-recitations-v0").unwrap());

    assert!(db.get_cache_namespace("sacred-recitations-v0").unwrap().is_none());
    let kept = db.get_cache_namespace("sacred-recitations-v1").unwrap().unwrap();
    assert_eq!(kept.name, "sacred-recitations-v1");
    assert_eq!(db.list_cache_namespaces().unwrap().len(), 1);
}
