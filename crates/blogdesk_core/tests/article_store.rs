use blogdesk_core::db::{open_db_in_memory, read_slot, write_slot};
use blogdesk_core::{
    ArticleRecord, ArticleStore, InMemoryArticleStore, PersistenceError, SqliteArticleStore,
    StoreError, ARTICLES_SLOT_KEY,
};
use rusqlite::Connection;
use std::collections::HashSet;

fn article(title: &str) -> ArticleRecord {
    ArticleRecord::new(title, "B", "2024-01-01", "Tech", format!("<p>{title}</p>"))
}

fn with_sqlite_store(check: impl FnOnce(&mut dyn ArticleStore)) {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteArticleStore::try_new(&mut conn).unwrap();
    check(&mut store);
}

fn with_memory_store(check: impl FnOnce(&mut dyn ArticleStore)) {
    let mut store = InMemoryArticleStore::new();
    check(&mut store);
}

fn for_each_store(check: fn(&mut dyn ArticleStore)) {
    with_sqlite_store(check);
    with_memory_store(check);
}

#[test]
fn first_upsert_into_empty_store_assigns_id() {
    for_each_store(|store| {
        let record = ArticleRecord::new("A", "B", "2024-01-01", "Tech", "<p>hi</p>").with_tags(["x"]);
        let id = store.upsert(&record).unwrap();

        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id.as_deref(), Some(id.as_str()));
        assert!(!id.is_empty());
        assert_eq!(all[0].tags, vec!["x".to_string()]);
    });
}

#[test]
fn new_records_get_unique_ids_and_are_prepended() {
    for_each_store(|store| {
        let mut ids = HashSet::new();
        for idx in 0..10 {
            let id = store.upsert(&article(&format!("post {idx}"))).unwrap();
            assert!(ids.insert(id));
        }

        let titles: Vec<String> = store.get_all().into_iter().map(|a| a.title).collect();
        assert_eq!(titles.first().map(String::as_str), Some("post 9"));
        assert_eq!(titles.last().map(String::as_str), Some("post 0"));
    });
}

#[test]
fn upsert_with_existing_id_replaces_in_place() {
    for_each_store(|store| {
        let first = store.upsert(&article("first")).unwrap();
        store.upsert(&article("second")).unwrap();
        store.upsert(&article("third")).unwrap();

        let mut edited = store.get_by_id(&first).unwrap();
        edited.title = "first, edited".to_string();
        edited.tags = vec!["rust".to_string()];
        edited.excerpt = Some("short".to_string());
        let id = store.upsert(&edited).unwrap();

        assert_eq!(id, first);
        assert_eq!(store.get_by_id(&first), Some(edited));
        let all = store.get_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id.as_deref(), Some(first.as_str()));
    });
}

#[test]
fn delete_removes_existing_and_ignores_absent() {
    for_each_store(|store| {
        let keep = store.upsert(&article("keep")).unwrap();
        let drop_id = store.upsert(&article("drop")).unwrap();

        assert!(store.delete_by_id(&drop_id).unwrap());
        assert_eq!(store.get_by_id(&drop_id), None);
        assert_eq!(store.get_all().len(), 1);

        assert!(store.delete_by_id("article_missing").unwrap());
        assert_eq!(store.get_all().len(), 1);
        assert!(store.get_by_id(&keep).is_some());
    });
}

#[test]
fn search_matches_fields_case_insensitively() {
    for_each_store(|store| {
        store
            .upsert(&article("Rust ownership").with_tags(["Systems"]))
            .unwrap();
        let mut cooking = article("Bread");
        cooking.category = "Kitchen".to_string();
        cooking.content = "<p>Flour and WATER</p>".to_string();
        store.upsert(&cooking).unwrap();

        assert_eq!(store.search("RUST").len(), 1);
        assert_eq!(store.search("systems").len(), 1);
        assert_eq!(store.search("kitchen").len(), 1);
        assert_eq!(store.search("water").len(), 1);
        assert!(store.search("haskell").is_empty());
        assert_eq!(store.search(""), store.get_all());
    });
}

#[test]
fn collection_round_trips_through_clear_and_restore() {
    for_each_store(|store| {
        for idx in 0..3 {
            store.upsert(&article(&format!("post {idx}"))).unwrap();
        }
        let before = store.get_all();
        let blob = serde_json::to_string(&before).unwrap();

        store.clear().unwrap();
        assert!(store.get_all().is_empty());

        let restored: Vec<ArticleRecord> = serde_json::from_str(&blob).unwrap();
        store.replace_all(restored).unwrap();
        assert_eq!(store.get_all(), before);
    });
}

#[test]
fn blank_ids_are_replaced_with_generated_ones() {
    for_each_store(|store| {
        let mut empty = article("empty id");
        empty.id = Some(String::new());
        let mut spaces = article("spaces id");
        spaces.id = Some("   ".to_string());

        let first = store.upsert(&empty).unwrap();
        let second = store.upsert(&spaces).unwrap();
        assert!(first.starts_with("article_"));
        assert!(second.starts_with("article_"));
        assert_ne!(first, second);

        assert!(store.delete_by_id(&first).unwrap());
        let left = store.get_all();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "spaces id");
    });
}

#[test]
fn replace_all_assigns_ids_to_records_without_one() {
    for_each_store(|store| {
        let mut legacy = article("legacy");
        legacy.id = Some("article_1717000000000".to_string());
        let mut blank = article("blank");
        blank.id = Some(" ".to_string());
        store
            .replace_all(vec![article("no id"), legacy, blank, article("also none")])
            .unwrap();

        let all = store.get_all();
        let ids: HashSet<String> = all.iter().filter_map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert!(ids.contains("article_1717000000000"));

        let target = all[0].id.clone().unwrap();
        assert!(store.delete_by_id(&target).unwrap());
        assert_eq!(store.get_all().len(), 3);
    });
}

#[test]
fn replace_all_rejects_duplicate_ids_and_keeps_collection() {
    for_each_store(|store| {
        store.upsert(&article("kept")).unwrap();
        let before = store.get_all();

        let mut first = article("one");
        first.id = Some("article_dup".to_string());
        let mut second = article("two");
        second.id = Some(" article_dup ".to_string());
        let err = store.replace_all(vec![first, second]).unwrap_err();

        assert!(matches!(err, StoreError::DuplicateId(id) if id == "article_dup"));
        assert_eq!(store.get_all(), before);
    });
}

#[test]
fn unreadable_slot_fails_writes_without_overwriting() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, X'FF00', 0)",
        [ARTICLES_SLOT_KEY],
    )
    .unwrap();
    {
        let mut store = SqliteArticleStore::try_new(&mut conn).unwrap();
        assert!(store.get_all().is_empty());

        let err = store.upsert(&article("fresh")).unwrap_err();
        assert!(matches!(err, StoreError::Persistence(PersistenceError::Db(_))));
        let err = store.delete_by_id("article_any").unwrap_err();
        assert!(matches!(err, StoreError::Persistence(PersistenceError::Db(_))));
    }

    let kind: String = conn
        .query_row(
            "SELECT typeof(value) FROM kv_slots WHERE key = ?1",
            [ARTICLES_SLOT_KEY],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(kind, "blob");
}

#[test]
fn corrupt_slot_reads_as_empty_and_is_overwritten_on_next_save() {
    let mut conn = open_db_in_memory().unwrap();
    write_slot(&mut conn, ARTICLES_SLOT_KEY, "{\"broken\":").unwrap();

    let mut store = SqliteArticleStore::try_new(&mut conn).unwrap();
    assert!(store.get_all().is_empty());
    assert!(store.search("").is_empty());

    store.upsert(&article("fresh")).unwrap();
    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn legacy_blob_without_optional_fields_loads() {
    let mut conn = open_db_in_memory().unwrap();
    write_slot(
        &mut conn,
        ARTICLES_SLOT_KEY,
        r#"[{"id":"article_1717000000000","title":"旧文章","author":"B","date":"2024-05-29","category":"Life","tags":["a"],"content":"<p>x</p>"}]"#,
    )
    .unwrap();

    let store = SqliteArticleStore::try_new(&mut conn).unwrap();
    let loaded = store.get_by_id("article_1717000000000").unwrap();
    assert_eq!(loaded.title, "旧文章");
    assert_eq!(loaded.excerpt, None);
    assert_eq!(loaded.file_path, None);
}

#[test]
fn quota_failure_keeps_previous_blob() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut store = SqliteArticleStore::try_new(&mut conn)
            .unwrap()
            .with_quota(600);
        store.upsert(&article("small")).unwrap();

        let mut huge = article("huge");
        huge.content = "x".repeat(2048);
        let err = store.upsert(&huge).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Persistence(PersistenceError::QuotaExceeded { quota: 600, .. })
        ));
        assert_eq!(store.get_all().len(), 1);
    }

    let raw = read_slot(&conn, ARTICLES_SLOT_KEY).unwrap().unwrap();
    assert!(raw.contains("small"));
    assert!(!raw.contains("huge"));
}

#[test]
fn separate_slot_keys_hold_separate_collections() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut drafts = SqliteArticleStore::try_new(&mut conn)
            .unwrap()
            .with_slot_key("drafts");
        drafts.upsert(&article("draft")).unwrap();
        assert_eq!(drafts.slot_key(), "drafts");
    }

    let published = SqliteArticleStore::try_new(&mut conn).unwrap();
    assert!(published.get_all().is_empty());
}

#[test]
fn store_requires_migrated_connection() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteArticleStore::try_new(&mut conn).err().unwrap();
    assert!(matches!(err, StoreError::MissingRequiredTable("kv_slots")));
}
