use chrono::{Duration, Utc};

use treeguard::core::skills::SkillPolicy;
use treeguard::sync::ResyncOptions;
use treeguard::test_utils::fixtures::{TestStore, day, legacy_documentation, stored_class};

#[test]
fn test_resync_merges_duplicate_aggregates() {
    let store = TestStore::new();
    let now = Utc::now();
    store.insert_class(&stored_class("A1", now - Duration::days(3), &["תקשורת"]));
    store.insert_class(&stored_class("1א", now - Duration::days(1), &["אמפתיה"]));
    store.insert_documentation(&legacy_documentation("d1", "A1", day(2), &["תקשורת"]));
    store.insert_documentation(&legacy_documentation("d2", "1א", day(6), &["מנהיגות"]));
    store.insert_documentation(&legacy_documentation("d3", "א1", day(4), &["תקשורת"]));

    let mut sync = store.synchronizer(SkillPolicy::Promote);
    let report = sync
        .sync_classes_with_documentations(&ResyncOptions::default())
        .unwrap();

    assert_eq!(report.documentations_scanned, 3);
    assert_eq!(report.classes_rebuilt, vec!["A1".to_string()]);
    assert_eq!(report.duplicates_removed, vec!["1א".to_string()]);

    let classes = store.db.list_classes().unwrap();
    assert_eq!(classes.len(), 1);
    let class = &classes[0];
    assert_eq!(class.id, "A1");
    assert_eq!(class.total_activities, 3);
    assert_eq!(
        class.acquired_skills,
        vec!["מנהיגות".to_string(), "תקשורת".to_string()]
    );
    assert_eq!(class.last_activity, Some(day(6)));
    assert_eq!(
        class.created_at.timestamp(),
        (now - Duration::days(3)).timestamp()
    );
}

#[test]
fn test_resync_dry_run_writes_nothing() {
    let store = TestStore::new();
    store.insert_class(&stored_class("2ב", Utc::now(), &[]));
    store.insert_documentation(&legacy_documentation("d1", "2ב", day(1), &["גישוש"]));

    let mut sync = store.synchronizer(SkillPolicy::Promote);
    let report = sync
        .sync_classes_with_documentations(&ResyncOptions { dry_run: true })
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.duplicates_removed, vec!["2ב".to_string()]);
    assert_eq!(report.skills_registered, vec!["גישוש".to_string()]);

    let classes = store.db.list_classes().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, "2ב");
    assert!(store.db.list_custom_skills().unwrap().is_empty());
    assert!(sync.catalog().custom_skills().is_empty());
}

#[test]
fn test_resync_resets_classes_without_entries() {
    let store = TestStore::new();
    store.insert_class(&stored_class("E2", Utc::now(), &["תקשורת"]));

    let mut sync = store.synchronizer(SkillPolicy::Promote);
    let report = sync
        .sync_classes_with_documentations(&ResyncOptions::default())
        .unwrap();
    assert_eq!(report.classes_reset, vec!["E2".to_string()]);

    let class = store.db.get_class("E2").unwrap().expect("reset, not deleted");
    assert!(class.acquired_skills.is_empty());
    assert_eq!(class.total_activities, 0);
}

#[test]
fn test_resync_keeps_legacy_class_without_entries() {
    let store = TestStore::new();
    let now = Utc::now();
    store.insert_class(&stored_class("1א", now, &["תקשורת"]));

    let mut sync = store.synchronizer(SkillPolicy::Promote);
    let report = sync
        .sync_classes_with_documentations(&ResyncOptions::default())
        .unwrap();
    assert_eq!(report.duplicates_removed, vec!["1א".to_string()]);
    assert_eq!(report.classes_reset, vec!["A1".to_string()]);

    let classes = store.db.list_classes().unwrap();
    assert_eq!(classes.len(), 1);
    let class = &classes[0];
    assert_eq!(class.id, "A1");
    assert_eq!(class.name, "א1");
    assert!(class.acquired_skills.is_empty());
    assert_eq!(class.total_activities, 0);
    assert_eq!(class.created_at.timestamp(), now.timestamp());
    assert!(store.db.get_class("1א").unwrap().is_none());
}
