use treeguard::TgError;
use treeguard::core::documentation::{DocumentationPatch, NewDocumentation};
use treeguard::core::skills::{SkillCatalog, SkillPolicy};
use treeguard::test_utils::fixtures::{TestStore, day};

#[test]
fn test_documentation_lifecycle_keeps_class_aggregates_derived() {
    let store = TestStore::new();
    let mut sync = store.synchronizer(SkillPolicy::Promote);

    // First entry: one core skill plus one unknown tag.
    let first = sync
        .add_documentation(
            NewDocumentation::new("planting", "ג2", day(1))
                .skills(["חשיבה ביקורתית", "גישוש"]),
        )
        .unwrap();
    let class = sync.find_class("ג2").unwrap().expect("class created");
    assert_eq!(class.id, "C2");
    assert_eq!(class.name, "ג2");
    assert_eq!(class.total_activities, 1);
    assert_eq!(class.acquired_skills.len(), 2);
    assert!(class.acquired_skills.contains(&"גישוש".to_string()));
    assert!(sync.catalog().is_custom_skill("גישוש"));
    assert!(!SkillCatalog::is_core_skill("גישוש"));

    // Second entry names the same class digit-first.
    let second = sync
        .add_documentation(NewDocumentation::new("planting", "2ג", day(3)).skills(["עבודת צוות"]))
        .unwrap();
    let class = sync.find_class("2ג").unwrap().unwrap();
    assert_eq!(class.id, "C2");
    assert_eq!(class.total_activities, 2);
    assert_eq!(class.acquired_skills.len(), 3);
    assert_eq!(class.last_activity, Some(day(3)));
    assert_eq!(sync.list_all_classes().unwrap().len(), 1);

    // Move the second entry to another class.
    let patch = DocumentationPatch {
        class_name: Some("ד1".to_string()),
        ..DocumentationPatch::default()
    };
    sync.update_documentation(&second.id, patch).unwrap();

    let c2 = sync.find_class("ג2").unwrap().unwrap();
    assert_eq!(c2.total_activities, 1);
    assert!(!c2.acquired_skills.contains(&"עבודת צוות".to_string()));
    assert_eq!(c2.last_activity, Some(day(1)));

    let d1 = sync.find_class("ד1").unwrap().unwrap();
    assert_eq!(d1.id, "D1");
    assert_eq!(d1.total_activities, 1);
    assert_eq!(d1.acquired_skills, vec!["עבודת צוות".to_string()]);

    // Deleting the last ג2 entry empties its aggregate but keeps it.
    sync.delete_documentation(&first.id).unwrap();
    let c2 = sync.find_class("ג2").unwrap().expect("aggregate kept");
    assert_eq!(c2.total_activities, 0);
    assert!(c2.acquired_skills.is_empty());
    assert_eq!(c2.last_activity, None);
    assert_eq!(sync.list_all_classes().unwrap().len(), 2);
}

#[test]
fn test_custom_skill_registered_once() {
    let store = TestStore::new();
    let mut sync = store.synchronizer(SkillPolicy::Promote);

    assert!(sync.add_custom_skill("גינון").unwrap());
    assert!(!sync.add_custom_skill("גינון").unwrap());
    assert!(!sync.add_custom_skill("תקשורת").unwrap());

    let reloaded = store.synchronizer(SkillPolicy::Promote);
    assert_eq!(reloaded.catalog().custom_skills(), ["גינון".to_string()]);
    assert_eq!(store.db.list_custom_skills().unwrap().len(), 1);
}

#[test]
fn test_reject_policy_leaves_store_untouched() {
    let store = TestStore::new();
    let mut sync = store.synchronizer(SkillPolicy::Reject);

    let err = sync
        .add_documentation(NewDocumentation::new("a", "ב1", day(2)).skills(["תקשורת", "גישוש"]))
        .unwrap_err();
    assert!(matches!(err, TgError::UnknownSkill(ref name) if name == "גישוש"));

    assert_eq!(store.db.count_documentations().unwrap(), 0);
    assert!(sync.find_class("ב1").unwrap().is_none());
    assert!(sync.catalog().custom_skills().is_empty());
}

#[test]
fn test_drop_policy_filters_unknown_tags() {
    let store = TestStore::new();
    let mut sync = store.synchronizer(SkillPolicy::Drop);

    let doc = sync
        .add_documentation(NewDocumentation::new("a", "B1", day(2)).skills(["גישוש", "אמפתיה"]))
        .unwrap();
    assert_eq!(doc.skill_ids, vec!["אמפתיה".to_string()]);
    assert_eq!(doc.class_name, "B1");

    let class = sync.find_class("1ב").unwrap().unwrap();
    assert_eq!(class.acquired_skills, vec!["אמפתיה".to_string()]);
}

#[test]
fn test_missing_entries_are_reported_as_not_found() {
    let store = TestStore::new();
    let mut sync = store.synchronizer(SkillPolicy::Promote);

    let err = sync.delete_documentation("missing").unwrap_err();
    assert!(matches!(err, TgError::DocumentationNotFound(_)));
    assert!(err.is_not_found());

    let err = sync
        .update_class_skills("ה2", vec!["תקשורת".to_string()])
        .unwrap_err();
    assert!(matches!(err, TgError::ClassNotFound(_)));

    let err = sync
        .add_documentation(NewDocumentation::new("a", "   ", day(1)))
        .unwrap_err();
    assert!(matches!(err, TgError::InvalidClassName(_)));
}

#[test]
fn test_class_progress_counts_core_and_custom() {
    let store = TestStore::new();
    let mut sync = store.synchronizer(SkillPolicy::Promote);
    sync.add_documentation(
        NewDocumentation::new("a", "ו2", day(4)).skills(["תקשורת", "אמפתיה", "גינון"]),
    )
    .unwrap();

    let progress = sync.class_progress("2ו").unwrap();
    let social = progress
        .categories
        .iter()
        .find(|category| category.acquired.contains(&"תקשורת".to_string()))
        .unwrap();
    assert_eq!(social.acquired.len(), 2);
    assert_eq!(social.total, 5);

    let custom = progress.categories.last().unwrap();
    assert_eq!(custom.acquired, vec!["גינון".to_string()]);
}
