use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::core::class::{ClassAggregate, SkillSummary};
use crate::core::class_name::ClassName;
use crate::core::documentation::{
    Documentation, DocumentationPatch, NewDocumentation, clean_tags,
};
use crate::core::skills::{SkillCatalog, SkillPolicy};
use crate::error::{Result, TgError};
use crate::storage::Database;

/// Keeps class aggregates consistent with documentation entries.
///
/// Every write runs in a single database transaction together with the
/// recompute of each class it touches.
pub struct Synchronizer {
    pub(super) db: Arc<Database>,
    pub(super) catalog: SkillCatalog,
    pub(super) policy: SkillPolicy,
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("policy", &self.policy)
            .field("custom_skills", &self.catalog.custom_skills().len())
            .finish_non_exhaustive()
    }
}

impl Synchronizer {
    /// Create a synchronizer with the catalog loaded from the `skills` table.
    pub fn new(db: Arc<Database>, policy: SkillPolicy) -> Result<Self> {
        let catalog = SkillCatalog::with_custom(db.list_custom_skills()?);
        Ok(Self {
            db,
            catalog,
            policy,
        })
    }

    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }

    #[must_use]
    pub const fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn policy(&self) -> SkillPolicy {
        self.policy
    }

    /// Register a custom skill and persist it. Returns true if it was new.
    pub fn add_custom_skill(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TgError::ValidationFailed("skill name is empty".to_string()));
        }
        if SkillCatalog::is_core_skill(name) || self.catalog.is_custom_skill(name) {
            return Ok(false);
        }
        self.db
            .insert_custom_skill(name)
            .map_err(|err| store_failure("add custom skill", err))?;
        self.catalog.add_custom_skill(name);
        info!(skill = name, "registered custom skill");
        Ok(true)
    }

    /// Create an entry and refresh its class aggregate.
    pub fn add_documentation(&mut self, new: NewDocumentation) -> Result<Documentation> {
        new.validate()?;
        let class = ClassName::parse(&new.class_name)?;
        let policy = self.policy;
        let mut catalog = self.catalog.clone();

        let doc = self
            .db
            .with_transaction(|db| {
                let now = Utc::now();
                let skill_ids = resolve_skills(db, &mut catalog, policy, new.skill_ids)?;
                let activity_name = db.get_activity(&new.activity_id)?.map(|a| a.name);
                let doc = Documentation {
                    id: Uuid::new_v4().to_string(),
                    activity_id: new.activity_id,
                    activity_name,
                    class_name: class.key().to_string(),
                    title: new.title,
                    description: new.description,
                    date: new.date,
                    skill_ids,
                    images: clean_tags(new.images),
                    teacher_name: new.teacher_name,
                    created_at: now,
                    updated_at: None,
                };
                db.insert_documentation(&doc)?;
                recompute_class(db, &class, now)?;
                Ok(doc)
            })
            .map_err(|err| store_failure("add documentation", err))?;

        self.catalog = catalog;
        info!(id = %doc.id, class = %class, "added documentation");
        Ok(doc)
    }

    /// Apply a partial update and refresh the old and new class aggregates.
    pub fn update_documentation(
        &mut self,
        id: &str,
        mut patch: DocumentationPatch,
    ) -> Result<Documentation> {
        patch.validate()?;
        let target = match patch.class_name.as_deref() {
            Some(raw) => Some(ClassName::parse(raw)?),
            None => None,
        };
        let policy = self.policy;
        let mut catalog = self.catalog.clone();

        let (doc, old_class) = self
            .db
            .with_transaction(|db| {
                let now = Utc::now();
                let mut doc = db
                    .get_documentation(id)?
                    .ok_or_else(|| TgError::DocumentationNotFound(id.to_string()))?;
                let old_class = ClassName::parse(&doc.class_name).ok();
                let new_class = match target {
                    Some(class) => class,
                    None => ClassName::parse(&doc.class_name)?,
                };

                if let Some(tags) = patch.skill_ids.take() {
                    patch.skill_ids = Some(resolve_skills(db, &mut catalog, policy, tags)?);
                }
                if let Some(images) = patch.images.take() {
                    patch.images = Some(clean_tags(images));
                }
                let activity_changed = patch
                    .activity_id
                    .as_ref()
                    .is_some_and(|activity_id| *activity_id != doc.activity_id);

                patch.apply(&mut doc);
                doc.class_name = new_class.key().to_string();
                if activity_changed {
                    doc.activity_name = db.get_activity(&doc.activity_id)?.map(|a| a.name);
                }
                doc.updated_at = Some(now);

                if !db.update_documentation(&doc)? {
                    return Err(TgError::DocumentationNotFound(id.to_string()));
                }
                recompute_class(db, &new_class, now)?;
                if let Some(old) = &old_class {
                    if old.key() != new_class.key() {
                        recompute_class(db, old, now)?;
                    }
                }
                Ok((doc, old_class))
            })
            .map_err(|err| store_failure("update documentation", err))?;

        self.catalog = catalog;
        info!(
            id = %doc.id,
            class = %doc.class_name,
            previous_class = ?old_class.as_ref().map(ClassName::key),
            "updated documentation"
        );
        Ok(doc)
    }

    /// Remove an entry and refresh its class aggregate. Returns the removed entry.
    pub fn delete_documentation(&mut self, id: &str) -> Result<Documentation> {
        let doc = self
            .db
            .with_transaction(|db| {
                let doc = db
                    .get_documentation(id)?
                    .ok_or_else(|| TgError::DocumentationNotFound(id.to_string()))?;
                db.delete_documentation(id)?;
                match ClassName::parse(&doc.class_name) {
                    Ok(class) => {
                        recompute_class(db, &class, Utc::now())?;
                    }
                    Err(_) => debug!(id, "deleted entry had no usable class name"),
                }
                Ok(doc)
            })
            .map_err(|err| store_failure("delete documentation", err))?;

        info!(id = %doc.id, class = %doc.class_name, "deleted documentation");
        Ok(doc)
    }

    pub fn get_documentation(&self, id: &str) -> Result<Option<Documentation>> {
        self.db
            .get_documentation(id)
            .map_err(|err| store_failure("get documentation", err))
    }

    pub fn list_documentations(&self) -> Result<Vec<Documentation>> {
        self.db
            .list_documentations()
            .map_err(|err| store_failure("list documentations", err))
    }

    /// Entries of one class, newest first. Any spelling of the class matches.
    pub fn list_class_documentations(&self, class_name: &str) -> Result<Vec<Documentation>> {
        let class = ClassName::parse(class_name)?;
        self.db
            .list_documentations_by_class_key(class.key())
            .map_err(|err| store_failure("list class documentations", err))
    }

    pub fn list_documentations_by_activity(&self, activity_id: &str) -> Result<Vec<Documentation>> {
        self.db
            .list_documentations_by_activity(activity_id)
            .map_err(|err| store_failure("list activity documentations", err))
    }
}

/// Apply the skill policy to a set of tags.
pub(super) fn resolve_skills(
    db: &Database,
    catalog: &mut SkillCatalog,
    policy: SkillPolicy,
    tags: Vec<String>,
) -> Result<Vec<String>> {
    let mut kept = Vec::new();
    for tag in clean_tags(tags) {
        if SkillCatalog::is_core_skill(&tag) || catalog.is_custom_skill(&tag) {
            kept.push(tag);
            continue;
        }
        match policy {
            SkillPolicy::Promote => {
                db.insert_custom_skill(&tag)?;
                catalog.add_custom_skill(&tag);
                debug!(skill = %tag, "promoted unknown skill to custom");
                kept.push(tag);
            }
            SkillPolicy::Drop => debug!(skill = %tag, "dropped unknown skill"),
            SkillPolicy::Reject => return Err(TgError::UnknownSkill(tag)),
        }
    }
    Ok(kept)
}

/// Rebuild one class aggregate from every entry filed under its key.
pub(super) fn recompute_class(
    db: &Database,
    class: &ClassName,
    now: DateTime<Utc>,
) -> Result<ClassAggregate> {
    let entries = db.list_documentations_by_class_key(class.key())?;
    let summary = SkillSummary::from_entries(&entries);
    let mut aggregate = db
        .get_class(class.key())?
        .unwrap_or_else(|| ClassAggregate::empty(class, now));
    aggregate.name = class.display().to_string();
    aggregate.apply_summary(summary, now);
    db.upsert_class(&aggregate)?;
    debug!(
        class = class.key(),
        skills = aggregate.acquired_skills.len(),
        activities = aggregate.total_activities,
        "recomputed class aggregate"
    );
    Ok(aggregate)
}

/// Log a failed store call and convert it for the caller.
pub(super) fn store_failure(operation: &str, err: TgError) -> TgError {
    let err = err.into_operation_failure(operation);
    if matches!(err, TgError::OperationFailed { .. }) {
        error!(operation, error = %err, "store operation failed");
    }
    err
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::core::activity::NewActivity;
    use crate::error::ErrorCode;
    use crate::test_utils::fixtures::{TestStore, day};

    #[test]
    fn add_creates_entry_and_aggregate() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);

        let doc = sync
            .add_documentation(
                NewDocumentation::new("act-1", "2ג", day(5))
                    .title("סיור בחצר")
                    .skills(["עבודת צוות", "תקשורת"]),
            )
            .unwrap();
        assert_eq!(doc.class_name, "C2");

        let class = sync.db().get_class("C2").unwrap().unwrap();
        assert_eq!(class.name, "ג2");
        assert_eq!(class.total_activities, 1);
        assert_eq!(
            class.acquired_skills,
            vec!["עבודת צוות".to_string(), "תקשורת".to_string()]
        );
        assert_eq!(class.last_activity, Some(day(5)));
    }

    #[test]
    fn add_fills_activity_name() {
        let store = TestStore::new();
        let activity = store.add_activity(NewActivity::named("חקר עלים"));
        let mut sync = store.synchronizer(SkillPolicy::Promote);

        let doc = sync
            .add_documentation(NewDocumentation::new(&activity.id, "A1", day(1)))
            .unwrap();
        assert_eq!(doc.activity_name.as_deref(), Some("חקר עלים"));
    }

    #[test]
    fn promote_registers_unknown_skill() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        sync.add_documentation(NewDocumentation::new("a", "A1", day(1)).skills(["גישוש"]))
            .unwrap();

        assert!(sync.catalog().is_custom_skill("גישוש"));
        assert_eq!(sync.db().list_custom_skills().unwrap(), vec!["גישוש".to_string()]);
    }

    #[test]
    fn drop_filters_unknown_skill() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Drop);
        let doc = sync
            .add_documentation(
                NewDocumentation::new("a", "A1", day(1)).skills(["גישוש", "תקשורת"]),
            )
            .unwrap();

        assert_eq!(doc.skill_ids, vec!["תקשורת".to_string()]);
        assert!(sync.db().list_custom_skills().unwrap().is_empty());
    }

    #[test]
    fn reject_fails_without_writing() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Reject);
        let err = sync
            .add_documentation(NewDocumentation::new("a", "A1", day(1)).skills(["גישוש"]))
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::SkillUnknown);
        assert!(sync.list_documentations().unwrap().is_empty());
        assert!(sync.db().get_class("A1").unwrap().is_none());
    }

    #[test]
    fn update_moves_entry_between_classes() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        let doc = sync
            .add_documentation(NewDocumentation::new("a", "C2", day(1)).skills(["התמדה"]))
            .unwrap();

        let patch = DocumentationPatch {
            class_name: Some("ד1".to_string()),
            ..Default::default()
        };
        let updated = sync.update_documentation(&doc.id, patch).unwrap();
        assert_eq!(updated.class_name, "D1");
        assert!(updated.updated_at.is_some());

        let old = sync.db().get_class("C2").unwrap().unwrap();
        assert_eq!(old.total_activities, 0);
        assert!(old.acquired_skills.is_empty());
        assert_eq!(old.last_activity, None);

        let new = sync.db().get_class("D1").unwrap().unwrap();
        assert_eq!(new.total_activities, 1);
        assert_eq!(new.acquired_skills, vec!["התמדה".to_string()]);
    }

    #[test]
    fn update_replaces_skills_and_drops_stale_ones() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        let doc = sync
            .add_documentation(NewDocumentation::new("a", "C2", day(1)).skills(["התמדה"]))
            .unwrap();

        let patch = DocumentationPatch {
            skill_ids: Some(vec!["אמפתיה".to_string()]),
            ..Default::default()
        };
        sync.update_documentation(&doc.id, patch).unwrap();

        let class = sync.db().get_class("C2").unwrap().unwrap();
        assert_eq!(class.acquired_skills, vec!["אמפתיה".to_string()]);
    }

    #[test]
    fn update_missing_entry_is_not_found() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        let err = sync
            .update_documentation("missing", DocumentationPatch::default())
            .unwrap_err();
        assert!(matches!(err, TgError::DocumentationNotFound(_)));
    }

    #[test]
    fn update_rejects_blank_activity_id() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        let doc = sync
            .add_documentation(NewDocumentation::new("act-1", "A2", day(1)))
            .unwrap();

        let err = sync
            .update_documentation(
                &doc.id,
                DocumentationPatch {
                    activity_id: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let stored = sync.get_documentation(&doc.id).unwrap().unwrap();
        assert_eq!(stored.activity_id, "act-1");
        assert!(stored.updated_at.is_none());
    }

    #[test]
    fn delete_last_entry_empties_aggregate() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        let doc = sync
            .add_documentation(NewDocumentation::new("a", "B1", day(2)).skills(["מנהיגות"]))
            .unwrap();

        let removed = sync.delete_documentation(&doc.id).unwrap();
        assert_eq!(removed.id, doc.id);

        let class = sync.db().get_class("B1").unwrap().unwrap();
        assert_eq!(class.total_activities, 0);
        assert!(class.acquired_skills.is_empty());

        let err = sync.delete_documentation(&doc.id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_class_name_is_rejected() {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        let err = sync
            .add_documentation(NewDocumentation::new("a", "  ", day(1)))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ClassNameInvalid);
    }

    #[test]
    fn store_errors_become_operation_failures() {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(Database::open(dir.path().join("t.db")).unwrap());
        let mut sync = Synchronizer::new(Arc::clone(&db), SkillPolicy::Promote).unwrap();
        db.conn().execute_batch("DROP TABLE classes;").unwrap();

        let err = sync
            .add_documentation(NewDocumentation::new(
                "a",
                "A1",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreOperationFailed);
        assert!(err.to_string().contains("add documentation"));
        assert!(sync.list_documentations().unwrap().is_empty());
    }
}
