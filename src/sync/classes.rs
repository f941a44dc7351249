//! Class aggregate access on top of the synchronizer.

use std::collections::BTreeSet;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::core::class::{ClassAggregate, dedupe_by_display};
use crate::core::class_name::ClassName;
use crate::core::skills::CategoryProgress;
use crate::error::{Result, TgError};

use super::engine::{Synchronizer, resolve_skills, store_failure};

/// Skill progress of one class, per catalog category.
#[derive(Debug, Clone, Serialize)]
pub struct ClassProgress {
    pub class: ClassAggregate,
    pub categories: Vec<CategoryProgress>,
}

impl Synchronizer {
    /// Return the stored aggregate for a class, creating an empty one if needed.
    pub fn get_or_create_class(&self, name: &str) -> Result<ClassAggregate> {
        let class = ClassName::parse(name)?;
        self.db
            .with_transaction(|db| {
                if let Some(existing) = db.get_class(class.key())? {
                    return Ok(existing);
                }
                let created = ClassAggregate::empty(&class, Utc::now());
                db.upsert_class(&created)?;
                info!(class = class.key(), "created empty class aggregate");
                Ok(created)
            })
            .map_err(|err| store_failure("get class", err))
    }

    /// Look up a class without creating it.
    pub fn find_class(&self, name: &str) -> Result<Option<ClassAggregate>> {
        let class = ClassName::parse(name)?;
        self.db
            .get_class(class.key())
            .map_err(|err| store_failure("get class", err))
    }

    /// Overwrite a class's acquired skills. The class must already exist.
    ///
    /// Entries are not consulted; the next write to the class recomputes
    /// the set from its entries again.
    pub fn update_class_skills(&mut self, name: &str, skills: Vec<String>) -> Result<ClassAggregate> {
        let class = ClassName::parse(name)?;
        let policy = self.policy;
        let mut catalog = self.catalog.clone();

        let updated = self
            .db
            .with_transaction(|db| {
                let mut aggregate = db
                    .get_class(class.key())?
                    .ok_or_else(|| TgError::ClassNotFound(class.key().to_string()))?;
                let skills: BTreeSet<String> = resolve_skills(db, &mut catalog, policy, skills)?
                    .into_iter()
                    .collect();
                aggregate.acquired_skills = skills.into_iter().collect();
                aggregate.updated_at = Utc::now();
                db.upsert_class(&aggregate)?;
                Ok(aggregate)
            })
            .map_err(|err| store_failure("update class skills", err))?;

        self.catalog = catalog;
        info!(class = %updated.id, skills = updated.acquired_skills.len(), "set class skills");
        Ok(updated)
    }

    /// Every class, one per display name, sorted by display name.
    pub fn list_all_classes(&self) -> Result<Vec<ClassAggregate>> {
        let classes = self
            .db
            .list_classes()
            .map_err(|err| store_failure("list classes", err))?;
        Ok(dedupe_by_display(classes))
    }

    /// Remove every class aggregate. Entries are untouched.
    pub fn delete_all_classes(&self) -> Result<usize> {
        let removed = self
            .db
            .delete_all_classes()
            .map_err(|err| store_failure("delete all classes", err))?;
        info!(removed, "deleted all class aggregates");
        Ok(removed)
    }

    /// Catalog progress for a class. A missing class reports no progress.
    pub fn class_progress(&self, name: &str) -> Result<ClassProgress> {
        let class = ClassName::parse(name)?;
        let aggregate = self
            .db
            .get_class(class.key())
            .map_err(|err| store_failure("get class", err))?
            .unwrap_or_else(|| ClassAggregate::empty(&class, Utc::now()));
        let categories = self.catalog.progress(&aggregate.acquired_skills);
        Ok(ClassProgress {
            class: aggregate,
            categories,
        })
    }
}
