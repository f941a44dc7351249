//! Bulk rebuild of every class aggregate from the full set of entries.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::class::{ClassAggregate, SkillSummary};
use crate::core::class_name::{ClassName, is_canonical, to_canonical_alphabet};
use crate::core::documentation::Documentation;
use crate::core::skills::{SkillCatalog, SkillPolicy};
use crate::error::Result;
use crate::storage::Database;

use super::engine::{Synchronizer, store_failure};

#[derive(Debug, Clone, Copy, Default)]
pub struct ResyncOptions {
    /// Compute the report without writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResyncReport {
    pub dry_run: bool,
    pub documentations_scanned: usize,
    /// Canonical keys of the aggregates rebuilt from entries.
    pub classes_rebuilt: Vec<String>,
    /// Literal ids of non-canonical aggregates removed.
    pub duplicates_removed: Vec<String>,
    /// Canonical keys of aggregates with no entries that were emptied,
    /// including legacy-only records moved under their canonical key.
    pub classes_reset: Vec<String>,
    /// Unknown skills registered as custom.
    pub skills_registered: Vec<String>,
    /// Entries skipped because their class name is empty.
    pub documentations_skipped: Vec<String>,
    pub duration_ms: u64,
}

impl ResyncReport {
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} entries, {} classes rebuilt, {} duplicates removed, {} reset, {} skills registered",
            self.documentations_scanned,
            self.classes_rebuilt.len(),
            self.duplicates_removed.len(),
            self.classes_reset.len(),
            self.skills_registered.len()
        )
    }
}

struct ClassGroup<'a> {
    class: ClassName,
    entries: Vec<&'a Documentation>,
}

struct ResyncPlan<'a> {
    groups: BTreeMap<String, ClassGroup<'a>>,
    /// Earliest `created_at` among stored aggregates per canonical key.
    created_at: BTreeMap<String, DateTime<Utc>>,
    resets: Vec<ClassAggregate>,
    /// Empty aggregates replacing legacy records whose class has no
    /// entries and no canonical record.
    migrations: BTreeMap<String, ClassName>,
    duplicates: Vec<String>,
    unknown_skills: BTreeSet<String>,
    skipped: Vec<String>,
}

impl Synchronizer {
    /// Rebuild every class aggregate from the documentation entries.
    ///
    /// Non-canonical aggregate records are removed, one aggregate per class
    /// key is written, and aggregates without entries are emptied. A legacy
    /// record with neither entries nor a canonical twin is moved under its
    /// canonical key as an empty aggregate.
    /// Runs as one transaction unless `dry_run` is set.
    pub fn sync_classes_with_documentations(
        &mut self,
        options: &ResyncOptions,
    ) -> Result<ResyncReport> {
        let started = Instant::now();
        let policy = self.policy;
        let mut catalog = self.catalog.clone();

        let outcome = if options.dry_run {
            plan_and_apply(&self.db, &mut catalog, policy, true)
        } else {
            self.db
                .with_transaction(|db| plan_and_apply(db, &mut catalog, policy, false))
        };
        let mut report =
            outcome.map_err(|err| store_failure("sync classes with documentations", err))?;

        if !options.dry_run {
            self.catalog = catalog;
        }
        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            dry_run = options.dry_run,
            duration_ms = report.duration_ms,
            "{}",
            report.summary_line()
        );
        Ok(report)
    }
}

fn plan_and_apply(
    db: &Database,
    catalog: &mut SkillCatalog,
    policy: SkillPolicy,
    dry_run: bool,
) -> Result<ResyncReport> {
    let entries = db.list_documentations()?;
    let stored = db.list_classes()?;
    let plan = build_plan(&entries, stored, catalog);

    let now = Utc::now();
    let mut report = ResyncReport {
        dry_run,
        documentations_scanned: entries.len(),
        classes_rebuilt: plan.groups.keys().cloned().collect(),
        duplicates_removed: plan.duplicates.clone(),
        classes_reset: plan
            .resets
            .iter()
            .map(|class| class.id.clone())
            .chain(plan.migrations.keys().cloned())
            .collect(),
        skills_registered: Vec::new(),
        documentations_skipped: plan.skipped.clone(),
        duration_ms: 0,
    };

    if policy == SkillPolicy::Promote {
        report.skills_registered = plan.unknown_skills.iter().cloned().collect();
    }
    if dry_run {
        return Ok(report);
    }

    for id in &plan.duplicates {
        db.delete_class(id)?;
    }

    for (key, group) in &plan.groups {
        let created_at = plan.created_at.get(key).copied().unwrap_or(now);
        let mut aggregate = ClassAggregate::empty(&group.class, created_at);
        aggregate.apply_summary(SkillSummary::from_entries(group.entries.iter().copied()), now);
        db.upsert_class(&aggregate)?;
    }

    for (key, class) in &plan.migrations {
        let created_at = plan.created_at.get(key).copied().unwrap_or(now);
        let mut aggregate = ClassAggregate::empty(class, created_at);
        aggregate.updated_at = now;
        db.upsert_class(&aggregate)?;
    }

    for mut class in plan.resets {
        class.apply_summary(SkillSummary::default(), now);
        db.upsert_class(&class)?;
    }

    for skill in &report.skills_registered {
        db.insert_custom_skill(skill)?;
        catalog.add_custom_skill(skill);
    }

    Ok(report)
}

fn build_plan<'a>(
    entries: &'a [Documentation],
    stored: Vec<ClassAggregate>,
    catalog: &SkillCatalog,
) -> ResyncPlan<'a> {
    let mut groups: BTreeMap<String, ClassGroup<'a>> = BTreeMap::new();
    let mut unknown_skills = BTreeSet::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let Ok(class) = ClassName::parse(&entry.class_name) else {
            warn!(id = %entry.id, "documentation has no class name; skipped");
            skipped.push(entry.id.clone());
            continue;
        };
        for skill in &entry.skill_ids {
            if !SkillCatalog::is_core_skill(skill) && !catalog.is_custom_skill(skill) {
                unknown_skills.insert(skill.clone());
            }
        }
        groups
            .entry(class.key().to_string())
            .or_insert_with(|| ClassGroup {
                class,
                entries: Vec::new(),
            })
            .entries
            .push(entry);
    }

    let canonical_ids: BTreeSet<String> = stored
        .iter()
        .filter(|class| is_canonical(&class.id))
        .map(|class| class.id.clone())
        .collect();
    let mut created_at: BTreeMap<String, DateTime<Utc>> = BTreeMap::new();
    let mut duplicates = Vec::new();
    let mut resets = Vec::new();
    let mut migrations = BTreeMap::new();

    for class in stored {
        let key = to_canonical_alphabet(&class.id);
        created_at
            .entry(key.clone())
            .and_modify(|earliest| *earliest = (*earliest).min(class.created_at))
            .or_insert(class.created_at);

        if !is_canonical(&class.id) {
            if !groups.contains_key(&key) && !canonical_ids.contains(&key) {
                match ClassName::parse(&class.id) {
                    Ok(name) => {
                        migrations.entry(key).or_insert(name);
                    }
                    Err(_) => warn!(id = %class.id, "stored class id is blank; removing"),
                }
            }
            duplicates.push(class.id);
        } else if !groups.contains_key(&key) && !is_empty_aggregate(&class) {
            resets.push(class);
        }
    }

    ResyncPlan {
        groups,
        created_at,
        resets,
        migrations,
        duplicates,
        unknown_skills,
        skipped,
    }
}

fn is_empty_aggregate(class: &ClassAggregate) -> bool {
    class.acquired_skills.is_empty() && class.total_activities == 0 && class.last_activity.is_none()
}
