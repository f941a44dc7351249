//! Class aggregates derived from documentation entries.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::class_name::{ClassName, to_display_alphabet};
use super::documentation::Documentation;

/// Per-class summary of acquired skills and activity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAggregate {
    /// Storage key. Canonical for every record written by this crate.
    pub id: String,
    /// Display name.
    pub name: String,
    pub acquired_skills: Vec<String>,
    pub total_activities: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassAggregate {
    /// A fresh aggregate with no skills and no activities.
    #[must_use]
    pub fn empty(class: &ClassName, now: DateTime<Utc>) -> Self {
        Self {
            id: class.key().to_string(),
            name: class.display().to_string(),
            acquired_skills: Vec::new(),
            total_activities: 0,
            last_activity: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the derived fields with `summary`.
    pub fn apply_summary(&mut self, summary: SkillSummary, now: DateTime<Utc>) {
        self.acquired_skills = summary.acquired_skills;
        self.total_activities = summary.total_activities;
        self.last_activity = summary.last_activity;
        self.updated_at = now;
    }

    /// Display name derived from the key, whatever form the key was stored in.
    #[must_use]
    pub fn display_name(&self) -> String {
        to_display_alphabet(&self.id)
    }
}

/// The values a class aggregate derives from its documentation entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    /// Sorted union of every entry's skill tags.
    pub acquired_skills: Vec<String>,
    pub total_activities: u32,
    pub last_activity: Option<NaiveDate>,
}

impl SkillSummary {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a Documentation>,
    {
        let mut skills = BTreeSet::new();
        let mut total: u32 = 0;
        let mut last: Option<NaiveDate> = None;

        for entry in entries {
            total = total.saturating_add(1);
            skills.extend(entry.skill_ids.iter().cloned());
            last = last.max(Some(entry.date));
        }

        Self {
            acquired_skills: skills.into_iter().collect(),
            total_activities: total,
            last_activity: last,
        }
    }
}

/// Collapse aggregates that share a display name; the later `updated_at` wins.
///
/// Output is sorted by display name.
#[must_use]
pub fn dedupe_by_display(classes: Vec<ClassAggregate>) -> Vec<ClassAggregate> {
    let mut by_display: HashMap<String, ClassAggregate> = HashMap::new();
    for class in classes {
        let display = class.display_name();
        match by_display.get(&display) {
            Some(existing) if existing.updated_at >= class.updated_at => {}
            _ => {
                by_display.insert(display, class);
            }
        }
    }

    let mut out: Vec<(String, ClassAggregate)> = by_display.into_iter().collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out.into_iter().map(|(_, class)| class).collect()
}
