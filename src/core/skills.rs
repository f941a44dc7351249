//! Skill catalog: the fixed core categories plus custom skills seen in data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TgError};

/// Skill groups. `Custom` holds every tag outside the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Thinking,
    Learning,
    Personal,
    Social,
    Custom,
}

impl SkillCategory {
    pub const CORE: [Self; 4] = [Self::Thinking, Self::Learning, Self::Personal, Self::Social];

    /// Display title shown to teachers.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Thinking => "חשיבה",
            Self::Learning => "למידה",
            Self::Personal => "אישי",
            Self::Social => "חברתי",
            Self::Custom => "מיומנויות נוספות",
        }
    }

    /// Fixed skills of a core category. Empty for `Custom`.
    #[must_use]
    pub const fn core_skills(self) -> &'static [&'static str] {
        match self {
            Self::Thinking => &[
                "חשיבה ביקורתית",
                "חשיבה יצירתית",
                "פתרון בעיות",
                "קבלת החלטות",
                "חשיבה מתמטית",
                "חשיבה מדעית",
            ],
            Self::Learning => &[
                "הכוונה עצמית בלמידה",
                "חיפוש ואיתור מידע",
                "ארגון וניהול מידע",
                "ייצוג מידע",
                "הסקת מסקנות",
            ],
            Self::Personal => &[
                "מודעות עצמית",
                "הנעה עצמית",
                "התמדה",
                "אחריות אישית",
                "ניהול זמן",
            ],
            Self::Social => &["עבודת צוות", "תקשורת", "שיתוף פעולה", "מנהיגות", "אמפתיה"],
            Self::Custom => &[],
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Learning => "learning",
            Self::Personal => "personal",
            Self::Social => "social",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a tagged skill that is not in the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillPolicy {
    /// Keep the tag and register it as a custom skill.
    #[default]
    Promote,
    /// Silently remove the tag before the write.
    Drop,
    /// Fail the write.
    Reject,
}

impl std::str::FromStr for SkillPolicy {
    type Err = TgError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "promote" => Ok(Self::Promote),
            "drop" | "filter" => Ok(Self::Drop),
            "reject" | "strict" => Ok(Self::Reject),
            _ => Err(TgError::Config(format!(
                "invalid skill policy {value} (expected promote|drop|reject)"
            ))),
        }
    }
}

/// Per-category acquisition summary for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProgress {
    pub category: SkillCategory,
    pub title: String,
    pub acquired: Vec<String>,
    pub total: usize,
    pub percentage: f64,
}

/// Core skills plus the custom skills registered so far.
///
/// The catalog is an owned value; callers persist custom additions
/// themselves (see `Synchronizer`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillCatalog {
    custom: Vec<String>,
}

impl SkillCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from previously persisted custom skill names.
    ///
    /// Core names and duplicates in `custom` are ignored.
    pub fn with_custom<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for name in custom {
            catalog.add_custom_skill(name.as_ref());
        }
        catalog
    }

    #[must_use]
    pub fn is_core_skill(name: &str) -> bool {
        SkillCategory::CORE
            .iter()
            .any(|category| category.core_skills().contains(&name))
    }

    /// Register a custom skill. Returns true if the name was newly added.
    pub fn add_custom_skill(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || Self::is_core_skill(name) || self.is_custom_skill(name) {
            return false;
        }
        self.custom.push(name.to_string());
        true
    }

    #[must_use]
    pub fn is_custom_skill(&self, name: &str) -> bool {
        self.custom.iter().any(|existing| existing == name)
    }

    #[must_use]
    pub fn custom_skills(&self) -> &[String] {
        &self.custom
    }

    /// Every name in the fixed categories.
    #[must_use]
    pub fn all_valid_skill_names() -> Vec<&'static str> {
        SkillCategory::CORE
            .iter()
            .flat_map(|category| category.core_skills().iter().copied())
            .collect()
    }

    /// Category of a skill name, if the catalog knows it.
    #[must_use]
    pub fn category_of(&self, name: &str) -> Option<SkillCategory> {
        SkillCategory::CORE
            .into_iter()
            .find(|category| category.core_skills().contains(&name))
            .or_else(|| self.is_custom_skill(name).then_some(SkillCategory::Custom))
    }

    /// Acquisition progress per category for a set of acquired skills.
    #[must_use]
    pub fn progress(&self, acquired: &[String]) -> Vec<CategoryProgress> {
        let acquired: BTreeSet<&str> = acquired.iter().map(String::as_str).collect();
        let mut out = Vec::with_capacity(5);

        for category in SkillCategory::CORE {
            let names: Vec<&str> = category.core_skills().to_vec();
            out.push(category_progress(category, &names, &acquired));
        }
        let custom: Vec<&str> = self.custom.iter().map(String::as_str).collect();
        out.push(category_progress(SkillCategory::Custom, &custom, &acquired));
        out
    }
}

fn category_progress(
    category: SkillCategory,
    names: &[&str],
    acquired: &BTreeSet<&str>,
) -> CategoryProgress {
    let hits: Vec<String> = names
        .iter()
        .filter(|name| acquired.contains(*name))
        .map(|name| (*name).to_string())
        .collect();
    let total = names.len();
    #[allow(clippy::cast_precision_loss)]
    let percentage = if total == 0 {
        0.0
    } else {
        hits.len() as f64 * 100.0 / total as f64
    };
    CategoryProgress {
        category,
        title: category.title().to_string(),
        acquired: hits,
        total,
        percentage,
    }
}
