//! Documentation entries: one observed activity occurrence for one class.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TgError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    pub id: String,
    pub activity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_name: Option<String>,
    pub class_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub skill_ids: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub teacher_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a documentation entry. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocumentation {
    pub activity_id: String,
    pub class_name: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub skill_ids: Vec<String>,
    pub images: Vec<String>,
    pub teacher_name: String,
}

impl NewDocumentation {
    pub fn new(activity_id: impl Into<String>, class_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            activity_id: activity_id.into(),
            class_name: class_name.into(),
            title: String::new(),
            description: String::new(),
            date,
            skill_ids: Vec::new(),
            images: Vec::new(),
            teacher_name: String::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn teacher(mut self, teacher_name: impl Into<String>) -> Self {
        self.teacher_name = teacher_name.into();
        self
    }

    #[must_use]
    pub fn skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skill_ids = skills.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.activity_id.trim().is_empty() {
            return Err(TgError::ValidationFailed(
                "documentation requires an activity id".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of a documentation entry. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationPatch {
    pub activity_id: Option<String>,
    pub class_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub skill_ids: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub teacher_name: Option<String>,
}

impl DocumentationPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// A set `activity_id` must not be blank, matching [`NewDocumentation::validate`].
    pub fn validate(&self) -> Result<()> {
        if self
            .activity_id
            .as_deref()
            .is_some_and(|activity_id| activity_id.trim().is_empty())
        {
            return Err(TgError::ValidationFailed(
                "documentation requires an activity id".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply every set field onto `doc`.
    pub fn apply(self, doc: &mut Documentation) {
        if let Some(value) = self.activity_id {
            doc.activity_id = value;
        }
        if let Some(value) = self.class_name {
            doc.class_name = value;
        }
        if let Some(value) = self.title {
            doc.title = value;
        }
        if let Some(value) = self.description {
            doc.description = value;
        }
        if let Some(value) = self.date {
            doc.date = value;
        }
        if let Some(values) = self.skill_ids {
            doc.skill_ids = values;
        }
        if let Some(values) = self.images {
            doc.images = values;
        }
        if let Some(value) = self.teacher_name {
            doc.teacher_name = value;
        }
    }
}

/// Trim tags, drop blanks and duplicates, keep first-seen order.
#[must_use]
pub fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|existing| existing == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
