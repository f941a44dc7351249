//! Activity records referenced by documentation entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TgError};

/// A link attached to an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    TeacherResource(ResourceLink),
    Worksheet(ResourceLink),
    Media(ResourceLink),
    RelatedActivity(ResourceLink),
}

impl Resource {
    #[must_use]
    pub const fn link(&self) -> &ResourceLink {
        match self {
            Self::TeacherResource(link)
            | Self::Worksheet(link)
            | Self::Media(link)
            | Self::RelatedActivity(link) => link,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TeacherResource(_) => "teacher_resource",
            Self::Worksheet(_) => "worksheet",
            Self::Media(_) => "media",
            Self::RelatedActivity(_) => "related_activity",
        }
    }

    /// Build a resource from a kind string as accepted on the command line.
    pub fn from_kind(kind: &str, link: ResourceLink) -> Result<Self> {
        match kind.trim().to_lowercase().replace('-', "_").as_str() {
            "teacher_resource" | "teacher" => Ok(Self::TeacherResource(link)),
            "worksheet" => Ok(Self::Worksheet(link)),
            "media" => Ok(Self::Media(link)),
            "related_activity" | "related" => Ok(Self::RelatedActivity(link)),
            other => Err(TgError::ValidationFailed(format!(
                "unknown resource kind {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub tree_type: String,
    #[serde(default)]
    pub grade_levels: Vec<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_outcomes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewActivity {
    pub name: String,
    pub subject: String,
    pub tree_type: String,
    pub grade_levels: Vec<String>,
    pub duration: String,
    pub description: String,
    pub skills: Vec<String>,
    pub materials: Vec<String>,
    pub steps: Vec<String>,
    pub expected_outcomes: Vec<String>,
    pub tags: Vec<String>,
    pub resources: Vec<Resource>,
}

impl NewActivity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.name, &self.resources)
    }
}

/// Partial update of an activity. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub tree_type: Option<String>,
    pub grade_levels: Option<Vec<String>>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub materials: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub expected_outcomes: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub resources: Option<Vec<Resource>>,
}

impl ActivityPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every set field onto `activity`. The name is trimmed.
    pub fn apply(self, activity: &mut Activity) {
        if let Some(name) = self.name {
            activity.name = name.trim().to_string();
        }
        if let Some(value) = self.subject {
            activity.subject = value;
        }
        if let Some(value) = self.tree_type {
            activity.tree_type = value;
        }
        if let Some(values) = self.grade_levels {
            activity.grade_levels = values;
        }
        if let Some(value) = self.duration {
            activity.duration = value;
        }
        if let Some(value) = self.description {
            activity.description = value;
        }
        if let Some(values) = self.skills {
            activity.skills = values;
        }
        if let Some(values) = self.materials {
            activity.materials = values;
        }
        if let Some(values) = self.steps {
            activity.steps = values;
        }
        if let Some(values) = self.expected_outcomes {
            activity.expected_outcomes = values;
        }
        if let Some(values) = self.tags {
            activity.tags = values;
        }
        if let Some(values) = self.resources {
            activity.resources = values;
        }
    }
}

impl Activity {
    /// Same rules as [`NewActivity::validate`].
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.name, &self.resources)
    }
}

fn validate_fields(name: &str, resources: &[Resource]) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TgError::ValidationFailed(
            "activity requires a name".to_string(),
        ));
    }
    for resource in resources {
        if resource.link().url.trim().is_empty() {
            return Err(TgError::ValidationFailed(format!(
                "{} resource {:?} has no url",
                resource.kind(),
                resource.link().title
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str) -> ResourceLink {
        ResourceLink {
            title: "דף עבודה".to_string(),
            url: url.to_string(),
            description: None,
        }
    }

    #[test]
    fn resource_serializes_with_type_tag() {
        let resource = Resource::Worksheet(link("https://example.org/w.pdf"));
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "worksheet");
        assert_eq!(json["url"], "https://example.org/w.pdf");
        assert!(json.get("description").is_none());

        let back: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn resource_kind_parsing() {
        let parsed = Resource::from_kind("related-activity", link("u")).unwrap();
        assert!(matches!(parsed, Resource::RelatedActivity(_)));
        assert_eq!(parsed.kind(), "related_activity");
        assert!(Resource::from_kind("poster", link("u")).is_err());
    }

    #[test]
    fn new_activity_validation() {
        assert!(NewActivity::default().validate().is_err());

        let mut activity = NewActivity::named("מדידת היקף גזע");
        assert!(activity.validate().is_ok());

        activity.resources.push(Resource::Media(link(" ")));
        assert!(activity.validate().is_err());
    }

    #[test]
    fn patch_applies_set_fields_and_trims_name() {
        let mut activity = Activity {
            id: "act-1".to_string(),
            name: "סיור".to_string(),
            subject: "טבע".to_string(),
            tree_type: String::new(),
            grade_levels: Vec::new(),
            duration: String::new(),
            description: String::new(),
            skills: Vec::new(),
            materials: Vec::new(),
            steps: Vec::new(),
            expected_outcomes: Vec::new(),
            tags: vec!["סתיו".to_string()],
            resources: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let patch = ActivityPatch {
            name: Some(" סיור חורף ".to_string()),
            tags: Some(Vec::new()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut activity);

        assert_eq!(activity.name, "סיור חורף");
        assert!(activity.tags.is_empty());
        assert_eq!(activity.subject, "טבע");
        assert!(activity.validate().is_ok());

        ActivityPatch {
            name: Some("  ".to_string()),
            ..Default::default()
        }
        .apply(&mut activity);
        assert!(activity.validate().is_err());
    }
}
