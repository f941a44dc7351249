//! Activity records. The synchronizer reads them but never changes them
//! while writing documentation.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::core::activity::{Activity, ActivityPatch, NewActivity};
use crate::error::{Result, TgError};

use super::engine::{Synchronizer, store_failure};

impl Synchronizer {
    pub fn add_activity(&self, new: NewActivity) -> Result<Activity> {
        new.validate()?;
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            subject: new.subject,
            tree_type: new.tree_type,
            grade_levels: new.grade_levels,
            duration: new.duration,
            description: new.description,
            skills: new.skills,
            materials: new.materials,
            steps: new.steps,
            expected_outcomes: new.expected_outcomes,
            tags: new.tags,
            resources: new.resources,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.db
            .insert_activity(&activity)
            .map_err(|err| store_failure("add activity", err))?;
        info!(id = %activity.id, name = %activity.name, "added activity");
        Ok(activity)
    }

    pub fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        self.db
            .get_activity(id)
            .map_err(|err| store_failure("get activity", err))
    }

    pub fn list_activities(&self) -> Result<Vec<Activity>> {
        self.db
            .list_activities()
            .map_err(|err| store_failure("list activities", err))
    }

    /// Apply a partial update. A rename is copied onto the cached
    /// `activity_name` of every entry that references the activity.
    pub fn update_activity(&self, id: &str, patch: ActivityPatch) -> Result<Activity> {
        let (activity, renamed) = self
            .db
            .with_transaction(|db| {
                let mut activity = db
                    .get_activity(id)?
                    .ok_or_else(|| TgError::ActivityNotFound(id.to_string()))?;
                let previous_name = activity.name.clone();
                patch.apply(&mut activity);
                activity.validate()?;
                activity.updated_at = Some(Utc::now());

                if !db.update_activity(&activity)? {
                    return Err(TgError::ActivityNotFound(id.to_string()));
                }
                let renamed = if activity.name == previous_name {
                    0
                } else {
                    db.set_documentation_activity_name(id, &activity.name)?
                };
                Ok((activity, renamed))
            })
            .map_err(|err| store_failure("update activity", err))?;

        info!(id, name = %activity.name, entries_renamed = renamed, "updated activity");
        Ok(activity)
    }

    pub fn delete_activity(&self, id: &str) -> Result<()> {
        let removed = self
            .db
            .delete_activity(id)
            .map_err(|err| store_failure("delete activity", err))?;
        if !removed {
            return Err(TgError::ActivityNotFound(id.to_string()));
        }
        info!(id, "deleted activity");
        Ok(())
    }
}
