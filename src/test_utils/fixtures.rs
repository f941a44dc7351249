use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;

use crate::core::activity::{Activity, NewActivity};
use crate::core::class::ClassAggregate;
use crate::core::class_name::to_display_alphabet;
use crate::core::documentation::Documentation;
use crate::core::skills::SkillPolicy;
use crate::storage::Database;
use crate::sync::Synchronizer;

/// Isolated database in a temp directory.
pub struct TestStore {
    pub temp_dir: TempDir,
    pub db: Arc<Database>,
}

impl TestStore {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("treeguard.db");
        let db = Database::open(&path).expect("Failed to open test database");
        println!("[FIXTURE] Opened test database: {:?}", path);
        Self {
            temp_dir,
            db: Arc::new(db),
        }
    }

    pub fn synchronizer(&self, policy: SkillPolicy) -> Synchronizer {
        Synchronizer::new(Arc::clone(&self.db), policy).expect("Failed to create synchronizer")
    }

    pub fn add_activity(&self, new: NewActivity) -> Activity {
        self.synchronizer(SkillPolicy::Promote)
            .add_activity(new)
            .expect("Failed to add activity")
    }

    /// Write an entry as-is, without normalization or recompute.
    pub fn insert_documentation(&self, doc: &Documentation) {
        self.db
            .insert_documentation(doc)
            .expect("Failed to insert documentation");
    }

    /// Write an aggregate as-is.
    pub fn insert_class(&self, class: &ClassAggregate) {
        self.db.upsert_class(class).expect("Failed to insert class");
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A date in May 2024.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).expect("valid day of May")
}

/// An entry with a literal class name, as older writers stored them.
pub fn legacy_documentation(
    id: &str,
    class_name: &str,
    date: NaiveDate,
    skills: &[&str],
) -> Documentation {
    Documentation {
        id: id.to_string(),
        activity_id: "legacy-activity".to_string(),
        activity_name: None,
        class_name: class_name.to_string(),
        title: format!("entry {id}"),
        description: String::new(),
        date,
        skill_ids: skills.iter().map(|s| (*s).to_string()).collect(),
        images: Vec::new(),
        teacher_name: String::new(),
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// An aggregate record stored under a literal id.
pub fn stored_class(id: &str, updated_at: DateTime<Utc>, skills: &[&str]) -> ClassAggregate {
    ClassAggregate {
        id: id.to_string(),
        name: to_display_alphabet(id),
        acquired_skills: skills.iter().map(|s| (*s).to_string()).collect(),
        total_activities: 0,
        last_activity: None,
        created_at: updated_at,
        updated_at,
    }
}
