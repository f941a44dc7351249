//! SQLite database layer

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use serde::de::DeserializeOwned;

use crate::core::activity::Activity;
use crate::core::class::ClassAggregate;
use crate::core::class_name::to_canonical_alphabet;
use crate::core::documentation::Documentation;
use crate::error::Result;
use crate::storage::migrations;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const DATE_FORMAT: &str = "%Y-%m-%d";

const DOCUMENTATION_COLUMNS: &str = "id, activity_id, activity_name, class_name, title, \
     description, date, skill_ids_json, images_json, teacher_name, created_at, updated_at";

const CLASS_COLUMNS: &str =
    "id, name, acquired_skills_json, total_activities, last_activity, created_at, updated_at";

const ACTIVITY_COLUMNS: &str = "id, name, subject, tree_type, grade_levels_json, duration, \
     description, skills_json, materials_json, steps_json, expected_outcomes_json, tags_json, \
     resources_json, created_at, updated_at";

/// SQLite database wrapper for documentation, class and skill records
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_busy_timeout(path, Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))
    }

    pub fn open_with_busy_timeout(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        Self::configure_pragmas(&conn)?;
        let schema_version = migrations::run_migrations(&conn)?;

        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front. Any error from `f` rolls back every
    /// statement it issued. Calls must not nest.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    // ---------------------------------------------------------------------
    // documentations
    // ---------------------------------------------------------------------

    /// Insert an entry as given. The class key column is derived here so
    /// rows are found by class whatever literal form `class_name` holds.
    pub fn insert_documentation(&self, doc: &Documentation) -> Result<()> {
        self.conn.execute(
            "INSERT INTO documentations (id, activity_id, activity_name, class_name, class_key, \
             title, description, date, skill_ids_json, images_json, teacher_name, created_at, \
             updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                doc.id,
                doc.activity_id,
                doc.activity_name,
                doc.class_name,
                to_canonical_alphabet(&doc.class_name),
                doc.title,
                doc.description,
                format_date(doc.date),
                serde_json::to_string(&doc.skill_ids)?,
                serde_json::to_string(&doc.images)?,
                doc.teacher_name,
                format_timestamp(doc.created_at),
                doc.updated_at.map(format_timestamp),
            ],
        )?;
        Ok(())
    }

    /// Overwrite every field of an existing entry. Returns false if the id is absent.
    pub fn update_documentation(&self, doc: &Documentation) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE documentations SET activity_id = ?2, activity_name = ?3, class_name = ?4, \
             class_key = ?5, title = ?6, description = ?7, date = ?8, skill_ids_json = ?9, \
             images_json = ?10, teacher_name = ?11, created_at = ?12, updated_at = ?13 \
             WHERE id = ?1",
            params![
                doc.id,
                doc.activity_id,
                doc.activity_name,
                doc.class_name,
                to_canonical_alphabet(&doc.class_name),
                doc.title,
                doc.description,
                format_date(doc.date),
                serde_json::to_string(&doc.skill_ids)?,
                serde_json::to_string(&doc.images)?,
                doc.teacher_name,
                format_timestamp(doc.created_at),
                doc.updated_at.map(format_timestamp),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn get_documentation(&self, id: &str) -> Result<Option<Documentation>> {
        let sql = format!("SELECT {DOCUMENTATION_COLUMNS} FROM documentations WHERE id = ?");
        let doc = self
            .conn
            .query_row(&sql, [id], documentation_from_row)
            .optional()?;
        Ok(doc)
    }

    pub fn delete_documentation(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM documentations WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    /// All entries, newest date first.
    pub fn list_documentations(&self) -> Result<Vec<Documentation>> {
        let sql = format!(
            "SELECT {DOCUMENTATION_COLUMNS} FROM documentations ORDER BY date DESC, created_at DESC"
        );
        self.query_documentations(&sql, [])
    }

    /// Entries whose class normalizes to `class_key`, newest date first.
    pub fn list_documentations_by_class_key(&self, class_key: &str) -> Result<Vec<Documentation>> {
        let sql = format!(
            "SELECT {DOCUMENTATION_COLUMNS} FROM documentations WHERE class_key = ? \
             ORDER BY date DESC, created_at DESC"
        );
        self.query_documentations(&sql, [class_key])
    }

    pub fn list_documentations_by_activity(&self, activity_id: &str) -> Result<Vec<Documentation>> {
        let sql = format!(
            "SELECT {DOCUMENTATION_COLUMNS} FROM documentations WHERE activity_id = ? \
             ORDER BY date DESC, created_at DESC"
        );
        self.query_documentations(&sql, [activity_id])
    }

    pub fn count_documentations(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documentations", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn query_documentations<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Documentation>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, documentation_from_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    // ---------------------------------------------------------------------
    // classes
    // ---------------------------------------------------------------------

    /// Look up an aggregate by its literal stored id.
    pub fn get_class(&self, id: &str) -> Result<Option<ClassAggregate>> {
        let sql = format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = ?");
        let class = self.conn.query_row(&sql, [id], class_from_row).optional()?;
        Ok(class)
    }

    pub fn upsert_class(&self, class: &ClassAggregate) -> Result<()> {
        self.conn.execute(
            "INSERT INTO classes (id, name, acquired_skills_json, total_activities, last_activity, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, \
             acquired_skills_json = excluded.acquired_skills_json, \
             total_activities = excluded.total_activities, \
             last_activity = excluded.last_activity, \
             updated_at = excluded.updated_at",
            params![
                class.id,
                class.name,
                serde_json::to_string(&class.acquired_skills)?,
                i64::from(class.total_activities),
                class.last_activity.map(format_date),
                format_timestamp(class.created_at),
                format_timestamp(class.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn delete_class(&self, id: &str) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM classes WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    /// Every stored aggregate, literal ids included.
    pub fn list_classes(&self) -> Result<Vec<ClassAggregate>> {
        let sql = format!("SELECT {CLASS_COLUMNS} FROM classes ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], class_from_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn delete_all_classes(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM classes", [])?)
    }

    // ---------------------------------------------------------------------
    // skills
    // ---------------------------------------------------------------------

    /// Custom skill names in registration order.
    pub fn list_custom_skills(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM skills ORDER BY created_at, name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Register a custom skill. Returns false if the name was already stored.
    pub fn insert_custom_skill(&self, name: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO skills (name, category, created_at) VALUES (?1, 'custom', ?2)",
            params![name, format_timestamp(Utc::now())],
        )?;
        Ok(changed > 0)
    }

    // ---------------------------------------------------------------------
    // activities
    // ---------------------------------------------------------------------

    pub fn insert_activity(&self, activity: &Activity) -> Result<()> {
        self.conn.execute(
            "INSERT INTO activities (id, name, subject, tree_type, grade_levels_json, duration, \
             description, skills_json, materials_json, steps_json, expected_outcomes_json, \
             tags_json, resources_json, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                activity.id,
                activity.name,
                activity.subject,
                activity.tree_type,
                serde_json::to_string(&activity.grade_levels)?,
                activity.duration,
                activity.description,
                serde_json::to_string(&activity.skills)?,
                serde_json::to_string(&activity.materials)?,
                serde_json::to_string(&activity.steps)?,
                serde_json::to_string(&activity.expected_outcomes)?,
                serde_json::to_string(&activity.tags)?,
                serde_json::to_string(&activity.resources)?,
                format_timestamp(activity.created_at),
                activity.updated_at.map(format_timestamp),
            ],
        )?;
        Ok(())
    }

    pub fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?");
        let activity = self
            .conn
            .query_row(&sql, [id], activity_from_row)
            .optional()?;
        Ok(activity)
    }

    /// All activities, most recently created first.
    pub fn list_activities(&self) -> Result<Vec<Activity>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY created_at DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], activity_from_row)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Overwrite every field of an existing activity. Returns false if the id is absent.
    pub fn update_activity(&self, activity: &Activity) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE activities SET name = ?2, subject = ?3, tree_type = ?4, \
             grade_levels_json = ?5, duration = ?6, description = ?7, skills_json = ?8, \
             materials_json = ?9, steps_json = ?10, expected_outcomes_json = ?11, \
             tags_json = ?12, resources_json = ?13, created_at = ?14, updated_at = ?15 \
             WHERE id = ?1",
            params![
                activity.id,
                activity.name,
                activity.subject,
                activity.tree_type,
                serde_json::to_string(&activity.grade_levels)?,
                activity.duration,
                activity.description,
                serde_json::to_string(&activity.skills)?,
                serde_json::to_string(&activity.materials)?,
                serde_json::to_string(&activity.steps)?,
                serde_json::to_string(&activity.expected_outcomes)?,
                serde_json::to_string(&activity.tags)?,
                serde_json::to_string(&activity.resources)?,
                format_timestamp(activity.created_at),
                activity.updated_at.map(format_timestamp),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Rewrite the cached activity name on every entry of `activity_id`.
    pub fn set_documentation_activity_name(&self, activity_id: &str, name: &str) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE documentations SET activity_name = ?2 WHERE activity_id = ?1",
            params![activity_id, name],
        )?;
        Ok(changed)
    }

    pub fn delete_activity(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}

pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| conversion_error(idx, err))
}

fn optional_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|value| Some(value.with_timezone(&Utc)))
            .map_err(|err| conversion_error(idx, err)),
        None => Ok(None),
    }
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|err| conversion_error(idx, err))
}

fn optional_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(Some)
            .map_err(|err| conversion_error(idx, err)),
        None => Ok(None),
    }
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|err| conversion_error(idx, err))
}

fn documentation_from_row(row: &Row<'_>) -> rusqlite::Result<Documentation> {
    Ok(Documentation {
        id: row.get(0)?,
        activity_id: row.get(1)?,
        activity_name: row.get(2)?,
        class_name: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        date: date_column(row, 6)?,
        skill_ids: json_column(row, 7)?,
        images: json_column(row, 8)?,
        teacher_name: row.get(9)?,
        created_at: timestamp_column(row, 10)?,
        updated_at: optional_timestamp_column(row, 11)?,
    })
}

fn class_from_row(row: &Row<'_>) -> rusqlite::Result<ClassAggregate> {
    let total: i64 = row.get(3)?;
    Ok(ClassAggregate {
        id: row.get(0)?,
        name: row.get(1)?,
        acquired_skills: json_column(row, 2)?,
        total_activities: u32::try_from(total).map_err(|err| conversion_error(3, err))?,
        last_activity: optional_date_column(row, 4)?,
        created_at: timestamp_column(row, 5)?,
        updated_at: timestamp_column(row, 6)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        name: row.get(1)?,
        subject: row.get(2)?,
        tree_type: row.get(3)?,
        grade_levels: json_column(row, 4)?,
        duration: row.get(5)?,
        description: row.get(6)?,
        skills: json_column(row, 7)?,
        materials: json_column(row, 8)?,
        steps: json_column(row, 9)?,
        expected_outcomes: json_column(row, 10)?,
        tags: json_column(row, 11)?,
        resources: json_column(row, 12)?,
        created_at: timestamp_column(row, 13)?,
        updated_at: optional_timestamp_column(row, 14)?,
    })
}
