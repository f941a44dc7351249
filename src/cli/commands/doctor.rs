//! tg doctor - Health checks for the data store

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::HumanLayout;
use crate::core::class_name::is_canonical;
use crate::error::Result;
use crate::storage::Database;
use crate::storage::migrations::SCHEMA_VERSION;

use super::emit_record;

#[derive(Args, Debug)]
pub struct DoctorArgs {}

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    healthy: bool,
    database: String,
    checks: Vec<Check>,
}

pub fn run(ctx: &AppContext, _args: &DoctorArgs) -> Result<()> {
    let checks = run_checks(&ctx.db)?;
    let report = DoctorReport {
        healthy: checks.iter().all(|check| check.ok),
        database: ctx.config.database_path(&ctx.root).display().to_string(),
        checks,
    };
    emit_record(ctx, &report, |layout| render_report(layout, &report))
}

fn run_checks(db: &Database) -> Result<Vec<Check>> {
    let integrity = db.integrity_check()?;
    let schema = db.schema_version();
    let legacy: Vec<String> = db
        .list_classes()?
        .into_iter()
        .filter(|class| !is_canonical(&class.id))
        .map(|class| class.id)
        .collect();

    Ok(vec![
        Check {
            name: "integrity",
            ok: integrity,
            detail: if integrity {
                "sqlite integrity_check passed".to_string()
            } else {
                "sqlite integrity_check reported problems".to_string()
            },
        },
        Check {
            name: "schema",
            ok: schema == SCHEMA_VERSION,
            detail: format!("version {schema} of {SCHEMA_VERSION}"),
        },
        Check {
            name: "class_keys",
            ok: legacy.is_empty(),
            detail: if legacy.is_empty() {
                "every class aggregate uses its canonical key".to_string()
            } else {
                format!(
                    "legacy class ids {}; run `tg resync`",
                    legacy.join(", ")
                )
            },
        },
    ])
}

fn render_report(layout: &mut HumanLayout, report: &DoctorReport) {
    layout.title("tg doctor").kv("Database", &report.database);
    layout.blank();
    for check in &report.checks {
        let mark = if check.ok { "ok" } else { "FAIL" };
        layout.kv(&format!("[{mark}] {}", check.name), &check.detail);
    }
    if !report.healthy {
        layout.blank().push_line("Issues found");
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::test_utils::fixtures::{TestStore, stored_class};

    #[test]
    fn fresh_store_passes_every_check() {
        let store = TestStore::new();
        let checks = run_checks(&store.db).unwrap();
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|check| check.ok));
    }

    #[test]
    fn legacy_class_ids_are_flagged() {
        let store = TestStore::new();
        store.insert_class(&stored_class("A1", Utc::now(), &[]));
        store.insert_class(&stored_class("2ג", Utc::now(), &[]));

        let checks = run_checks(&store.db).unwrap();
        let keys = checks
            .iter()
            .find(|check| check.name == "class_keys")
            .unwrap();
        assert!(!keys.ok);
        assert!(keys.detail.contains("2ג"));
        assert!(!keys.detail.contains("A1"));
    }

    #[test]
    fn report_layout_marks_failures() {
        let report = DoctorReport {
            healthy: false,
            database: "/tmp/tg.db".to_string(),
            checks: vec![Check {
                name: "schema",
                ok: false,
                detail: "version 1 of 2".to_string(),
            }],
        };
        let mut layout = HumanLayout::plain();
        render_report(&mut layout, &report);
        let text = layout.build();
        assert!(text.contains("[FAIL] schema"));
        assert!(text.contains("Issues found"));
    }
}
