//! tg resync - Rebuild class aggregates from documentation entries

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::HumanLayout;
use crate::error::Result;
use crate::sync::{ResyncOptions, ResyncReport};

use super::emit_record;

#[derive(Args, Debug)]
pub struct ResyncArgs {
    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &ResyncArgs) -> Result<()> {
    let mut sync = ctx.synchronizer()?;
    let report = sync.sync_classes_with_documentations(&ResyncOptions {
        dry_run: args.dry_run,
    })?;
    emit_record(ctx, &report, |layout| render_report(layout, &report))
}

fn render_report(layout: &mut HumanLayout, report: &ResyncReport) {
    layout.title(if report.dry_run {
        "Resync (dry run)"
    } else {
        "Resync complete"
    });
    layout
        .kv("Entries scanned", &report.documentations_scanned.to_string())
        .kv("Duration", &format!("{} ms", report.duration_ms));

    let groups: [(&str, &[String]); 5] = [
        ("Rebuilt", &report.classes_rebuilt),
        ("Duplicates removed", &report.duplicates_removed),
        ("Reset", &report.classes_reset),
        ("Skills registered", &report.skills_registered),
        ("Entries skipped", &report.documentations_skipped),
    ];
    for (label, items) in groups {
        if items.is_empty() {
            continue;
        }
        layout.blank().section(&format!("{label} ({})", items.len()));
        for item in items {
            layout.bullet(item);
        }
    }
}
