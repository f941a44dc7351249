//! tg class - Class skill aggregates

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::HumanLayout;
use crate::core::class::ClassAggregate;
use crate::core::class_name::grade_of;
use crate::error::{Result, TgError};

use super::{emit_list, emit_record, join_or_dash};

#[derive(Args, Debug)]
pub struct ClassArgs {
    #[command(subcommand)]
    pub command: ClassCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClassCommand {
    /// Show a class aggregate, creating an empty one if absent
    Show(NameArgs),
    /// List every class, one per display name
    List(ListArgs),
    /// Overwrite the acquired skills of an existing class
    SetSkills(SetSkillsArgs),
    /// Skill progress of a class per catalog category
    Progress(NameArgs),
    /// Delete every class aggregate (entries are kept)
    DeleteAll(DeleteAllArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Class name in any spelling (ג2, 2ג, C2)
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only classes of this grade letter
    #[arg(long)]
    pub grade: Option<String>,
}

#[derive(Args, Debug)]
pub struct SetSkillsArgs {
    pub name: String,

    /// Skill to set (repeatable); none clears the set
    #[arg(long = "skill")]
    pub skills: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeleteAllArgs {
    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

pub fn run(ctx: &AppContext, args: &ClassArgs) -> Result<()> {
    match &args.command {
        ClassCommand::Show(args) => run_show(ctx, args),
        ClassCommand::List(args) => run_list(ctx, args),
        ClassCommand::SetSkills(args) => run_set_skills(ctx, args),
        ClassCommand::Progress(args) => run_progress(ctx, args),
        ClassCommand::DeleteAll(args) => run_delete_all(ctx, args),
    }
}

fn run_show(ctx: &AppContext, args: &NameArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let class = sync.get_or_create_class(&args.name)?;
    emit_record(ctx, &class, |layout| render_class(layout, &class))
}

fn run_list(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let mut classes = sync.list_all_classes()?;
    if let Some(grade) = &args.grade {
        let wanted = grade_of(grade);
        classes.retain(|class| wanted.is_some() && grade_of(&class.id) == wanted);
    }

    emit_list(
        ctx,
        &classes,
        &["id", "name", "activities", "last_activity", "skills"],
        |class| {
            vec![
                class.id.clone(),
                class.display_name(),
                class.total_activities.to_string(),
                class
                    .last_activity
                    .map(|date| date.to_string())
                    .unwrap_or_default(),
                class.acquired_skills.len().to_string(),
            ]
        },
        |layout| {
            layout.section(&format!("Classes ({})", classes.len()));
            for class in &classes {
                layout.bullet(&format!(
                    "{}  {} activities, {} skills, last {}",
                    class.display_name(),
                    class.total_activities,
                    class.acquired_skills.len(),
                    class
                        .last_activity
                        .map_or_else(|| "-".to_string(), |date| date.to_string())
                ));
            }
        },
    )
}

fn run_set_skills(ctx: &AppContext, args: &SetSkillsArgs) -> Result<()> {
    let mut sync = ctx.synchronizer()?;
    let class = sync.update_class_skills(&args.name, args.skills.clone())?;
    emit_record(ctx, &class, |layout| render_class(layout, &class))
}

fn run_progress(ctx: &AppContext, args: &NameArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let progress = sync.class_progress(&args.name)?;
    emit_record(ctx, &progress, |layout| {
        layout.title(&format!("Progress of {}", progress.class.display_name()));
        for category in &progress.categories {
            if category.total == 0 && category.acquired.is_empty() {
                continue;
            }
            layout.kv(
                category.title.as_str(),
                &format!(
                    "{}/{} ({:.0}%)",
                    category.acquired.len(),
                    category.total,
                    category.percentage
                ),
            );
        }
    })
}

fn run_delete_all(ctx: &AppContext, args: &DeleteAllArgs) -> Result<()> {
    if !args.yes {
        return Err(TgError::ValidationFailed(
            "refusing to delete every class without --yes".to_string(),
        ));
    }
    let sync = ctx.synchronizer()?;
    let removed = sync.delete_all_classes()?;
    let payload = serde_json::json!({ "removed": removed });
    emit_record(ctx, &payload, |layout| {
        layout.push_line(format!("Deleted {removed} class aggregates"));
    })
}

fn render_class(layout: &mut HumanLayout, class: &ClassAggregate) {
    layout
        .title(&format!("Class {}", class.display_name()))
        .kv("Key", &class.id)
        .kv("Activities", &class.total_activities.to_string())
        .kv(
            "Last activity",
            &class
                .last_activity
                .map_or_else(|| "-".to_string(), |date| date.to_string()),
        )
        .kv("Skills", &join_or_dash(&class.acquired_skills));
}
