//! tg activity - Activity records

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::HumanLayout;
use crate::core::activity::{Activity, ActivityPatch, NewActivity, Resource, ResourceLink};
use crate::error::{Result, TgError};

use super::{emit_list, emit_record, join_or_dash};

#[derive(Args, Debug)]
pub struct ActivityArgs {
    #[command(subcommand)]
    pub command: ActivityCommand,
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// Create an activity
    Add(AddArgs),
    /// Change fields of an activity
    Edit(EditArgs),
    /// Show one activity
    Show(IdArgs),
    /// List activities, newest first
    List,
    /// Delete an activity
    Delete(IdArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Activity name
    #[arg(required_unless_present = "from_json")]
    pub name: Option<String>,

    /// Read the activity from a JSON file instead of flags
    #[arg(long, conflicts_with = "name")]
    pub from_json: Option<PathBuf>,

    #[arg(long, default_value = "")]
    pub subject: String,

    #[arg(long, default_value = "")]
    pub tree_type: String,

    /// Grade level (repeatable)
    #[arg(long = "grade")]
    pub grade_levels: Vec<String>,

    #[arg(long, default_value = "")]
    pub duration: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Skill (repeatable)
    #[arg(long = "skill")]
    pub skills: Vec<String>,

    /// Material (repeatable)
    #[arg(long = "material")]
    pub materials: Vec<String>,

    /// Step, in order (repeatable)
    #[arg(long = "step")]
    pub steps: Vec<String>,

    /// Expected outcome (repeatable)
    #[arg(long = "outcome")]
    pub expected_outcomes: Vec<String>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Resource as `kind|title|url` (repeatable)
    #[arg(long = "resource")]
    pub resources: Vec<String>,
}

/// List flags replace the whole list when given.
#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub subject: Option<String>,

    #[arg(long)]
    pub tree_type: Option<String>,

    #[arg(long = "grade")]
    pub grade_levels: Vec<String>,

    #[arg(long)]
    pub duration: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long = "skill")]
    pub skills: Vec<String>,

    #[arg(long = "material")]
    pub materials: Vec<String>,

    #[arg(long = "step")]
    pub steps: Vec<String>,

    #[arg(long = "outcome")]
    pub expected_outcomes: Vec<String>,

    #[arg(long = "tag", conflicts_with = "clear_tags")]
    pub tags: Vec<String>,

    /// Remove every tag
    #[arg(long)]
    pub clear_tags: bool,

    /// Resource as `kind|title|url` (repeatable)
    #[arg(long = "resource")]
    pub resources: Vec<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

pub fn run(ctx: &AppContext, args: &ActivityArgs) -> Result<()> {
    match &args.command {
        ActivityCommand::Add(args) => run_add(ctx, args),
        ActivityCommand::Edit(args) => run_edit(ctx, args),
        ActivityCommand::Show(args) => run_show(ctx, args),
        ActivityCommand::List => run_list(ctx),
        ActivityCommand::Delete(args) => run_delete(ctx, args),
    }
}

fn run_add(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let new = new_activity_from_args(args)?;
    let sync = ctx.synchronizer()?;
    let activity = sync.add_activity(new)?;
    emit_record(ctx, &activity, |layout| render_activity(layout, &activity))
}

fn run_edit(ctx: &AppContext, args: &EditArgs) -> Result<()> {
    let patch = patch_from_args(args)?;
    if patch.is_empty() {
        return Err(TgError::ValidationFailed(
            "nothing to change; pass at least one field".to_string(),
        ));
    }
    let sync = ctx.synchronizer()?;
    let activity = sync.update_activity(&args.id, patch)?;
    emit_record(ctx, &activity, |layout| render_activity(layout, &activity))
}

fn run_show(ctx: &AppContext, args: &IdArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let activity = sync
        .get_activity(&args.id)?
        .ok_or_else(|| TgError::ActivityNotFound(args.id.clone()))?;
    emit_record(ctx, &activity, |layout| render_activity(layout, &activity))
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let activities = sync.list_activities()?;
    emit_list(
        ctx,
        &activities,
        &["id", "name", "subject", "grades", "tags"],
        |activity| {
            vec![
                activity.id.clone(),
                activity.name.clone(),
                activity.subject.clone(),
                activity.grade_levels.join(","),
                activity.tags.join(","),
            ]
        },
        |layout| {
            layout.section(&format!("Activities ({})", activities.len()));
            for activity in &activities {
                layout.bullet(&format!("{}  [{}]", activity.name, activity.id));
            }
        },
    )
}

fn run_delete(ctx: &AppContext, args: &IdArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    sync.delete_activity(&args.id)?;
    let payload = serde_json::json!({ "deleted": args.id });
    emit_record(ctx, &payload, |layout| {
        layout.push_line(format!("Deleted activity {}", args.id));
    })
}

fn new_activity_from_args(args: &AddArgs) -> Result<NewActivity> {
    if let Some(path) = &args.from_json {
        let raw = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }

    let resources = args
        .resources
        .iter()
        .map(String::as_str)
        .map(parse_resource)
        .collect::<Result<Vec<_>>>()?;

    Ok(NewActivity {
        name: args.name.clone().unwrap_or_default(),
        subject: args.subject.clone(),
        tree_type: args.tree_type.clone(),
        grade_levels: args.grade_levels.clone(),
        duration: args.duration.clone(),
        description: args.description.clone(),
        skills: args.skills.clone(),
        materials: args.materials.clone(),
        steps: args.steps.clone(),
        expected_outcomes: args.expected_outcomes.clone(),
        tags: args.tags.clone(),
        resources,
    })
}

fn patch_from_args(args: &EditArgs) -> Result<ActivityPatch> {
    let resources = if args.resources.is_empty() {
        None
    } else {
        Some(
            args.resources
                .iter()
                .map(String::as_str)
                .map(parse_resource)
                .collect::<Result<Vec<_>>>()?,
        )
    };
    let tags = if args.clear_tags {
        Some(Vec::new())
    } else {
        non_empty(&args.tags)
    };

    Ok(ActivityPatch {
        name: args.name.clone(),
        subject: args.subject.clone(),
        tree_type: args.tree_type.clone(),
        grade_levels: non_empty(&args.grade_levels),
        duration: args.duration.clone(),
        description: args.description.clone(),
        skills: non_empty(&args.skills),
        materials: non_empty(&args.materials),
        steps: non_empty(&args.steps),
        expected_outcomes: non_empty(&args.expected_outcomes),
        tags,
        resources,
    })
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Parse `kind|title|url`.
fn parse_resource(raw: &str) -> Result<Resource> {
    let mut parts = raw.splitn(3, '|').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(title), Some(url)) => Resource::from_kind(
            kind,
            ResourceLink {
                title: title.to_string(),
                url: url.to_string(),
                description: None,
            },
        ),
        _ => Err(TgError::ValidationFailed(format!(
            "resource {raw:?} must look like kind|title|url"
        ))),
    }
}

fn render_activity(layout: &mut HumanLayout, activity: &Activity) {
    layout
        .title(&activity.name)
        .kv("Id", &activity.id)
        .kv("Subject", &activity.subject)
        .kv("Tree", &activity.tree_type)
        .kv("Grades", &join_or_dash(&activity.grade_levels))
        .kv("Duration", &activity.duration)
        .kv("Skills", &join_or_dash(&activity.skills))
        .kv("Tags", &join_or_dash(&activity.tags));
    if !activity.description.is_empty() {
        layout.blank().push_line(activity.description.clone());
    }
    if !activity.steps.is_empty() {
        layout.blank().section("Steps");
        for (idx, step) in activity.steps.iter().enumerate() {
            layout.push_line(format!("{}. {step}", idx + 1));
        }
    }
    if !activity.resources.is_empty() {
        layout.blank().section("Resources");
        for resource in &activity.resources {
            let link = resource.link();
            layout.bullet(&format!("[{}] {} {}", resource.kind(), link.title, link.url));
        }
    }
}
