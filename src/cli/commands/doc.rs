//! tg doc - Documentation entries

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::HumanLayout;
use crate::core::class_name::to_display_alphabet;
use crate::core::documentation::{Documentation, DocumentationPatch, NewDocumentation};
use crate::error::{Result, TgError};

use super::{emit_list, emit_record, join_or_dash, parse_date};

#[derive(Args, Debug)]
pub struct DocArgs {
    #[command(subcommand)]
    pub command: DocCommand,
}

#[derive(Subcommand, Debug)]
pub enum DocCommand {
    /// Record an activity held with a class
    Add(AddArgs),
    /// Change fields of an entry
    Edit(EditArgs),
    /// Delete an entry
    Delete(IdArgs),
    /// Show one entry
    Show(IdArgs),
    /// List entries, newest first
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Activity id
    #[arg(long)]
    pub activity: String,

    /// Class name, e.g. ג2 or 2ג
    #[arg(long)]
    pub class: String,

    /// Date the activity took place (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,

    #[arg(long, default_value = "")]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Skill practiced (repeatable)
    #[arg(long = "skill")]
    pub skills: Vec<String>,

    /// Image URL (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,

    #[arg(long, default_value = "")]
    pub teacher: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub activity: Option<String>,

    #[arg(long)]
    pub class: Option<String>,

    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Replace the skill set (repeatable)
    #[arg(long = "skill", conflicts_with = "clear_skills")]
    pub skills: Vec<String>,

    /// Remove every skill from the entry
    #[arg(long)]
    pub clear_skills: bool,

    /// Replace the images (repeatable)
    #[arg(long = "image")]
    pub images: Vec<String>,

    #[arg(long)]
    pub teacher: Option<String>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only entries of this class (any spelling)
    #[arg(long, conflicts_with = "activity")]
    pub class: Option<String>,

    /// Only entries of this activity
    #[arg(long)]
    pub activity: Option<String>,
}

pub fn run(ctx: &AppContext, args: &DocArgs) -> Result<()> {
    match &args.command {
        DocCommand::Add(args) => run_add(ctx, args),
        DocCommand::Edit(args) => run_edit(ctx, args),
        DocCommand::Delete(args) => run_delete(ctx, args),
        DocCommand::Show(args) => run_show(ctx, args),
        DocCommand::List(args) => run_list(ctx, args),
    }
}

fn run_add(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let mut sync = ctx.synchronizer()?;
    let new = NewDocumentation::new(&args.activity, &args.class, args.date)
        .title(&args.title)
        .description(&args.description)
        .teacher(&args.teacher)
        .skills(args.skills.iter().cloned())
        .images(args.images.iter().cloned());
    let doc = sync.add_documentation(new)?;
    emit_record(ctx, &doc, |layout| {
        layout.title("Documentation added");
        render_documentation(layout, &doc);
    })
}

fn run_edit(ctx: &AppContext, args: &EditArgs) -> Result<()> {
    let patch = patch_from_args(args);
    if patch.is_empty() {
        return Err(TgError::ValidationFailed(
            "nothing to change; pass at least one field".to_string(),
        ));
    }
    let mut sync = ctx.synchronizer()?;
    let doc = sync.update_documentation(&args.id, patch)?;
    emit_record(ctx, &doc, |layout| {
        layout.title("Documentation updated");
        render_documentation(layout, &doc);
    })
}

fn run_delete(ctx: &AppContext, args: &IdArgs) -> Result<()> {
    let mut sync = ctx.synchronizer()?;
    let doc = sync.delete_documentation(&args.id)?;
    emit_record(ctx, &doc, |layout| {
        layout.title("Documentation deleted");
        layout.kv("Id", &doc.id);
        layout.kv("Class", &to_display_alphabet(&doc.class_name));
    })
}

fn run_show(ctx: &AppContext, args: &IdArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let doc = sync
        .get_documentation(&args.id)?
        .ok_or_else(|| TgError::DocumentationNotFound(args.id.clone()))?;
    emit_record(ctx, &doc, |layout| {
        layout.title(if doc.title.is_empty() { "Documentation" } else { &doc.title });
        render_documentation(layout, &doc);
    })
}

fn run_list(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let docs = match (&args.class, &args.activity) {
        (Some(class), _) => sync.list_class_documentations(class)?,
        (None, Some(activity)) => sync.list_documentations_by_activity(activity)?,
        (None, None) => sync.list_documentations()?,
    };

    emit_list(
        ctx,
        &docs,
        &["id", "date", "class", "activity", "title", "skills"],
        |doc| {
            vec![
                doc.id.clone(),
                doc.date.to_string(),
                to_display_alphabet(&doc.class_name),
                doc.activity_id.clone(),
                doc.title.clone(),
                doc.skill_ids.join(","),
            ]
        },
        |layout| {
            layout.section(&format!("Documentation ({})", docs.len()));
            for doc in &docs {
                layout.bullet(&format!(
                    "{}  {}  {}  [{}]",
                    doc.date,
                    to_display_alphabet(&doc.class_name),
                    if doc.title.is_empty() { &doc.activity_id } else { &doc.title },
                    doc.id
                ));
            }
        },
    )
}

fn patch_from_args(args: &EditArgs) -> DocumentationPatch {
    let skill_ids = if args.clear_skills {
        Some(Vec::new())
    } else if args.skills.is_empty() {
        None
    } else {
        Some(args.skills.clone())
    };
    DocumentationPatch {
        activity_id: args.activity.clone(),
        class_name: args.class.clone(),
        title: args.title.clone(),
        description: args.description.clone(),
        date: args.date,
        skill_ids,
        images: (!args.images.is_empty()).then(|| args.images.clone()),
        teacher_name: args.teacher.clone(),
    }
}

fn render_documentation(layout: &mut HumanLayout, doc: &Documentation) {
    layout
        .kv("Id", &doc.id)
        .kv("Class", &to_display_alphabet(&doc.class_name))
        .kv("Date", &doc.date.to_string())
        .kv(
            "Activity",
            doc.activity_name.as_deref().unwrap_or(&doc.activity_id),
        )
        .kv("Teacher", if doc.teacher_name.is_empty() { "-" } else { &doc.teacher_name })
        .kv("Skills", &join_or_dash(&doc.skill_ids));
    if !doc.description.is_empty() {
        layout.blank().push_line(doc.description.clone());
    }
    if !doc.images.is_empty() {
        layout.blank().section("Images");
        for image in &doc.images {
            layout.bullet(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn edit_args(argv: &[&str]) -> EditArgs {
        let mut full = vec!["tg", "doc", "edit"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Doc(DocArgs {
                command: DocCommand::Edit(args),
            }) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn edit_without_fields_is_empty_patch() {
        assert!(patch_from_args(&edit_args(&["abc"])).is_empty());
    }

    #[test]
    fn edit_clear_skills_sets_empty_list() {
        let patch = patch_from_args(&edit_args(&["abc", "--clear-skills"]));
        assert_eq!(patch.skill_ids, Some(Vec::new()));
    }

    #[test]
    fn edit_collects_repeated_skills() {
        let patch = patch_from_args(&edit_args(&[
            "abc", "--skill", "תקשורת", "--skill", "אמפתיה", "--class", "2ב",
        ]));
        assert_eq!(patch.skill_ids.unwrap().len(), 2);
        assert_eq!(patch.class_name.as_deref(), Some("2ב"));
        assert!(patch.images.is_none());
    }

    #[test]
    fn add_requires_valid_date() {
        let result = Cli::try_parse_from([
            "tg", "doc", "add", "--activity", "a", "--class", "ג2", "--date", "yesterday",
        ]);
        assert!(result.is_err());
    }
}
