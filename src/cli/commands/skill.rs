//! tg skill - Skill catalog

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::core::skills::{SkillCatalog, SkillCategory};
use crate::error::Result;

use super::{emit_list, emit_record};

#[derive(Args, Debug)]
pub struct SkillArgs {
    #[command(subcommand)]
    pub command: SkillCommand,
}

#[derive(Subcommand, Debug)]
pub enum SkillCommand {
    /// List every skill, grouped by category
    List,
    /// Register a custom skill
    Add(NameArgs),
    /// Report whether a skill is known and its category
    Check(NameArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Debug, Serialize)]
struct SkillEntry {
    name: String,
    category: SkillCategory,
}

#[derive(Debug, Serialize)]
struct SkillCheck {
    name: String,
    known: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<SkillCategory>,
}

pub fn run(ctx: &AppContext, args: &SkillArgs) -> Result<()> {
    match &args.command {
        SkillCommand::List => run_list(ctx),
        SkillCommand::Add(args) => run_add(ctx, args),
        SkillCommand::Check(args) => run_check(ctx, args),
    }
}

fn run_list(ctx: &AppContext) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let entries = catalog_entries(sync.catalog());

    emit_list(
        ctx,
        &entries,
        &["category", "name"],
        |entry| vec![entry.category.to_string(), entry.name.clone()],
        |layout| {
            for category in SkillCategory::CORE.into_iter().chain([SkillCategory::Custom]) {
                let names: Vec<&str> = entries
                    .iter()
                    .filter(|entry| entry.category == category)
                    .map(|entry| entry.name.as_str())
                    .collect();
                if names.is_empty() {
                    continue;
                }
                layout.section(category.title());
                for name in names {
                    layout.bullet(name);
                }
                layout.blank();
            }
        },
    )
}

fn run_add(ctx: &AppContext, args: &NameArgs) -> Result<()> {
    let mut sync = ctx.synchronizer()?;
    let added = sync.add_custom_skill(&args.name)?;
    let name = args.name.trim();
    let payload = serde_json::json!({ "name": name, "added": added });
    emit_record(ctx, &payload, |layout| {
        if added {
            layout.push_line(format!("Registered custom skill {name}"));
        } else {
            layout.push_line(format!("{name} is already in the catalog"));
        }
    })
}

fn run_check(ctx: &AppContext, args: &NameArgs) -> Result<()> {
    let sync = ctx.synchronizer()?;
    let name = args.name.trim().to_string();
    let category = sync.catalog().category_of(&name);
    let check = SkillCheck {
        known: category.is_some(),
        category,
        name,
    };
    emit_record(ctx, &check, |layout| {
        layout.kv("Skill", &check.name);
        match check.category {
            Some(category) => layout.kv("Category", category.title()),
            None => layout.kv("Category", "unknown"),
        };
    })
}

fn catalog_entries(catalog: &SkillCatalog) -> Vec<SkillEntry> {
    let core = SkillCategory::CORE.into_iter().flat_map(|category| {
        category.core_skills().iter().map(move |name| SkillEntry {
            name: (*name).to_string(),
            category,
        })
    });
    let custom = catalog.custom_skills().iter().map(|name| SkillEntry {
        name: name.clone(),
        category: SkillCategory::Custom,
    });
    core.chain(custom).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entries_lists_core_then_custom() {
        let catalog = SkillCatalog::with_custom(["גינון"]);
        let entries = catalog_entries(&catalog);

        assert_eq!(
            entries.len(),
            SkillCatalog::all_valid_skill_names().len() + 1
        );
        assert_eq!(entries[0].category, SkillCategory::Thinking);
        let last = entries.last().unwrap();
        assert_eq!(last.name, "גינון");
        assert_eq!(last.category, SkillCategory::Custom);
    }
}
