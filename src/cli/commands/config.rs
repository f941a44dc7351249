//! tg config - Show or change configuration

use std::path::Path;

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::config::Config;
use crate::error::{Result, TgError};

use super::emit_record;

/// Keys `tg config set` accepts.
const KNOWN_KEYS: [&str; 5] = [
    "storage.db_file",
    "storage.busy_timeout_ms",
    "skills.policy",
    "output.format",
    "output.include_metadata",
];

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (default)
    Show,
    /// Print one value, e.g. `skills.policy`
    Get { key: String },
    /// Write a value to the config file
    Set { key: String, value: String },
    /// Remove a value from the config file
    Unset { key: String },
    /// Print the config file path
    Path,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    match args.command.as_ref().unwrap_or(&ConfigCommand::Show) {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Get { key } => get_key(ctx, key),
        ConfigCommand::Set { key, value } => set_key(ctx, key, value),
        ConfigCommand::Unset { key } => unset_key(ctx, key),
        ConfigCommand::Path => {
            let path = ctx.config_path.display().to_string();
            let payload = serde_json::json!({ "path": path });
            emit_record(ctx, &payload, |layout| {
                layout.push_line(path.clone());
            })
        }
    }
}

fn show(ctx: &AppContext) -> Result<()> {
    let rendered = toml::to_string_pretty(&ctx.config)
        .map_err(|err| TgError::Config(format!("render config: {err}")))?;
    emit_record(ctx, &ctx.config, |layout| {
        layout.push_line(rendered.trim_end().to_string());
    })
}

fn get_key(ctx: &AppContext, key: &str) -> Result<()> {
    let doc = toml::Value::try_from(&ctx.config)
        .map_err(|err| TgError::Config(format!("serialize config: {err}")))?;
    let value = get_path(&doc, key)?;
    let payload = serde_json::json!({ "key": key, "value": value });
    emit_record(ctx, &payload, |layout| {
        layout.push_line(format_value(&value));
    })
}

fn set_key(ctx: &AppContext, key: &str, raw_value: &str) -> Result<()> {
    check_known_key(key)?;
    let mut doc = load_config_doc(&ctx.config_path)?;
    set_path(&mut doc, key, parse_value(raw_value))?;
    validate_doc(&doc).map_err(|err| TgError::Config(format!("invalid value for {key}: {err}")))?;
    write_config_doc(&ctx.config_path, &doc)?;

    let payload = serde_json::json!({ "key": key, "value": raw_value, "path": ctx.config_path });
    emit_record(ctx, &payload, |layout| {
        layout.push_line(format!("{key} = {raw_value}"));
    })
}

fn unset_key(ctx: &AppContext, key: &str) -> Result<()> {
    check_known_key(key)?;
    let mut doc = load_config_doc(&ctx.config_path)?;
    let removed = unset_path(&mut doc, key);
    write_config_doc(&ctx.config_path, &doc)?;

    let payload = serde_json::json!({ "key": key, "removed": removed });
    emit_record(ctx, &payload, |layout| {
        layout.push_line(if removed {
            format!("unset {key}")
        } else {
            format!("{key} was not set")
        });
    })
}

/// The document must still deserialize into a [`Config`].
fn validate_doc(doc: &toml::Value) -> std::result::Result<Config, String> {
    let rendered = toml::to_string(doc).map_err(|err| err.to_string())?;
    toml::from_str(&rendered).map_err(|err| err.to_string())
}

fn check_known_key(key: &str) -> Result<()> {
    if KNOWN_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(TgError::Config(format!(
            "unknown key {key} (expected one of {})",
            KNOWN_KEYS.join(", ")
        )))
    }
}

fn load_config_doc(path: &Path) -> Result<toml::Value> {
    if !path.exists() {
        return Ok(toml::Value::Table(toml::map::Map::new()));
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|err| TgError::Config(format!("read config: {err}")))?;
    toml::from_str(&raw).map_err(|err| TgError::Config(format!("parse config: {err}")))
}

fn write_config_doc(path: &Path, doc: &toml::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let rendered = toml::to_string_pretty(doc)
        .map_err(|err| TgError::Config(format!("render config: {err}")))?;
    std::fs::write(path, rendered)?;
    Ok(())
}

/// Integers and booleans keep their type; anything else is a string.
fn parse_value(raw: &str) -> toml::Value {
    let trimmed = raw.trim();
    if let Ok(flag) = trimmed.parse::<bool>() {
        return toml::Value::Boolean(flag);
    }
    if let Ok(number) = trimmed.parse::<i64>() {
        return toml::Value::Integer(number);
    }
    toml::Value::String(trimmed.to_string())
}

fn get_path(doc: &toml::Value, key: &str) -> Result<toml::Value> {
    let mut current = doc;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| TgError::Config(format!("unknown key: {key}")))?;
    }
    Ok(current.clone())
}

fn set_path(doc: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| TgError::Config(format!("key {key} must be section.field")))?;
    let table = doc
        .as_table_mut()
        .ok_or_else(|| TgError::Config("config root is not a table".to_string()))?;
    let section = table
        .entry(section.to_string())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()))
        .as_table_mut()
        .ok_or_else(|| TgError::Config(format!("{section} is not a table")))?;
    section.insert(field.to_string(), value);
    Ok(())
}

fn unset_path(doc: &mut toml::Value, key: &str) -> bool {
    let Some((section, field)) = key.split_once('.') else {
        return false;
    };
    doc.get_mut(section)
        .and_then(toml::Value::as_table_mut)
        .is_some_and(|table| table.remove(field).is_some())
}

fn format_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_keeps_scalar_types() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value(" 250 "), toml::Value::Integer(250));
        assert_eq!(
            parse_value("reject"),
            toml::Value::String("reject".to_string())
        );
    }

    #[test]
    fn set_and_unset_nested_key() {
        let mut doc = toml::Value::Table(toml::map::Map::new());
        set_path(&mut doc, "skills.policy", parse_value("drop")).unwrap();
        assert_eq!(
            get_path(&doc, "skills.policy").unwrap().as_str(),
            Some("drop")
        );

        assert!(unset_path(&mut doc, "skills.policy"));
        assert!(!unset_path(&mut doc, "skills.policy"));
        assert!(get_path(&doc, "skills.policy").is_err());
    }

    #[test]
    fn set_value_must_deserialize() {
        let mut doc = toml::Value::Table(toml::map::Map::new());
        set_path(&mut doc, "skills.policy", parse_value("sometimes")).unwrap();
        assert!(validate_doc(&doc).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(check_known_key("skills.policy").is_ok());
        assert!(check_known_key("skills.colour").is_err());
        assert!(check_known_key("policy").is_err());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");
        let mut doc = load_config_doc(&path).unwrap();
        set_path(&mut doc, "storage.busy_timeout_ms", parse_value("750")).unwrap();
        write_config_doc(&path, &doc).unwrap();

        let config = Config::load(Some(&path), temp.path()).unwrap();
        assert_eq!(config.storage.busy_timeout_ms, 750);
    }
}
