//! Per-invocation application context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::{Result, TgError};
use crate::storage::Database;
use crate::sync::Synchronizer;

pub struct AppContext {
    pub root: PathBuf,
    /// File that `tg config set` writes to.
    pub config_path: PathBuf,
    pub config: Config,
    pub db: Arc<Database>,
    pub output_format: OutputFormat,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("root", &self.root)
            .field("config_path", &self.config_path)
            .field("output_format", &self.output_format)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = resolve_root(cli.root.as_deref())?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| root.join("config.toml"));

        let db_path = config.database_path(&root);
        let db = Database::open_with_busy_timeout(
            &db_path,
            Duration::from_millis(config.storage.busy_timeout_ms),
        )?;
        debug!(db = %db_path.display(), schema = db.schema_version(), "opened database");

        let output_format = if cli.robot || cli.output_format.is_some() {
            cli.output_format()
        } else if config.output.is_json() {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        Ok(Self {
            root,
            config_path,
            config,
            db: Arc::new(db),
            output_format,
        })
    }

    /// A synchronizer over this context's database and configured skill policy.
    pub fn synchronizer(&self) -> Result<Synchronizer> {
        Synchronizer::new(Arc::clone(&self.db), self.config.skills.policy)
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.output_format == OutputFormat::Json
    }
}

/// Data root: `--root`/`TG_ROOT`, else the platform data directory.
fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    dirs::data_dir()
        .map(|dir| dir.join("treeguard"))
        .ok_or_else(|| TgError::MissingConfig("data directory not found; pass --root".to_string()))
}
