//! Run configuration for provenance mining
//!
//! Loaded from an explicit `--config` file, or from `fixtrace.toml` /
//! `.fixtracerc.json` in the working directory. Command-line flags are
//! applied on top by the CLI.
//!
//! # Configuration Format
//!
//! ```toml
//! # fixtrace.toml
//! window = 50          # history entries searched per hunk
//! workers = 8          # files processed concurrently
//! hunk_workers = 8     # hunks processed concurrently within a file
//! tracked_only = false # enumerate files from HEAD instead of the worktree
//! keywords = ["fix", "bug", "crash"]
//!
//! [exclude]
//! dirs = ["generated"]
//! extensions = ["svg"]
//! skip_defaults = false
//! ```

use crate::classifier::DEFAULT_FIX_KEYWORDS;
use crate::provenance::DEFAULT_WINDOW;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Directory names skipped at any depth unless `skip_defaults = true`.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".idea",
    ".vscode",
    ".settings",
    "node_modules",
    "vendor",
    "target",
    ".venv",
];

/// File extensions skipped unless `skip_defaults = true`.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    "md", "txt", "rst", "log", "csv", "pdf", "png", "jpg", "gif", "bmp", "tar", "gz", "zip",
    "class", "o", "a", "so", "dll", "exe", "pyc", "pyo",
];

/// Upper bound for both worker pools.
pub const MAX_WORKERS: usize = 64;

/// Default inner pool size.
pub const DEFAULT_HUNK_WORKERS: usize = 8;

/// Config files looked up in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["fixtrace.toml", ".fixtracerc.json"];

/// Written by `fixtrace init`.
pub const EXAMPLE_CONFIG: &str = r#"# fixtrace configuration
# Command-line flags take precedence over values set here.

# Number of history entries searched for the commit that introduced a hunk.
# Origins further back than this are reported as not found.
window = 50

# Files processed concurrently (default: available cores, at most 8)
# workers = 8

# Hunks processed concurrently within one file
hunk_workers = 8

# Enumerate files from the HEAD tree instead of the working directory
tracked_only = false

# Commit-message terms that mark a fix (whole word, case-insensitive)
keywords = [
    "fix", "fixed", "bug", "crash", "error", "failure", "fault",
    "defect", "patch", "issue", "correct", "repair", "resolve",
]

[exclude]
# Extra directory names and extensions to skip, on top of the built-in ones
dirs = []
extensions = []
# Set to true to drop the built-in exclusions entirely
skip_defaults = false
"#;

/// Parameters for one mining run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MinerConfig {
    /// History search window
    #[serde(default = "default_window")]
    pub window: usize,

    /// Outer (per-file) worker count
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Inner (per-hunk) pool size
    #[serde(default = "default_hunk_workers")]
    pub hunk_workers: usize,

    /// Fix vocabulary
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Enumerate files from HEAD instead of the working tree
    #[serde(default)]
    pub tracked_only: bool,

    #[serde(default)]
    pub exclude: ExcludeConfig,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

/// `min(available parallelism, 8)`
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(8)
}

fn default_hunk_workers() -> usize {
    DEFAULT_HUNK_WORKERS
}

fn default_keywords() -> Vec<String> {
    DEFAULT_FIX_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            workers: default_workers(),
            hunk_workers: default_hunk_workers(),
            keywords: default_keywords(),
            tracked_only: false,
            exclude: ExcludeConfig::default(),
        }
    }
}

impl MinerConfig {
    /// Reject values no run can use.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.window == 0 {
            bail!("window must be at least 1");
        }
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            bail!("workers must be between 1 and {}, got {}", MAX_WORKERS, self.workers);
        }
        if !(1..=MAX_WORKERS).contains(&self.hunk_workers) {
            bail!(
                "hunk_workers must be between 1 and {}, got {}",
                MAX_WORKERS,
                self.hunk_workers
            );
        }
        Ok(())
    }
}

/// Path exclusions applied while enumerating files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExcludeConfig {
    /// Directory names to skip at any depth
    #[serde(default)]
    pub dirs: Vec<String>,

    /// File extensions to skip, with or without a leading dot
    #[serde(default)]
    pub extensions: Vec<String>,

    /// If true, disable the built-in exclusions
    #[serde(default)]
    pub skip_defaults: bool,
}

impl ExcludeConfig {
    /// Effective directory names (defaults + user entries).
    pub fn effective_dirs(&self) -> Vec<String> {
        merge(
            DEFAULT_EXCLUDED_DIRS,
            self.skip_defaults,
            self.dirs.iter().map(|d| d.trim_matches('/').to_string()),
        )
    }

    /// Effective extensions, lowercased and without a leading dot.
    pub fn effective_extensions(&self) -> Vec<String> {
        merge(
            DEFAULT_EXCLUDED_EXTENSIONS,
            self.skip_defaults,
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase()),
        )
    }
}

fn merge(
    defaults: &[&str],
    skip_defaults: bool,
    user: impl Iterator<Item = String>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if !skip_defaults {
        out.extend(defaults.iter().map(|s| s.to_string()));
    }
    for entry in user {
        if !entry.is_empty() && !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}

/// Load the run configuration.
///
/// An explicit path must exist and parse. Otherwise the first config file
/// found in `search_dir` is used; a discovered file that fails to parse is
/// reported and ignored.
pub fn load_config(explicit: Option<&Path>, search_dir: &Path) -> anyhow::Result<MinerConfig> {
    if let Some(path) = explicit {
        let config = load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        return Ok(config);
    }

    for name in CONFIG_FILE_NAMES {
        let path = search_dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return Ok(config);
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No config file found, using defaults");
    Ok(MinerConfig::default())
}

/// Parse a config file, as JSON for `.json` paths and TOML otherwise.
fn load_config_file(path: &Path) -> anyhow::Result<MinerConfig> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}
