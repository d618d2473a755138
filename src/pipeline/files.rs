//! File enumeration with directory and extension exclusions

use crate::config::ExcludeConfig;
use crate::git::repo::slash_path;
use crate::git::{GitError, GitRepo};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Compiled exclusion sets.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRules {
    dirs: HashSet<String>,
    extensions: HashSet<String>,
}

impl ExcludeRules {
    pub fn from_config(config: &ExcludeConfig) -> Self {
        Self {
            dirs: config.effective_dirs().into_iter().collect(),
            extensions: config.effective_extensions().into_iter().collect(),
        }
    }

    /// Whether a repository-relative, `/`-separated path should be mined.
    ///
    /// Rejects any path with a dot-prefixed or excluded directory component,
    /// a dot-prefixed file name, or an excluded extension.
    pub fn allows_path(&self, path: &str) -> bool {
        let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();
        while let Some(component) = components.next() {
            if component.starts_with('.') {
                return false;
            }
            if components.peek().is_some() {
                if self.dirs.contains(component) {
                    return false;
                }
            } else {
                return self.allows_file_name(component);
            }
        }
        false
    }

    fn allows_dir_name(&self, name: &str) -> bool {
        !name.starts_with('.') && !self.dirs.contains(name)
    }

    fn allows_file_name(&self, name: &str) -> bool {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) => !self.extensions.contains(&ext.to_ascii_lowercase()),
            None => true,
        }
    }
}

/// Collect candidate files under the working tree of `root`.
///
/// Hidden entries, ignored files and excluded directories are pruned during
/// the walk. Returns sorted, repository-relative, `/`-separated paths.
pub fn collect_files(root: &Path, rules: &ExcludeRules) -> Vec<String> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false);

    let dir_rules = rules.clone();
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if !is_dir || entry.depth() == 0 {
            return true;
        }
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| dir_rules.allows_dir_name(name))
    });

    let mut files = Vec::new();
    for entry in builder.build().flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = slash_path(relative);
        if rules.allows_path(&relative) {
            files.push(relative);
        }
    }

    files.sort();
    debug!("Collected {} files under {}", files.len(), root.display());
    files
}

/// Collect candidate files from the HEAD tree.
pub fn collect_tracked_files(repo: &GitRepo, rules: &ExcludeRules) -> Result<Vec<String>, GitError> {
    let mut files: Vec<String> = repo
        .tracked_files()?
        .into_iter()
        .filter(|path| rules.allows_path(path))
        .collect();
    files.sort();
    Ok(files)
}
