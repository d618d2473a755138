//! Temporary repositories for unit tests

use anyhow::Result;
use git2::{IndexAddOption, Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway repository with a working directory.
pub struct TestRepo {
    dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn init() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let repo = Repository::init(dir.path())?;
        Ok(Self { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file (creating parent directories) without staging it.
    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        fs::rename(self.dir.path().join(from), self.dir.path().join(to))?;
        Ok(())
    }

    /// Stage the whole working tree and commit it on HEAD.
    pub fn commit(&self, message: &str, author: &str, secs: i64) -> Result<Oid> {
        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit()?.id()],
            Err(_) => Vec::new(),
        };
        self.create_commit(Some("HEAD"), message, author, secs, &parents)
    }

    /// Stage the whole working tree and commit it with explicit parents,
    /// leaving HEAD where it is.
    pub fn commit_detached(
        &self,
        message: &str,
        author: &str,
        secs: i64,
        parents: &[Oid],
    ) -> Result<Oid> {
        self.create_commit(None, message, author, secs, parents)
    }

    /// Point the current branch at `id`.
    pub fn set_head(&self, id: Oid) -> Result<()> {
        self.repo.head()?.set_target(id, "test: move head")?;
        Ok(())
    }

    fn create_commit(
        &self,
        update_ref: Option<&str>,
        message: &str,
        author: &str,
        secs: i64,
        parents: &[Oid],
    ) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let sig = Signature::new(author, &email, &Time::new(secs, 0))?;
        let parents = parents
            .iter()
            .map(|id| self.repo.find_commit(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let parent_refs: Vec<_> = parents.iter().collect();

        Ok(self
            .repo
            .commit(update_ref, &sig, &sig, message, &tree, &parent_refs)?)
    }
}

/// `count` newline-terminated lines of the form `"{prefix} {n}\n"`.
pub fn numbered_lines(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{} {}\n", prefix, n)).collect()
}
