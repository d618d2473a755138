//! fixtrace - hunk provenance resolver
//!
//! For every attribution span (blame hunk) of every file in a repository,
//! fixtrace records the commit that last touched it, whether that commit's
//! message reads as a bug fix, and the nearest earlier commit in the file's
//! first-parent history whose change overlaps the same lines.
//!
//! ```no_run
//! use fixtrace::config::MinerConfig;
//! use fixtrace::pipeline::RepositoryWalker;
//! use std::path::Path;
//!
//! let walker = RepositoryWalker::new(MinerConfig::default()).unwrap();
//! let table = walker.run(Path::new("/path/to/repo")).unwrap();
//! for record in &table.records {
//!     println!("{} {} fix={}", record.file, record.range, record.is_fix);
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod git;
pub mod models;
pub mod pipeline;
pub mod provenance;
pub mod reporters;
