//! Configuration module for fixtrace
//!
//! This module handles:
//! - Run configuration files (fixtrace.toml, .fixtracerc.json)
//! - History window and worker pool sizes
//! - Fix vocabulary and path exclusions

mod miner_config;

pub use miner_config::{
    default_workers,
    load_config,
    ExcludeConfig,
    MinerConfig,
    CONFIG_FILE_NAMES,
    DEFAULT_EXCLUDED_DIRS,
    DEFAULT_EXCLUDED_EXTENSIONS,
    DEFAULT_HUNK_WORKERS,
    EXAMPLE_CONFIG,
    MAX_WORKERS,
};
