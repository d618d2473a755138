//! Init command - write an example configuration file

use anyhow::{Context, Result};
use console::style;
use fixtrace::config::{CONFIG_FILE_NAMES, EXAMPLE_CONFIG};
use std::path::Path;

/// Run the init command
pub fn run() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    write_example(&cwd)
}

fn write_example(dir: &Path) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    println!("\nNext steps:");
    println!("  {} Mine the current repository", style("fixtrace .").cyan());
    println!(
        "  {} JSON on stdout",
        style("fixtrace . --format json -o -").cyan()
    );

    Ok(())
}
