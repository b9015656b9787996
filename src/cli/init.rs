//! `homeguard init` — write a starter config file.
//!
//! Creates `.homeguard.yaml` in the current directory from one of the
//! built-in templates so the owner has something to edit.

use crate::config::defaults;
use crate::utils::paths::CONFIG_FILE_NAME;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Run the `homeguard init` command.
pub fn run_init(template: Option<&str>, output_path: Option<&str>, force: bool) -> Result<()> {
    let output_file = match output_path {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()
            .context("Failed to get current directory")?
            .join(CONFIG_FILE_NAME),
    };

    if output_file.exists() && !force {
        println!(
            "{} A config file already exists at {}",
            "⚠".yellow(),
            output_file.display()
        );
        println!("  Use --force to overwrite it, or edit it directly.");
        return Ok(());
    }

    let template_name = template.unwrap_or("standard");
    let yaml_content = defaults::get_default_config(template_name).ok_or_else(|| {
        let available: Vec<String> = defaults::available_templates()
            .iter()
            .map(|(name, desc)| format!("  {} — {}", name.bold(), desc))
            .collect();
        anyhow::anyhow!(
            "Unknown template '{}'. Available templates:\n{}",
            template_name,
            available.join("\n")
        )
    })?;

    std::fs::write(&output_file, yaml_content)
        .with_context(|| format!("Failed to write config file: {}", output_file.display()))?;

    println!();
    println!(
        "  {} Created {}",
        "✓".green().bold(),
        output_file.display().to_string().bold()
    );
    println!("  Template: {}", template_name.cyan());
    println!();
    println!("  {} Next steps:", "→".blue());
    println!(
        "    1. Review the config: {}",
        format!("cat {}", output_file.display()).dimmed()
    );
    println!("    2. Validate it: {}", "homeguard check".dimmed());
    println!("    3. Start the console: {}", "homeguard console".dimmed());
    println!();

    Ok(())
}
