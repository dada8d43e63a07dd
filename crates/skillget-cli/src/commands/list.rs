//! `skill-get list [--json]`.

use anyhow::Result;
use skillget_skills::ClientConfig;

use crate::ui;

pub fn execute(config: &ClientConfig, json: bool) -> Result<()> {
    let records = config.manifest().list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    ui::heading(&format!("Installed Skills ({})", config.agent.display_name()));
    println!("{}", ui::format_installed_skill_list(&records));

    if records.is_empty() {
        ui::info("Install skills with: skill-get install <name>");
    } else {
        println!();
        println!("Skills directory: {}", config.skills_dir().display());
    }
    Ok(())
}
