//! `skill-get info <name> [--json]`.

use anyhow::Result;
use skillget_skills::{ClientConfig, HttpRegistry, SkillError};

use crate::ui;

/// Show registry metadata, plus local install state when present.
pub async fn execute(config: &ClientConfig, name: &str, json: bool) -> Result<()> {
    let registry = HttpRegistry::new(config);
    let package = registry
        .get_skill(name)
        .await
        .map_err(|e| SkillError::from_registry(name, e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&package)?);
        return Ok(());
    }

    println!("{}", ui::format_skill_detail(&package));

    if let Some(record) = config.manifest().get(name)? {
        println!();
        ui::success(&format!(
            "Installed: v{} at {}",
            record.version,
            record.install_path().display()
        ));

        let latest = package.latest_version.as_deref().filter(|v| !v.is_empty());
        if let Some(latest) = latest.filter(|v| record.is_updatable() && record.version != *v) {
            ui::info(&format!("Update available: {} → {latest}", record.version));
        }
    }
    Ok(())
}
