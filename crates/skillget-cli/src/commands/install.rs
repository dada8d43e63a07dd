//! `skill-get install <name[@version]|path>`.

use std::path::Path;

use anyhow::{Context, Result};
use skillget_skills::ClientConfig;

use crate::{helpers, ui};

/// Install from the registry, or from a directory when `local` is set or the
/// target exists on disk.
pub async fn execute(
    config: &ClientConfig,
    target: &str,
    version: &str,
    force: bool,
    local: bool,
) -> Result<()> {
    let manager = helpers::open_manager(config);

    let source = Path::new(target);
    if local || source.exists() {
        println!("Installing skill from {target}...");
        let outcome = manager
            .install_from_local(source, None)
            .with_context(|| format!("failed to install from {target}"))?;

        ui::success(&format!("Installed {} from local directory", outcome.name));
        ui::info(&format!("Location: {}", outcome.path.display()));
        return Ok(());
    }

    let (name, version) = helpers::split_name_version(target, version);
    println!("Installing {name}@{version}...");

    let outcome = manager
        .install(&name, &version, force)
        .await
        .with_context(|| format!("failed to install {name}"))?;

    ui::success(&format!("Installed {}@{}", outcome.name, outcome.version));
    ui::info(&format!("Location: {}", outcome.path.display()));
    ui::success(&format!("Ready to use with {}!", config.agent.display_name()));
    Ok(())
}
