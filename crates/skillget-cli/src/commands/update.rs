//! `skill-get update [name] [--check]`.

use anyhow::{Context, Result};
use skillget_skills::{ClientConfig, HttpRegistry, SkillManager, UpdateOutcome, UpdateSummary};

use crate::{helpers, ui};

pub async fn execute(config: &ClientConfig, name: Option<&str>, check: bool) -> Result<()> {
    let manager = helpers::open_manager(config);

    match (name, check) {
        (Some(name), true) => check_one(&manager, name).await,
        (Some(name), false) => update_one(&manager, name).await,
        (None, true) => check_all(&manager).await,
        (None, false) => update_all(&manager).await,
    }
}

async fn check_one(manager: &SkillManager<HttpRegistry>, name: &str) -> Result<()> {
    println!("Checking for updates to {name}...");
    let check = manager
        .check_update(name)
        .await
        .with_context(|| format!("failed to check {name}"))?;

    if check.is_current() {
        ui::info(&format!(
            "{name} is already at the latest version ({})",
            check.installed
        ));
    } else {
        ui::info(&format!(
            "Update available for {name}: {} → {}",
            check.installed, check.latest
        ));
        println!("Run `skill-get update {name}` to install it.");
    }
    Ok(())
}

async fn update_one(manager: &SkillManager<HttpRegistry>, name: &str) -> Result<()> {
    println!("Checking for updates to {name}...");
    let outcome = manager
        .update(name)
        .await
        .with_context(|| format!("failed to update {name}"))?;

    match outcome {
        UpdateOutcome::AlreadyCurrent { name, version } => {
            ui::info(&format!("{name} is already at the latest version ({version})"));
        }
        UpdateOutcome::Updated { previous, install } => {
            ui::success(&format!(
                "Updated {} to {} (was {previous})",
                install.name, install.version
            ));
        }
    }
    Ok(())
}

async fn check_all(manager: &SkillManager<HttpRegistry>) -> Result<()> {
    let records: Vec<_> = manager
        .list()?
        .into_iter()
        .filter(|r| r.is_updatable())
        .collect();
    if records.is_empty() {
        ui::warning("No registry skills installed");
        return Ok(());
    }

    println!("Checking for updates...");
    let mut available = 0usize;
    for record in &records {
        match manager.check_update(&record.name).await {
            Ok(check) if check.is_current() => {}
            Ok(check) => {
                available += 1;
                ui::info(&format!(
                    "{}: {} → {}",
                    check.name, check.installed, check.latest
                ));
            }
            Err(e) => ui::warning(&format!("Failed to check {}: {e}", record.name)),
        }
    }

    if available == 0 {
        ui::info("All skills are up to date!");
    } else {
        println!("Run `skill-get update` to install {available} update(s).");
    }
    Ok(())
}

async fn update_all(manager: &SkillManager<HttpRegistry>) -> Result<()> {
    if manager.list()?.is_empty() {
        ui::warning("No skills installed");
        return Ok(());
    }

    println!("Checking for updates...");
    let summary = manager.update_all().await?;
    report(&summary);
    Ok(())
}

fn report(summary: &UpdateSummary) {
    for install in &summary.updated {
        ui::success(&format!("Updated {} to {}", install.name, install.version));
    }
    for failure in &summary.failed {
        ui::warning(&format!(
            "Failed to update {}: {}",
            failure.name, failure.message
        ));
    }

    if summary.updated.is_empty() && summary.failed.is_empty() {
        ui::info("All skills are up to date!");
        return;
    }
    if !summary.updated.is_empty() {
        ui::success(&format!("Updated {} skill(s)", summary.updated.len()));
    }
    if !summary.failed.is_empty() {
        ui::warning(&format!("Failed to update {} skill(s)", summary.failed.len()));
    }
}
