//! `skill-get publish [path] [--dry-run] [-y]`.

use std::path::Path;

use anyhow::{Context, Result};
use skillget_skills::{ClientConfig, HttpRegistry, PublishPlan, SkillError};

use crate::{helpers, ui};

/// Summary descriptions are cut at this many characters.
const SUMMARY_DESCRIPTION_CHARS: usize = 60;

pub async fn execute(config: &ClientConfig, path: &str, dry_run: bool, yes: bool) -> Result<()> {
    if !dry_run && !config.is_authenticated() {
        ui::info("Run: skill-get login");
        return Err(
            anyhow::Error::new(SkillError::NotAuthenticated)
                .context("you must be logged in to publish"),
        );
    }

    println!("Validating skill...");
    let plan = PublishPlan::from_dir(Path::new(path)).context("validation failed")?;
    ui::success("Validation passed");

    print_summary(&plan);

    if dry_run {
        ui::info("Dry run - not publishing");
        return Ok(());
    }

    let question = format!("Publish {}@{}?", plan.name(), plan.version());
    if !yes && !helpers::confirm_stdin(&question, true)? {
        ui::warning("Publish cancelled");
        return Ok(());
    }

    println!("Publishing...");
    let receipt = plan
        .publish(&HttpRegistry::new(config))
        .await
        .context("publish failed")?;

    ui::success(&format!(
        "Published {}@{}",
        receipt.published.name, receipt.published.version
    ));
    if let Some(sha) = &receipt.upload.sha256 {
        tracing::debug!(sha256 = %sha, "tarball accepted");
    }
    ui::success("Your skill is now available on the registry!");
    Ok(())
}

fn print_summary(plan: &PublishPlan) {
    let request = &plan.request;

    println!();
    println!("Package details:");
    println!("  Name:        {}", plan.name());
    println!("  Version:     {}", plan.version());
    if let Some(description) = &request.description {
        let mut short: String = description.chars().take(SUMMARY_DESCRIPTION_CHARS).collect();
        if description.chars().count() > SUMMARY_DESCRIPTION_CHARS {
            short.push_str("...");
        }
        println!("  Description: {short}");
    }
    if !request.keywords.is_empty() {
        println!("  Keywords:    {}", request.keywords.join(", "));
    }
    if let Some(category) = &request.category {
        println!("  Category:    {category}");
    }
    println!("  License:     {}", plan.license());
}
