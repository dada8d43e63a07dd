//! `skill-get search` and `skill-get browse`.

use anyhow::{Context, Result};
use skillget_skills::{ClientConfig, HttpRegistry, ListParams, SearchParams};

use crate::ui;

/// How many skills `browse` shows.
const BROWSE_LIMIT: u32 = 30;

pub async fn execute(
    config: &ClientConfig,
    query: Option<&str>,
    category: Option<String>,
    limit: u32,
    page: u32,
    json: bool,
) -> Result<()> {
    let registry = HttpRegistry::new(config);
    let params = SearchParams {
        page: Some(page),
        limit: Some(limit),
        category,
    };
    let result = registry
        .search(query.unwrap_or_default(), &params)
        .await
        .context("search failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match query {
        Some(q) if !q.is_empty() => ui::heading(&format!("Search results for \"{q}\"")),
        _ => ui::heading("Available Skills"),
    }
    println!("{}", ui::format_skill_list(&result.data));

    if result.pagination.has_more {
        println!();
        println!(
            "Showing {} of {} results. Use --page to see more.",
            result.data.len(),
            result.pagination.total
        );
    }
    println!();
    println!("Install with: skill-get install <name>");
    Ok(())
}

pub async fn browse(config: &ClientConfig, category: Option<String>) -> Result<()> {
    let registry = HttpRegistry::new(config);
    let params = ListParams {
        category,
        limit: Some(BROWSE_LIMIT),
        ..Default::default()
    };
    let result = registry
        .list_skills(&params)
        .await
        .context("failed to load skills")?;

    ui::heading("Available Skills");
    println!("{}", ui::format_skill_list(&result.data));
    println!();
    println!("Install with: skill-get install <name>");
    Ok(())
}
