//! Console presentation.
//!
//! The `format_*` functions build strings so they can be tested; the
//! status-line helpers print them with a leading marker.

use skillget_skills::publish::DEFAULT_LICENSE;
use skillget_skills::{InstalledSkillRecord, PackageInfo};

/// Descriptions longer than this are cut down in listings.
const DESCRIPTION_WIDTH: usize = 80;

// ---------------------------------------------------------------------------
// Status lines
// ---------------------------------------------------------------------------

pub fn success(message: &str) {
    println!("✓ {message}");
}

pub fn error(message: &str) {
    eprintln!("✗ {message}");
}

pub fn warning(message: &str) {
    println!("⚠ {message}");
}

pub fn info(message: &str) {
    println!("ℹ {message}");
}

pub fn heading(text: &str) {
    println!();
    println!("{text}");
    println!();
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// `1234` → `1.2K`, `3_400_000` → `3.4M`.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Cut `text` to [`DESCRIPTION_WIDTH`] characters, ending in `...` when
/// anything was dropped.
pub fn truncate(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_WIDTH {
        return text.to_owned();
    }
    let kept: String = text.chars().take(DESCRIPTION_WIDTH - 3).collect();
    format!("{kept}...")
}

/// One search or browse result.  `index` is zero-based.
pub fn format_skill(skill: &PackageInfo, index: Option<usize>) -> String {
    let mut lines = Vec::new();

    let prefix = index.map(|i| format!("{}. ", i + 1)).unwrap_or_default();
    let version = skill
        .latest_version
        .as_deref()
        .map(|v| format!("@{v}"))
        .unwrap_or_default();
    let verified = if skill.verified { " ✓" } else { "" };
    let featured = if skill.featured { " ★" } else { "" };
    lines.push(format!("{prefix}{}{version}{verified}{featured}", skill.name));

    if let Some(description) = skill.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("   {}", truncate(description)));
    }

    let mut meta = Vec::new();
    if let Some(author) = &skill.author {
        meta.push(format!("by {}", author.username));
    }
    if skill.downloads > 0 {
        meta.push(format!("{} downloads", format_number(skill.downloads)));
    }
    if let Some(rating) = skill.rating.filter(|r| *r > 0.0) {
        meta.push(format!("{rating:.1}★"));
    }
    if !meta.is_empty() {
        lines.push(format!("   {}", meta.join(" • ")));
    }

    lines.join("\n")
}

pub fn format_skill_list(skills: &[PackageInfo]) -> String {
    if skills.is_empty() {
        return "No skills found.".to_owned();
    }
    skills
        .iter()
        .enumerate()
        .map(|(i, skill)| format_skill(skill, Some(i)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_installed_skill(record: &InstalledSkillRecord) -> String {
    format!(
        "{}@{}\n   {}",
        record.name,
        record.version,
        record.install_path().display()
    )
}

pub fn format_installed_skill_list(records: &[InstalledSkillRecord]) -> String {
    if records.is_empty() {
        return "No skills installed.".to_owned();
    }
    records
        .iter()
        .map(format_installed_skill)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The full `info` view of a registry package.
pub fn format_skill_detail(skill: &PackageInfo) -> String {
    let mut lines = Vec::new();

    let verified = if skill.verified { " ✓ Verified" } else { "" };
    let featured = if skill.featured { " ★ Featured" } else { "" };
    lines.push(format!(
        "{}@{}{verified}{featured}",
        skill.name,
        skill.latest_version.as_deref().unwrap_or("unknown")
    ));
    lines.push(String::new());

    if let Some(description) = skill.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(description.to_owned());
        lines.push(String::new());
    }

    lines.push("Details:".to_owned());
    if let Some(author) = &skill.author {
        match author.trust_tier.as_deref() {
            Some(tier) => lines.push(format!("  Author:     {} ({tier})", author.username)),
            None => lines.push(format!("  Author:     {}", author.username)),
        }
    }
    lines.push(format!(
        "  License:    {}",
        skill.license.as_deref().unwrap_or(DEFAULT_LICENSE)
    ));
    lines.push(format!("  Downloads:  {}", format_number(skill.downloads)));
    if let Some(rating) = skill.rating.filter(|r| *r > 0.0) {
        lines.push(format!(
            "  Rating:     {rating:.1} ★ ({} ratings)",
            skill.rating_count
        ));
    }
    if let Some(category) = &skill.category {
        lines.push(format!("  Category:   {category}"));
    }
    if let Some(repository) = &skill.repository {
        lines.push(format!("  Repository: {repository}"));
    }
    if let Some(homepage) = &skill.homepage {
        lines.push(format!("  Homepage:   {homepage}"));
    }

    if !skill.keywords.is_empty() {
        lines.push(String::new());
        lines.push("Keywords:".to_owned());
        lines.push(format!("  {}", skill.keywords.join(", ")));
    }

    lines.push(String::new());
    lines.push("Install:".to_owned());
    lines.push(format!("  skill-get install {}", skill.name));

    lines.join("\n")
}
