//! CLI argument definitions for `skill-get`.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use clap::{Parser, Subcommand};
use skillget_skills::LATEST;

/// skill-get -- package manager for AI agent skills.
#[derive(Parser)]
#[command(
    name = "skill-get",
    version,
    about = "Package manager for AI agent skills",
    long_about = "Install, update and publish skills for AI coding agents such as \
                  Claude Code, Cursor and Windsurf."
)]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a skill from the registry or a local directory.
    Install {
        /// Skill name (optionally `name@version`) or a local path.
        target: String,

        /// Specific version to install.
        #[arg(long, short = 'v', default_value = LATEST)]
        version: String,

        /// Reinstall even if the skill is already installed.
        #[arg(long, short)]
        force: bool,

        /// Treat the target as a local directory.
        #[arg(long, short)]
        local: bool,
    },

    /// Remove an installed skill.
    #[command(visible_aliases = ["rm", "uninstall"])]
    Remove {
        /// The skill name to remove.
        name: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Update installed skill(s) to the latest version.
    #[command(visible_alias = "upgrade")]
    Update {
        /// Skill to update; every registry skill when omitted.
        name: Option<String>,

        /// Only report available updates; install nothing.
        #[arg(long)]
        check: bool,
    },

    /// List installed skills.
    #[command(visible_alias = "ls")]
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show detailed information about a skill.
    #[command(visible_aliases = ["show", "view"])]
    Info {
        /// Skill name.
        name: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search the registry.
    Search {
        /// Search query.
        query: Option<String>,

        /// Filter by category.
        #[arg(long, short)]
        category: Option<String>,

        /// Number of results per page.
        #[arg(long, short, default_value_t = 20)]
        limit: u32,

        /// Page number.
        #[arg(long, short, default_value_t = 1)]
        page: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Browse all available skills.
    Browse {
        /// Filter by category.
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Log in to the registry.
    Login,

    /// Log out from the registry.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Publish a skill to the registry.
    Publish {
        /// Path to the skill directory.
        #[arg(default_value = ".")]
        path: String,

        /// Validate and summarise without publishing.
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Show or modify configuration.
    Config {
        /// Set the target agent (claude-code, cursor, ...).
        #[arg(long)]
        agent: Option<String>,

        /// Set the registry API URL.
        #[arg(long)]
        api: Option<String>,

        /// List all configuration.
        #[arg(long)]
        list: bool,
    },
}
