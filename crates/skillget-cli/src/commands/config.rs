//! `skill-get config [--agent A] [--api URL] [--list]`.

use anyhow::Result;
use skillget_skills::{Agent, ClientConfig};

use crate::ui;

pub fn execute(
    config: &mut ClientConfig,
    agent: Option<&str>,
    api: Option<&str>,
    list: bool,
) -> Result<()> {
    if list || (agent.is_none() && api.is_none()) {
        print_config(config);
        return Ok(());
    }

    if let Some(raw) = agent {
        let agent: Agent = raw.parse().map_err(anyhow::Error::msg)?;
        config.set_agent(agent)?;
        ui::success(&format!("Agent set to {}", agent.display_name()));
    }

    if let Some(url) = api {
        config.set_api_url(url)?;
        ui::success(&format!("API URL set to {}", config.api_url));
    }
    Ok(())
}

fn print_config(config: &ClientConfig) {
    println!();
    println!("Configuration:");
    println!("  Agent:       {}", config.agent.display_name());
    println!("  Skills Path: {}", config.skills_dir().display());
    println!("  API URL:     {}", config.api_url);
    println!(
        "  Logged in:   {}",
        match (&config.username, config.is_authenticated()) {
            (Some(name), true) => name.as_str(),
            _ => "No",
        }
    );
    println!("  State file:  {}", config.state_path().display());
}
