//! `skill-get remove <name>`.

use anyhow::Result;
use skillget_skills::{ClientConfig, SkillError};

use crate::{helpers, ui};

pub fn execute(config: &ClientConfig, name: &str, yes: bool) -> Result<()> {
    let manager = helpers::open_manager(config);

    let Some(record) = manager.get(name)? else {
        return Err(SkillError::NotInstalled {
            name: name.to_owned(),
        }
        .into());
    };

    if !yes && !helpers::confirm_stdin(&format!("Remove {name}@{}?", record.version), false)? {
        ui::warning("Removal cancelled");
        return Ok(());
    }

    manager.remove(name)?;
    ui::success(&format!("Removed {name}"));
    Ok(())
}
