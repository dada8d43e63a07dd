//! `skill-get login`, `logout` and `whoami`.

use anyhow::{Context, Result};
use skillget_auth::DeviceCodeFlow;
use skillget_skills::{ClientConfig, HttpRegistry};

use crate::{helpers, ui};

/// Run the device-code flow and store the issued token.
pub async fn login(config: &mut ClientConfig) -> Result<()> {
    if config.is_authenticated() {
        ui::info(&format!(
            "Already logged in as {}",
            config.username.as_deref().unwrap_or("unknown")
        ));
        if !helpers::confirm_stdin("Do you want to log in with a different account?", false)? {
            return Ok(());
        }
    }

    let flow = DeviceCodeFlow::new(&config.api_url);
    println!("Initiating device authentication...");
    let device = flow.request_device_code().await?;

    println!();
    println!("To authenticate, please:");
    println!();
    println!("1. Open this URL in your browser:");
    println!("   {}", device.verification_uri);
    println!();
    println!("2. Enter this code:");
    println!("   {}", device.user_code);
    if let Some(complete) = &device.verification_uri_complete {
        println!();
        println!("Or open: {complete}");
    }
    println!();
    println!("Waiting for authentication...");

    let session = flow.wait_for_approval(&device).await?;
    config
        .set_token(&session.token, &session.user.username)
        .context("failed to save credentials")?;

    ui::success(&format!("Logged in as {}", session.user.username));
    ui::success("You can now publish skills to the registry");
    Ok(())
}

pub fn logout(config: &mut ClientConfig) -> Result<()> {
    if !config.is_authenticated() {
        ui::warning("Not logged in");
        return Ok(());
    }

    let username = config.username.clone().unwrap_or_default();
    config.clear_token()?;
    ui::success(&format!("Logged out from {username}"));
    Ok(())
}

/// Print the logged-in user, as the registry sees it when reachable.
pub async fn whoami(config: &ClientConfig) -> Result<()> {
    if !config.is_authenticated() {
        ui::info("Not logged in");
        ui::info("Log in with: skill-get login");
        return Ok(());
    }

    match HttpRegistry::new(config).current_user().await {
        Ok(user) => println!("{}", user.username),
        Err(e) => {
            tracing::debug!(error = %e, "could not confirm user with registry");
            println!("{}", config.username.as_deref().unwrap_or("unknown"));
        }
    }
    Ok(())
}
