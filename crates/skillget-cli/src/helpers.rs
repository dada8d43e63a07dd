//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization, configuration loading, argument
//! splitting and the interactive confirmation prompt.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use skillget_skills::{ClientConfig, HttpRegistry, LATEST, SkillManager};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub fn load_config() -> Result<ClientConfig> {
    let config = ClientConfig::load().context("failed to load configuration")?;
    tracing::debug!(
        api_url = %config.api_url,
        agent = %config.agent,
        state = %config.state_path().display(),
        "configuration loaded"
    );
    Ok(config)
}

/// A lifecycle manager talking to the configured registry.
pub fn open_manager(config: &ClientConfig) -> SkillManager<HttpRegistry> {
    SkillManager::new(config, HttpRegistry::new(config))
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Split `name@version`.
///
/// Names starting with `@` are left whole, and an empty version after `@`
/// means latest.  Without `@`, `fallback_version` is used.
pub fn split_name_version(arg: &str, fallback_version: &str) -> (String, String) {
    if arg.starts_with('@') || !arg.contains('@') {
        return (arg.to_owned(), fallback_version.to_owned());
    }

    let mut parts = arg.split('@');
    let name = parts.next().unwrap_or_default();
    let version = parts.next().filter(|v| !v.is_empty()).unwrap_or(LATEST);
    (name.to_owned(), version.to_owned())
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Ask a yes/no question.  An empty answer picks `default`.
pub fn confirm(
    question: &str,
    default: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> io::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    write!(out, "? {question} {hint} ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();

    Ok(match answer.as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// [`confirm`] against the terminal.
pub fn confirm_stdin(question: &str, default: bool) -> Result<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    confirm(question, default, &mut stdin.lock(), &mut stdout.lock())
        .context("failed to read confirmation")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(answer: &str, default: bool) -> (bool, String) {
        let mut input = io::Cursor::new(answer.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = confirm("Remove foo@1.0.0?", default, &mut input, &mut out).unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn bare_name_uses_fallback_version() {
        assert_eq!(
            split_name_version("code-review", "1.2.0"),
            ("code-review".into(), "1.2.0".into())
        );
    }

    #[test]
    fn explicit_version_overrides_fallback() {
        assert_eq!(
            split_name_version("code-review@2.0.0", LATEST),
            ("code-review".into(), "2.0.0".into())
        );
    }

    #[test]
    fn trailing_at_means_latest() {
        assert_eq!(
            split_name_version("code-review@", "1.0.0"),
            ("code-review".into(), LATEST.into())
        );
    }

    #[test]
    fn scoped_name_is_not_split() {
        assert_eq!(
            split_name_version("@acme/tools", LATEST),
            ("@acme/tools".into(), LATEST.into())
        );
    }

    #[test]
    fn confirm_accepts_yes_variants() {
        assert!(ask("y\n", false).0);
        assert!(ask("YES\n", false).0);
        assert!(!ask("n\n", true).0);
        assert!(!ask("maybe\n", true).0);
    }

    #[test]
    fn confirm_empty_answer_uses_default() {
        let (yes, prompt) = ask("\n", true);
        assert!(yes);
        assert!(prompt.contains("[Y/n]"));

        let (no, prompt) = ask("", false);
        assert!(!no);
        assert!(prompt.contains("[y/N]"));
    }
}
