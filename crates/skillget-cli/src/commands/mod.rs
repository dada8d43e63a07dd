//! One module per subcommand.  Each exposes an `execute` entry point that
//! `main` calls with the already-loaded configuration.

pub mod auth;
pub mod config;
pub mod info;
pub mod install;
pub mod list;
pub mod publish;
pub mod remove;
pub mod search;
pub mod update;
