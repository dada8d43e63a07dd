//! Registry login for `skill-get`.
//!
//! The registry issues bearer tokens through a device authorization flow:
//! the CLI shows a short code, the user approves it in a browser, and the
//! CLI polls until a token is issued.  Persisting the token is left to the
//! caller.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use skillget_auth::DeviceCodeFlow;
//!
//! # async fn example() -> skillget_auth::Result<()> {
//! let flow = DeviceCodeFlow::new("https://api.mcpskills.dev");
//! let device = flow.request_device_code().await?;
//! println!("Open {} and enter {}", device.verification_uri, device.user_code);
//!
//! let session = flow.wait_for_approval(&device).await?;
//! println!("logged in as {}", session.user.username);
//! # Ok(())
//! # }
//! ```

pub mod device_code;
pub mod error;

pub use device_code::{AuthSession, AuthUser, DeviceCodeFlow, DeviceCodeResponse};
pub use error::{AuthError, Result};
