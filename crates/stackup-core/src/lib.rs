//! Start a project's backend detached and its frontend in the foreground.
//!
//! The backend's lifetime is not tied to the launcher's: it is never waited
//! on, signalled, or restarted. The frontend's exit status becomes the
//! launcher's own.

pub mod config;
pub mod error;
pub mod launcher;
pub mod process;

pub use config::StackConfig;
pub use error::LaunchError;
pub use launcher::{LaunchOutcome, Launcher, Stage};
