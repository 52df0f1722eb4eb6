//! Child process execution for the install and run steps
//!
//! Processes inherit the parent's stdio so package-manager and application
//! output streams through unchanged.

use std::path::Path;
use std::process::Command;

use crate::error::{MonoshipError, Result};

/// Platform package-manager executable name.
pub const YARN_COMMAND: &str = if cfg!(windows) { "yarn.cmd" } else { "yarn" };

/// Run `command` with `args` in `cwd`, returning its exit code.
pub fn execute(command: &str, args: &[String], cwd: &Path) -> Result<i32> {
    let status = Command::new(command)
        .args(args)
        .current_dir(cwd)
        .status()
        .map_err(|e| MonoshipError::ProcessSpawnFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;
    // Terminated by signal: no exit code to forward.
    Ok(status.code().unwrap_or(-1))
}

/// Like [`execute`], but a non-zero exit is an error.
pub fn execute_checked(command: &str, args: &[String], cwd: &Path) -> Result<()> {
    let status = execute(command, args, cwd)?;
    if status != 0 {
        return Err(MonoshipError::ProcessFailed {
            command: command.to_string(),
            status,
        });
    }
    Ok(())
}
