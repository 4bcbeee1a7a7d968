//! Shared helpers for command handlers.

use std::io::IsTerminal;

use nocmap_core::{Controller, SiteConfig};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, refuses rather than guessing.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// The floor configuration loaded during connect.
pub fn site_config(controller: &Controller) -> Result<std::sync::Arc<SiteConfig>, CliError> {
    controller
        .site_config()
        .ok_or_else(|| CliError::Internal("floor configuration was not loaded".into()))
}

/// Reject floor or type ids the server doesn't know.
pub fn check_known(site: &SiteConfig, floor: Option<&str>, device_type: Option<&str>) -> Result<(), CliError> {
    if let Some(floor) = floor {
        if site.floor(floor).is_none() {
            return Err(CliError::Validation {
                field: "floor".into(),
                reason: format!(
                    "unknown floor '{floor}' (known: {})",
                    site.floors.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            });
        }
    }
    if let Some(kind) = device_type {
        if !site.device_types.contains_key(kind) {
            return Err(CliError::Validation {
                field: "type".into(),
                reason: format!(
                    "unknown device type '{kind}' (known: {})",
                    site.device_types.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            });
        }
    }
    Ok(())
}
