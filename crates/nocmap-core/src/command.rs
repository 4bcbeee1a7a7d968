// ── Command API ──
//
// All admin writes flow through a unified `Command` enum. The controller
// validates each variant and routes it to the admin device API.

use crate::error::CoreError;
use crate::model::DeviceDraft;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against the admin device API.
#[derive(Debug, Clone)]
pub enum Command {
    CreateDevice { draft: DeviceDraft },
    UpdateDevice { id: i64, draft: DeviceDraft },
    DeleteDevice { id: i64 },
}

impl Command {
    /// Reject drafts the server would store as nonsense.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::CreateDevice { draft } | Self::UpdateDevice { draft, .. } => {
                validate_draft(draft)
            }
            Self::DeleteDevice { .. } => Ok(()),
        }
    }
}

/// Result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    /// A device was created under this id.
    Created { id: i64 },
}

fn validate_draft(draft: &DeviceDraft) -> Result<(), CoreError> {
    let required = [
        ("name", &draft.name),
        ("ip", &draft.ip),
        ("type", &draft.device_type),
        ("floor_id", &draft.floor_id),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(CoreError::validation(format!("{field} must not be empty")));
    }
    for (field, value) in [("pos_top", draft.pos_top), ("pos_left", draft.pos_left)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(CoreError::validation(format!(
                "{field} must be between 0 and 100 (got {value})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> DeviceDraft {
        DeviceDraft {
            name: "AP Lobby".into(),
            ip: "10.0.0.5".into(),
            device_type: "wifi".into(),
            floor_id: "ground".into(),
            pos_top: 25.0,
            pos_left: 75.5,
            is_active: true,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(Command::CreateDevice { draft: draft() }.validate().is_ok());
        assert!(Command::DeleteDevice { id: 3 }.validate().is_ok());
    }

    #[test]
    fn blank_fields_rejected() {
        let mut d = draft();
        d.ip = "  ".into();
        let err = Command::UpdateDevice { id: 1, draft: d }.validate().unwrap_err();
        assert!(err.to_string().contains("ip"));
    }

    #[test]
    fn out_of_range_position_rejected() {
        let mut d = draft();
        d.pos_left = 100.5;
        assert!(matches!(
            Command::CreateDevice { draft: d }.validate(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }
}
