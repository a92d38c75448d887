use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("--install and --update are mutually exclusive; pass exactly one")]
    ConflictingAction,

    #[error("nothing to do: pass --install <modules> or --update <modules>")]
    MissingAction,

    #[error("missing database name: pass --database <name>")]
    MissingDatabase,

    #[error("no module names given (expected a comma-separated list)")]
    EmptyModules,

    #[error("compose path is not an existing directory: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error(
        "docker compose not found\n\n\
         odup drives a local Odoo deployment through the compose CLI.\n\
         Install Docker with the compose plugin, or the standalone\n\
         docker-compose binary, and make sure it is on PATH."
    )]
    ComposeNotFound,

    #[error("apply step failed with exit code {code}; service left as it was, restart skipped")]
    ApplyFailed { code: i32 },

    #[error("stop step failed with exit code {code}; modules were applied but the service may be partially stopped")]
    StopFailed { code: i32 },

    #[error("start step failed with exit code {code}; modules were applied but the service is stopped")]
    StartFailed { code: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SequenceError {
    /// Process exit code: 2 for pre-flight refusals (nothing was executed),
    /// 3/4/5 for the apply, stop, and start steps, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            SequenceError::ConflictingAction
            | SequenceError::MissingAction
            | SequenceError::MissingDatabase
            | SequenceError::EmptyModules
            | SequenceError::InvalidPath(_) => 2,
            SequenceError::ApplyFailed { .. } => 3,
            SequenceError::StopFailed { .. } => 4,
            SequenceError::StartFailed { .. } => 5,
            SequenceError::ComposeNotFound | SequenceError::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SequenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_errors_share_the_usage_exit_code() {
        assert_eq!(SequenceError::ConflictingAction.exit_code(), 2);
        assert_eq!(SequenceError::MissingAction.exit_code(), 2);
        assert_eq!(SequenceError::MissingDatabase.exit_code(), 2);
        assert_eq!(SequenceError::EmptyModules.exit_code(), 2);
        assert_eq!(SequenceError::InvalidPath(PathBuf::from("/nope")).exit_code(), 2);
    }

    #[test]
    fn each_step_gets_a_distinct_exit_code() {
        assert_eq!(SequenceError::ApplyFailed { code: 1 }.exit_code(), 3);
        assert_eq!(SequenceError::StopFailed { code: 1 }.exit_code(), 4);
        assert_eq!(SequenceError::StartFailed { code: 1 }.exit_code(), 5);
    }
}
