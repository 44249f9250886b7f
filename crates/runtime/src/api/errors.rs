//! Errors surfaced by the runtime API.
//!
//! Engine rejections pass through unchanged as [`RuntimeError::Command`];
//! the remaining variants describe worker and channel failures.
use battle_core::{BattleError, CommandError, ErrorSeverity};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("battle worker command channel closed")]
    CommandChannelClosed,

    #[error("battle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("battle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a roster before building")]
    MissingRoster,

    #[error("player provider not set")]
    ProviderNotSet,
}

impl RuntimeError {
    /// The engine rejection behind this error, if any.
    pub fn as_command(&self) -> Option<&CommandError> {
        match self {
            Self::Command(err) => Some(err),
            _ => None,
        }
    }
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Command(err) => err.severity(),
            Self::MissingRoster | Self::ProviderNotSet => ErrorSeverity::Validation,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) => ErrorSeverity::Internal,
            Self::WorkerJoin(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Command(err) => err.error_code(),
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingRoster => "RUNTIME_MISSING_ROSTER",
            Self::ProviderNotSet => "RUNTIME_PROVIDER_NOT_SET",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_errors_keep_their_classification() {
        let err = RuntimeError::from(CommandError::NoTarget);
        assert_eq!(err.severity(), CommandError::NoTarget.severity());
        assert_eq!(err.error_code(), CommandError::NoTarget.error_code());
        assert_eq!(err.as_command(), Some(&CommandError::NoTarget));
        assert!(RuntimeError::CommandChannelClosed.as_command().is_none());
    }
}
