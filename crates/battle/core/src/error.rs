//! Severity classification shared by engine and runtime errors.
//!
//! [`crate::engine::CommandError`] lives next to the commands it validates;
//! the runtime wraps it and adds channel failures. A rejected command never
//! changes battle state, so severity only tells the caller whether to wait
//! and retry, pick another command, or stop driving the battle.

/// How a command provider should react to a rejected command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Debounced duplicate, action in flight or skill cooling down; retry
    /// after a tick.
    Recoverable,
    /// The command does not fit the current turn; choose another one.
    Validation,
    /// A runtime channel closed while the worker may still be alive.
    Internal,
    /// The battle has ended or the worker is gone.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Implemented by `CommandError` and the runtime's `RuntimeError` so the run
/// loop can decide between sleeping, re-asking the provider and bailing out.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, e.g. `"COMMAND_STALE_REFERENCE"`.
    fn error_code(&self) -> &'static str;

    fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}
