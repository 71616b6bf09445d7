use std::fmt;

use nix::errno::Errno;
use stockpile_process::LocateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MemoryAccessError {
    #[error("vectored {operation} of {ranges} ranges failed: {source}")]
    Os {
        operation: Operation,
        ranges: usize,
        #[source]
        source: Errno,
    },
    #[error("vectored {operation} copied {transferred} of {expected} bytes")]
    Partial {
        operation: Operation,
        expected: usize,
        transferred: usize,
    },
}

impl MemoryAccessError {
    /// True when the target process no longer exists.
    pub fn is_process_gone(&self) -> bool {
        matches!(self, MemoryAccessError::Os { source: Errno::ESRCH, .. })
    }

    pub fn operation(&self) -> Operation {
        match self {
            MemoryAccessError::Os { operation, .. } => *operation,
            MemoryAccessError::Partial { operation, .. } => *operation,
        }
    }
}

/// Failure to construct an engine against a live process.
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("could not locate target process: {0}")]
    Locate(#[from] LocateError),
}

pub(crate) fn ensure_complete(
    operation: Operation,
    expected: usize,
    transferred: usize,
) -> Result<(), MemoryAccessError> {
    if transferred != expected {
        return Err(MemoryAccessError::Partial { operation, expected, transferred });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use nix::errno::Errno;

    use crate::error::{ensure_complete, MemoryAccessError, Operation};

    #[test]
    fn only_esrch_counts_as_the_process_being_gone() {
        let gone = MemoryAccessError::Os { operation: Operation::Write, ranges: 2, source: Errno::ESRCH };
        let denied = MemoryAccessError::Os { operation: Operation::Write, ranges: 2, source: Errno::EPERM };
        let partial = MemoryAccessError::Partial { operation: Operation::Read, expected: 8, transferred: 4 };

        assert!(gone.is_process_gone());
        assert!(!denied.is_process_gone());
        assert!(!partial.is_process_gone());
    }

    #[test]
    fn short_transfers_are_errors() {
        assert!(ensure_complete(Operation::Read, 8, 8).is_ok());
        assert_eq!(
            ensure_complete(Operation::Read, 8, 4),
            Err(MemoryAccessError::Partial { operation: Operation::Read, expected: 8, transferred: 4 })
        );
    }

    #[test]
    fn messages_name_the_operation_and_cause() {
        let error = MemoryAccessError::Os { operation: Operation::Read, ranges: 49, source: Errno::EPERM };
        let message = error.to_string();

        assert!(message.contains("read"));
        assert!(message.contains("49"));
        assert_eq!(error.operation(), Operation::Read);
    }
}
