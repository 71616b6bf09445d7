use stockpile::address::AddressError;
use stockpile::logging::LoggingError;
use stockpile::memory::{AttachError, MemoryAccessError};
use stockpile::slots::SlotTableError;

use crate::profile::LaunchProfileError;

#[derive(Debug, thiserror::Error)]
pub(crate) enum LaunchError {
    #[error(transparent)]
    ConfigError(#[from] LaunchProfileError),
    #[error("could not set up logging: {0}")]
    LoggingError(#[from] LoggingError),
    #[error(transparent)]
    SlotError(#[from] SlotTableError),
    #[error(transparent)]
    AddressError(#[from] AddressError),
    #[error(transparent)]
    AttachError(#[from] AttachError),
    #[error("failed to read values from the game: {0}")]
    ReadError(MemoryAccessError),
    #[error("failed to write values to the game: {0}")]
    WriteError(MemoryAccessError),
    #[error("the launch profile does not set an address")]
    MissingAddress,
}
