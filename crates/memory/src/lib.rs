//! Batched cross-process access to a table of 32-bit slots.

pub mod backend;
pub mod batch;
#[cfg(any(test, feature = "testing"))]
pub mod buffer;
pub mod codec;
pub mod error;
pub mod freeze;
pub mod trainer;

pub use backend::{ProcessVmMemory, RemoteMemory, RemoteRange};
pub use codec::Endianness;
pub use error::{AttachError, MemoryAccessError, Operation};
pub use freeze::{FreezeController, FreezeState};
pub use trainer::{Trainer, FREEZE_INTERVAL, GAME_EXECUTABLE};

/// A value destined for a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedValue {
    pub index: usize,
    pub value: i32,
}

impl IndexedValue {
    pub fn new(index: usize, value: i32) -> Self {
        Self { index, value }
    }
}
