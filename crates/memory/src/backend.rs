use std::io::{IoSlice, IoSliceMut};

use nix::sys::uio::{process_vm_readv, process_vm_writev, RemoteIoVec};
use nix::unistd::Pid;
use stockpile_address::Address;

use crate::error::{MemoryAccessError, Operation};

/// A contiguous range in the target's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteRange {
    pub address: Address,
    pub len: usize,
}

/// Scatter/gather access to another address space.
///
/// Each call moves every range in a single request. `local[i]` pairs with
/// `remote[i]` and both sides have the same length. The returned count is the
/// number of bytes the OS reports as copied.
pub trait RemoteMemory: Send + Sync {
    fn read_ranges(&self, local: &mut [IoSliceMut<'_>], remote: &[RemoteRange]) -> Result<usize, MemoryAccessError>;

    fn write_ranges(&self, local: &[IoSlice<'_>], remote: &[RemoteRange]) -> Result<usize, MemoryAccessError>;
}

/// Linux backend built on `process_vm_readv` and `process_vm_writev`.
#[derive(Debug, Clone, Copy)]
pub struct ProcessVmMemory {
    pid: Pid,
}

impl ProcessVmMemory {
    pub fn new(pid: i32) -> Self {
        Self { pid: Pid::from_raw(pid) }
    }

    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }
}

impl RemoteMemory for ProcessVmMemory {
    fn read_ranges(&self, local: &mut [IoSliceMut<'_>], remote: &[RemoteRange]) -> Result<usize, MemoryAccessError> {
        let remote_iov = to_remote_iovecs(remote);

        process_vm_readv(self.pid, local, &remote_iov)
            .map_err(|e| MemoryAccessError::Os { operation: Operation::Read, ranges: remote.len(), source: e })
    }

    fn write_ranges(&self, local: &[IoSlice<'_>], remote: &[RemoteRange]) -> Result<usize, MemoryAccessError> {
        let remote_iov = to_remote_iovecs(remote);

        process_vm_writev(self.pid, local, &remote_iov)
            .map_err(|e| MemoryAccessError::Os { operation: Operation::Write, ranges: remote.len(), source: e })
    }
}

fn to_remote_iovecs(remote: &[RemoteRange]) -> Vec<RemoteIoVec> {
    remote.iter()
        .map(|r| RemoteIoVec { base: r.address.as_usize(), len: r.len })
        .collect()
}
