//! An in-process stand-in for a remote address space.
//!
//! `BufferMemory` maps a window of fake remote addresses onto a local byte
//! buffer. It lets the engine and the freeze loop run without a second
//! process: tests can poke values as if the target wrote them, and inject OS
//! errors such as `ESRCH` to emulate the target exiting.

use std::io::{IoSlice, IoSliceMut};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use nix::errno::Errno;

use crate::backend::{RemoteMemory, RemoteRange};
use crate::error::{MemoryAccessError, Operation};

pub struct BufferMemory {
    base: usize,
    bytes: Mutex<Vec<u8>>,
    failure: Mutex<Option<Errno>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl BufferMemory {
    /// Zeroed window of `len` bytes starting at the fake address `base`.
    pub fn new(base: usize, len: usize) -> Self {
        Self {
            base,
            bytes: Mutex::new(vec![0; len]),
            failure: Mutex::new(None),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Makes every following call fail with `errno` until `recover` is called.
    pub fn fail_with(&self, errno: Errno) {
        *lock(&self.failure) = Some(errno);
    }

    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    /// Writes behind the engine's back, like the target process would.
    ///
    /// Panics when the range lies outside the window.
    pub fn poke(&self, address: usize, data: &[u8]) {
        let mut bytes = lock(&self.bytes);
        let window = self.window(address, data.len(), bytes.len())
            .unwrap_or_else(|| panic!("poke of {} bytes at {:#x} outside the window", data.len(), address));

        bytes[window].copy_from_slice(data);
    }

    /// Panics when the range lies outside the window.
    pub fn peek(&self, address: usize, len: usize) -> Vec<u8> {
        let bytes = lock(&self.bytes);
        let window = self.window(address, len, bytes.len())
            .unwrap_or_else(|| panic!("peek of {} bytes at {:#x} outside the window", len, address));

        bytes[window].to_vec()
    }

    pub fn poke_i32(&self, address: usize, value: i32) {
        self.poke(address, &value.to_le_bytes());
    }

    pub fn peek_i32(&self, address: usize) -> i32 {
        let mut buffer = [0u8; 4];
        buffer.copy_from_slice(&self.peek(address, 4));
        i32::from_le_bytes(buffer)
    }

    /// Number of vectored read calls served, failed ones included.
    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of vectored write calls served, failed ones included.
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Local byte range backing `len` bytes at `address`, if all of them
    /// fall inside a window of `size` bytes.
    fn window(&self, address: usize, len: usize, size: usize) -> Option<Range<usize>> {
        let start = address.checked_sub(self.base)?;
        let end = start.checked_add(len)?;

        (end <= size).then_some(start..end)
    }

    /// Local ranges for every remote one, or the error the call must fail with.
    fn windows(&self, operation: Operation, remote: &[RemoteRange], size: usize) -> Result<Vec<Range<usize>>, MemoryAccessError> {
        if let Some(errno) = *lock(&self.failure) {
            return Err(MemoryAccessError::Os { operation, ranges: remote.len(), source: errno });
        }

        remote.iter()
            .map(|r| self.window(r.address.as_usize(), r.len, size))
            .collect::<Option<Vec<_>>>()
            .ok_or(MemoryAccessError::Os { operation, ranges: remote.len(), source: Errno::EFAULT })
    }
}

/// A panicking test thread must not take the fake target down with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RemoteMemory for BufferMemory {
    fn read_ranges(&self, local: &mut [IoSliceMut<'_>], remote: &[RemoteRange]) -> Result<usize, MemoryAccessError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let bytes = lock(&self.bytes);
        let windows = self.windows(Operation::Read, remote, bytes.len())?;

        let mut copied = 0;
        for (destination, window) in local.iter_mut().zip(windows) {
            copied += window.len();
            destination.copy_from_slice(&bytes[window]);
        }

        Ok(copied)
    }

    fn write_ranges(&self, local: &[IoSlice<'_>], remote: &[RemoteRange]) -> Result<usize, MemoryAccessError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut bytes = lock(&self.bytes);
        let windows = self.windows(Operation::Write, remote, bytes.len())?;

        let mut copied = 0;
        for (source, window) in local.iter().zip(windows) {
            copied += window.len();
            bytes[window].copy_from_slice(source);
        }

        Ok(copied)
    }
}
