use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use stockpile_address::Base;
use stockpile_process::ProcFs;

use crate::backend::{ProcessVmMemory, RemoteMemory};
use crate::batch::{read_slots, SlotLayout, WriteBatch};
use crate::codec::Endianness;
use crate::error::{AttachError, MemoryAccessError};
use crate::freeze::{FreezeController, FreezeState};
use crate::IndexedValue;

/// Executable name of the game whose stockpile is mirrored.
pub const GAME_EXECUTABLE: &str = "Game.exe";

/// Cadence of the freeze loop.
pub const FREEZE_INTERVAL: Duration = Duration::from_millis(200);

/// Mirrors and mutates the slot table of a target process.
///
/// Reads and writes run synchronously on the caller's thread, each as a single
/// vectored call covering every slot involved. Concurrent callers must
/// serialize access themselves; only the freeze loop is guaranteed to be a
/// single writer.
pub struct Trainer<M: RemoteMemory + 'static = ProcessVmMemory> {
    memory: Arc<M>,
    layout: SlotLayout,
    freezer: FreezeController,
}

impl Trainer<ProcessVmMemory> {
    /// Attaches to the running game with the slot table at `base_address`.
    pub fn attach(base_address: usize, slot_count: usize) -> Result<Self, AttachError> {
        Self::attach_to(&ProcFs::default(), GAME_EXECUTABLE, base_address, slot_count)
    }

    /// Attaches to the first process named `executable` listed in `procfs`.
    pub fn attach_to(
        procfs: &ProcFs,
        executable: &str,
        base_address: usize,
        slot_count: usize,
    ) -> Result<Self, AttachError> {
        let pid = procfs.find_process_by_name(executable)?;
        info!("Found {} with pid {}", executable, pid);

        Ok(Self::with_memory(ProcessVmMemory::new(pid), Base::from(base_address), slot_count))
    }

    pub fn pid(&self) -> i32 {
        self.memory.pid()
    }
}

impl<M: RemoteMemory + 'static> Trainer<M> {
    pub fn with_memory(memory: M, base: Base, slot_count: usize) -> Self {
        Self::with_shared_memory(Arc::new(memory), base, slot_count)
    }

    pub fn with_shared_memory(memory: Arc<M>, base: Base, slot_count: usize) -> Self {
        Self {
            memory,
            layout: SlotLayout::new(base, slot_count),
            freezer: FreezeController::new(FREEZE_INTERVAL),
        }
    }

    /// Replaces the freeze cadence. Stops a running freeze session.
    pub fn with_freeze_interval(mut self, interval: Duration) -> Self {
        self.freezer.stop();
        self.freezer = FreezeController::new(interval);
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.layout.endianness = endianness;
        self
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn memory(&self) -> &Arc<M> {
        &self.memory
    }

    pub fn slot_count(&self) -> usize {
        self.layout.slot_count
    }

    /// Reads every slot in one call, in slot order.
    pub fn read_all_slots(&self) -> Result<Vec<i32>, MemoryAccessError> {
        let read = read_slots(self.memory.as_ref(), &self.layout, 0..self.layout.slot_count)?;
        info!("Refreshed {} slot values from target memory, {} bytes copied", read.values.len(), read.copied);
        debug!("Slot values: {:?}", read.values);

        Ok(read.values)
    }

    pub fn read_slot(&self, index: usize) -> Result<i32, MemoryAccessError> {
        let read = read_slots(self.memory.as_ref(), &self.layout, [index])?;
        Ok(read.values[0])
    }

    /// Writes one value per slot in one call.
    ///
    /// Panics unless `values` holds exactly one entry per slot.
    pub fn write_all_slots(&self, values: &[i32]) -> Result<(), MemoryAccessError> {
        assert_eq!(
            values.len(), self.layout.slot_count,
            "expected one value per slot"
        );

        let batch = WriteBatch::new(&self.layout, values.iter().copied().enumerate());
        let copied = batch.submit(self.memory.as_ref())?;
        info!("Wrote slot values to target memory, {} bytes copied", copied);

        Ok(())
    }

    /// Writes an arbitrary subset of slots, in any order, in one call.
    pub fn write_indexed_values(&self, values: &[IndexedValue]) -> Result<(), MemoryAccessError> {
        let batch = WriteBatch::new(&self.layout, values.iter().map(|v| (v.index, v.value)));
        let copied = batch.submit(self.memory.as_ref())?;
        debug!("Wrote {} indexed values, {} bytes copied", values.len(), copied);

        Ok(())
    }

    pub fn write_slot(&self, index: usize, value: i32) -> Result<(), MemoryAccessError> {
        self.write_indexed_values(&[IndexedValue::new(index, value)])
    }

    /// Keeps `values` pinned in the background until `freeze_stop` is called
    /// or the target exits. Replaces any running freeze.
    pub fn freeze_start(&mut self, values: Vec<IndexedValue>) {
        let batch = WriteBatch::new(&self.layout, values.iter().map(|v| (v.index, v.value)));
        self.freezer.start(self.memory.clone(), batch, values);
    }

    /// Stops the freeze loop. Returns once no further freeze write can happen.
    pub fn freeze_stop(&mut self) {
        self.freezer.stop();
    }

    pub fn freeze_state(&self) -> FreezeState {
        self.freezer.state()
    }

    pub fn frozen_targets(&self) -> &[IndexedValue] {
        self.freezer.targets()
    }

    pub fn peak_loops(&self) -> usize {
        self.freezer.peak_loops()
    }
}
