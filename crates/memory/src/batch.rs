use std::io::{IoSlice, IoSliceMut};

use stockpile_address::{Base, SLOT_SIZE};

use crate::backend::{RemoteMemory, RemoteRange};
use crate::codec::Endianness;
use crate::error::{ensure_complete, MemoryAccessError, Operation};

/// Where the slot table lives in the target and how its values are encoded.
#[derive(Debug, Clone, Copy)]
pub struct SlotLayout {
    pub base: Base,
    pub slot_count: usize,
    pub endianness: Endianness,
}

impl SlotLayout {
    pub fn new(base: Base, slot_count: usize) -> Self {
        Self { base, slot_count, endianness: Endianness::default() }
    }

    /// Remote descriptor of slot `index`.
    ///
    /// Panics when `index` lies outside the table: indices always come from
    /// the slot table, so anything else is a bug in the caller.
    pub fn range(&self, index: usize) -> RemoteRange {
        assert!(
            index < self.slot_count,
            "slot index {} out of range for a table of {} slots", index, self.slot_count
        );

        RemoteRange { address: self.base.slot(index, SLOT_SIZE), len: SLOT_SIZE }
    }
}

/// Encoded values paired with their remote descriptors, ready to be written
/// in one vectored call. Built once and resubmitted as often as needed.
#[derive(Debug, Clone)]
pub struct WriteBatch {
    buffers: Vec<[u8; SLOT_SIZE]>,
    ranges: Vec<RemoteRange>,
}

impl WriteBatch {
    pub fn new(layout: &SlotLayout, values: impl IntoIterator<Item = (usize, i32)>) -> Self {
        let (buffers, ranges): (Vec<_>, Vec<_>) = values.into_iter()
            .map(|(index, value)| (layout.endianness.encode_i32(value), layout.range(index)))
            .unzip();

        Self { buffers, ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Writes every value in a single call, returning the bytes copied.
    pub fn submit<M: RemoteMemory + ?Sized>(&self, memory: &M) -> Result<usize, MemoryAccessError> {
        if self.is_empty() {
            return Ok(0);
        }

        let local: Vec<IoSlice<'_>> = self.buffers.iter()
            .map(|b| IoSlice::new(b))
            .collect();

        let transferred = memory.write_ranges(&local, &self.ranges)?;
        ensure_complete(Operation::Write, self.len() * SLOT_SIZE, transferred)?;

        Ok(transferred)
    }
}

/// Values read in one call, in request order, and the bytes copied for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRead {
    pub values: Vec<i32>,
    pub copied: usize,
}

/// Reads the given slots in a single call.
pub fn read_slots<M: RemoteMemory + ?Sized>(
    memory: &M,
    layout: &SlotLayout,
    indices: impl IntoIterator<Item = usize>,
) -> Result<SlotRead, MemoryAccessError> {
    let ranges: Vec<RemoteRange> = indices.into_iter()
        .map(|index| layout.range(index))
        .collect();
    if ranges.is_empty() {
        return Ok(SlotRead { values: Vec::new(), copied: 0 });
    }

    let mut buffers = vec![[0u8; SLOT_SIZE]; ranges.len()];
    let transferred = {
        let mut local: Vec<IoSliceMut<'_>> = buffers.iter_mut()
            .map(|b| IoSliceMut::new(b))
            .collect();

        memory.read_ranges(&mut local, &ranges)?
    };
    ensure_complete(Operation::Read, ranges.len() * SLOT_SIZE, transferred)?;

    Ok(SlotRead {
        values: buffers.into_iter().map(|b| layout.endianness.decode_i32(b)).collect(),
        copied: transferred,
    })
}

#[cfg(test)]
mod tests {
    use stockpile_address::Base;

    use crate::batch::{read_slots, SlotLayout, WriteBatch};
    use crate::buffer::BufferMemory;
    use crate::codec::Endianness;

    #[test]
    fn slot_ranges_follow_the_base_address() {
        let layout = SlotLayout::new(Base::from(0x1000), 8);

        let range = layout.range(2);
        assert_eq!(range.address.as_usize(), 0x1008);
        assert_eq!(range.len, 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn slot_indices_past_the_table_fail_fast() {
        let layout = SlotLayout::new(Base::from(0x1000), 8);
        layout.range(8);
    }

    #[test]
    fn batches_keep_their_order_and_encoding() {
        let memory = BufferMemory::new(0x1000, 32);
        let mut layout = SlotLayout::new(Base::from(0x1000), 8);
        layout.endianness = Endianness::Big;

        let batch = WriteBatch::new(&layout, [(5, -12), (3, 77)]);
        assert_eq!(batch.submit(&memory).unwrap(), 8);

        assert_eq!(memory.peek(0x100C, 4), vec![0, 0, 0, 77]);
        let read = read_slots(&memory, &layout, [5, 3]).unwrap();
        assert_eq!(read.values, vec![-12, 77]);
        assert_eq!(read.copied, 8);
    }

    #[test]
    fn empty_batches_do_not_touch_the_target() {
        let memory = BufferMemory::new(0x1000, 32);
        let layout = SlotLayout::new(Base::from(0x1000), 8);

        assert_eq!(WriteBatch::new(&layout, Vec::<(usize, i32)>::new()).submit(&memory).unwrap(), 0);
        let read = read_slots(&memory, &layout, Vec::<usize>::new()).unwrap();
        assert!(read.values.is_empty());
        assert_eq!(read.copied, 0);
        assert_eq!(memory.write_calls(), 0);
        assert_eq!(memory.read_calls(), 0);
    }
}
