pub use stockpile_memory::Trainer;
pub use stockpile_memory::IndexedValue;
pub use stockpile_memory::Endianness;
pub use stockpile_memory::FreezeState;
pub use stockpile_memory::AttachError;
pub use stockpile_memory::MemoryAccessError;
pub use stockpile_memory::Operation;
pub use stockpile_memory::RemoteMemory;
pub use stockpile_memory::RemoteRange;
pub use stockpile_memory::ProcessVmMemory;
pub use stockpile_memory::FREEZE_INTERVAL;
pub use stockpile_memory::GAME_EXECUTABLE;
