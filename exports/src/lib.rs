pub mod address;
pub mod logging;
pub mod memory;
pub mod process;
pub mod slots;
