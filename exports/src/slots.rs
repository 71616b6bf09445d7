pub use stockpile_slots::SlotTable;
pub use stockpile_slots::Category;
pub use stockpile_slots::SlotTableError;
