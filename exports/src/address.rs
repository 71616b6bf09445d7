pub use stockpile_address::Address;
pub use stockpile_address::AddressError;
pub use stockpile_address::Base;
pub use stockpile_address::Offset;
pub use stockpile_address::SLOT_SIZE;
pub use stockpile_address::parse_hex;
