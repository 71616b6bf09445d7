use std::ops;
use std::fmt;
use std::fmt::Formatter;

/// Size in bytes of a single slot in the target's table.
pub const SLOT_SIZE: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid hex address {input:?}")]
    InvalidHex { input: String },
    #[error("address {address:#x} is below the offset of slot {index}")]
    BelowSlotOffset { address: usize, index: usize },
}

/// Address of slot 0 inside the target's address space.
#[derive(Eq, PartialEq, Clone, Copy)]
pub struct Base {
    pub value: usize,
}

impl Base {
    /// Remote address of slot `index` for elements of `element_size` bytes.
    ///
    /// Panics if the computation overflows the address space, which can only
    /// happen with an index that does not come from the slot table.
    pub fn slot(&self, index: usize, element_size: usize) -> Address {
        let offset = index.checked_mul(element_size)
            .unwrap_or_else(|| panic!("slot offset overflows for index {index}"));

        self + &Offset::from(offset)
    }

    /// Derives the table base from the address of a single known slot.
    pub fn from_slot_address(address: usize, index: usize) -> Result<Self, AddressError> {
        index.checked_mul(SLOT_SIZE)
            .and_then(|offset| address.checked_sub(offset))
            .map(Base::from)
            .ok_or(AddressError::BelowSlotOffset { address, index })
    }

    pub fn as_usize(&self) -> usize {
        self.value
    }
}

impl From<usize> for Base {
    fn from(value: usize) -> Self {
        Self { value }
    }
}

impl ops::Add<&Offset> for &Base {
    type Output = Address;

    fn add(self, rhs: &Offset) -> Self::Output {
        let value = self.value.checked_add(rhs.value)
            .unwrap_or_else(|| panic!("{:?} + {:?} overflows", self, rhs));

        Address::from(value)
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Base({:#x})", self.value)
    }
}

#[derive(Eq, PartialEq, Clone, Copy)]
pub struct Offset {
    pub value: usize,
}

impl Offset {
    pub fn as_usize(&self) -> usize {
        self.value
    }
}

impl From<usize> for Offset {
    fn from(value: usize) -> Self {
        Self { value }
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Offset(+{:#x})", self.value)
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Hash)]
pub struct Address {
    pub value: usize,
}

impl Address {
    pub fn as_usize(&self) -> usize {
        self.value
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Self { value }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#x})", self.value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.value)
    }
}

/// Parses a hex address as typed by a user, with or without a `0x` prefix.
pub fn parse_hex(input: &str) -> Result<usize, AddressError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    usize::from_str_radix(digits, 16)
        .map_err(|_| AddressError::InvalidHex { input: input.to_string() })
}
