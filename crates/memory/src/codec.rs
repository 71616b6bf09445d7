use stockpile_address::SLOT_SIZE;

/// Byte order of the slot values in the target's memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    pub fn host() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub fn encode_i32(self, value: i32) -> [u8; SLOT_SIZE] {
        match self {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        }
    }

    pub fn decode_i32(self, bytes: [u8; SLOT_SIZE]) -> i32 {
        match self {
            Endianness::Little => i32::from_le_bytes(bytes),
            Endianness::Big => i32::from_be_bytes(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::Endianness;

    #[test]
    fn byte_order_is_explicit() {
        assert_eq!(Endianness::Little.encode_i32(0x01020304), [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(Endianness::Big.encode_i32(0x01020304), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(Endianness::Little.decode_i32([0xF4, 0xFF, 0xFF, 0xFF]), -12);
        assert_eq!(Endianness::Big.decode_i32([0xFF, 0xFF, 0xFF, 0xF4]), -12);
    }
}
