//! Image header (6 bytes).
//!
//! Layout:
//! - 0-3: entry offset, the byte offset of `Main.main`'s `Enter` instruction
//! - 4-5: number of descriptor records that follow the header

use crate::constants::HEADER_SIZE;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub entry: u32,
    pub descriptor_count: u16,
}

impl Header {
    /// Decode header from the first 6 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        Self {
            entry: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            descriptor_count: u16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.entry.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.descriptor_count.to_le_bytes());
        bytes
    }
}
