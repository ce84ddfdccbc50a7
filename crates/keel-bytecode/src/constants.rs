//! Image format constants.

/// Header size in bytes: `u32` entry offset followed by `u16` descriptor count.
pub const HEADER_SIZE: usize = 6;

/// Dispatch slot value for a selector the entity does not implement.
pub const ABSENT: u32 = u32::MAX;

/// Frame sizes and argument counts are encoded in a single byte.
pub const MAX_REGISTERS: usize = u8::MAX as usize;
