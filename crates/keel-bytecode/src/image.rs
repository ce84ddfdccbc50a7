//! Loaded program image.
//!
//! The [`Image`] struct decodes the header and descriptor table eagerly and
//! decodes instructions on demand.

use std::io;
use std::path::Path;

use crate::constants::HEADER_SIZE;
use crate::descriptor::Descriptor;
use crate::header::Header;
use crate::ids::DescriptorIdx;
use crate::instructions::Instruction;
use crate::reader::Reader;

/// Errors when decoding an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("file too small: {0} bytes (minimum {HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("truncated image: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },
    #[error("invalid entity tag {tag} at offset {offset}")]
    InvalidEntityTag { offset: usize, tag: u8 },
    #[error("descriptor name at offset {offset} is not valid UTF-8")]
    InvalidName { offset: usize },
    #[error("invalid field storage tag {tag} at offset {offset}")]
    InvalidFieldStorage { offset: usize, tag: u8 },
    #[error("unknown opcode 0x{byte:02x} at offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },
    #[error("unknown binary operator {byte} at offset {offset}")]
    UnknownBinOp { offset: usize, byte: u8 },
    #[error("offset {offset} is outside the code region")]
    OutsideCode { offset: u32 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A decoded program image.
#[derive(Debug)]
pub struct Image {
    bytes: Vec<u8>,
    header: Header,
    descriptors: Vec<Descriptor>,
    code_start: usize,
}

impl Image {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ImageError::FileTooSmall(bytes.len()));
        }

        let header = Header::from_bytes(&bytes[..HEADER_SIZE]);

        let mut r = Reader::new(&bytes, HEADER_SIZE);
        let mut descriptors = Vec::with_capacity(header.descriptor_count as usize);
        for _ in 0..header.descriptor_count {
            descriptors.push(Descriptor::decode(&mut r)?);
        }
        let code_start = r.pos();

        Ok(Self {
            bytes,
            header,
            descriptors,
            code_start,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, idx: DescriptorIdx) -> Option<&Descriptor> {
        self.descriptors.get(idx.0 as usize)
    }

    /// Dispatch table width, taken from the first descriptor.
    pub fn selector_count(&self) -> usize {
        self.descriptors
            .first()
            .map_or(0, Descriptor::selector_count)
    }

    /// Offset of the first byte after the descriptor table.
    pub fn code_start(&self) -> u32 {
        self.code_start as u32
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the instruction at an absolute image offset.
    pub fn decode_instruction(&self, offset: u32) -> Result<Instruction, ImageError> {
        let at = offset as usize;
        if at < self.code_start || at >= self.bytes.len() {
            return Err(ImageError::OutsideCode { offset });
        }
        Instruction::decode(&self.bytes, at).map(|(instr, _)| instr)
    }

    /// Walk the code region from start to end.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            bytes: &self.bytes,
            pos: self.code_start,
            failed: false,
        }
    }
}

/// Sequential decoder over the code region, yielding `(offset, instruction)`.
///
/// Stops after the first decoding error.
pub struct Instructions<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl Iterator for Instructions<'_> {
    type Item = Result<(u32, Instruction), ImageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }
        let at = self.pos;
        match Instruction::decode(self.bytes, at) {
            Ok((instr, next)) => {
                self.pos = next;
                Some(Ok((at as u32, instr)))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
