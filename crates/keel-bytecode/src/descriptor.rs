//! Descriptor records: per-entity layout and dispatch tables.
//!
//! Record layout:
//! - `u8` entity tag
//! - `u16` name length, then UTF-8 name bytes
//! - `u16` field count, then one `u8` storage tag per field
//! - `u16` selector count, then one `u32` code offset per selector
//!   (`ABSENT` when the entity does not implement it)

use std::fmt;

use crate::constants::ABSENT;
use crate::ids::SelectorIdx;
use crate::image::ImageError;
use crate::reader::Reader;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum EntityTag {
    Class = 0,
    Interface = 1,
    Primitive = 2,
}

impl EntityTag {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Class),
            1 => Some(Self::Interface),
            2 => Some(Self::Primitive),
            _ => None,
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Primitive => "primitive",
        })
    }
}

/// How a field slot holds its value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum FieldStorage {
    /// Inline scalar (unit, primitives).
    Value = 0,
    /// Pointer to a heap object.
    Reference = 1,
}

impl FieldStorage {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Value),
            1 => Some(Self::Reference),
            _ => None,
        }
    }
}

impl fmt::Display for FieldStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Value => "value",
            Self::Reference => "ref",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    /// Byte offset of the record within the image.
    pub offset: u32,
    pub tag: EntityTag,
    pub name: String,
    pub fields: Vec<FieldStorage>,
    pub dispatch: Vec<u32>,
}

impl Descriptor {
    /// Code offset implementing `selector`, or `None` if absent or out of range.
    pub fn slot(&self, selector: SelectorIdx) -> Option<u32> {
        self.dispatch
            .get(selector.0 as usize)
            .copied()
            .filter(|&offset| offset != ABSENT)
    }

    pub fn selector_count(&self) -> usize {
        self.dispatch.len()
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ImageError> {
        let offset = r.pos();

        let raw_tag = r.u8()?;
        let tag = EntityTag::from_u8(raw_tag).ok_or(ImageError::InvalidEntityTag {
            offset,
            tag: raw_tag,
        })?;

        let name_len = r.u16()? as usize;
        let name_at = r.pos();
        let name = std::str::from_utf8(r.take(name_len)?)
            .map_err(|_| ImageError::InvalidName { offset: name_at })?
            .to_owned();

        let field_count = r.u16()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let at = r.pos();
            let raw = r.u8()?;
            let storage = FieldStorage::from_u8(raw)
                .ok_or(ImageError::InvalidFieldStorage { offset: at, tag: raw })?;
            fields.push(storage);
        }

        let selector_count = r.u16()? as usize;
        let mut dispatch = Vec::with_capacity(selector_count);
        for _ in 0..selector_count {
            dispatch.push(r.u32()?);
        }

        Ok(Self {
            offset: offset as u32,
            tag,
            name,
            fields,
            dispatch,
        })
    }
}
