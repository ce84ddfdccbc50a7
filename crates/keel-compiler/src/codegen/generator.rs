//! Append-only byte buffer with deferred references.
//!
//! Code routinely refers to locations that are emitted later in the same
//! forward pass: a callee not yet emitted, a descriptor not yet placed. Such
//! references are written as zeroed placeholders and recorded as relocations.
//! `finish` patches every placeholder once all targets are known.
//!
//! Two kinds of target exist:
//! - [`Label`]: bound to the buffer offset at the time `define_label` runs
//! - [`Relocatable`]: bound to an explicit value (e.g. a descriptor's table index)

use keel_bytecode::{Opcode, Reg, SelectorIdx};

use super::error::EmitError;

/// Symbolic code location.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Label(u32);

/// Symbolic value defined out of line.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Relocatable(u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Target {
    Label(Label),
    Relocatable(Relocatable),
}

impl From<Label> for Target {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

impl From<Relocatable> for Target {
    fn from(r: Relocatable) -> Self {
        Self::Relocatable(r)
    }
}

/// Encoded size of a patched reference.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Width {
    U16,
    U32,
}

impl Width {
    fn bytes(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    fn max(self) -> u64 {
        match self {
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Relocation {
    position: usize,
    target: Target,
    width: Width,
}

#[derive(Debug, Default)]
pub struct Generator {
    code: Vec<u8>,
    labels: Vec<Option<u32>>,
    relocatables: Vec<Option<u64>>,
    relocations: Vec<Relocation>,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_label(&mut self) -> Label {
        let label = Label(self.labels.len() as u32);
        self.labels.push(None);
        label
    }

    pub fn create_relocatable(&mut self) -> Relocatable {
        let r = Relocatable(self.relocatables.len() as u32);
        self.relocatables.push(None);
        r
    }

    /// Bind `label` to the current end of the buffer.
    pub fn define_label(&mut self, label: Label) -> Result<(), EmitError> {
        let offset = self.current_offset()?;
        let slot = &mut self.labels[label.0 as usize];
        if slot.is_some() {
            return Err(EmitError::LabelRedefined(label.0));
        }
        *slot = Some(offset);
        Ok(())
    }

    /// Bind `r` to an explicit value.
    pub fn define_relocatable(&mut self, r: Relocatable, value: u64) -> Result<(), EmitError> {
        let slot = &mut self.relocatables[r.0 as usize];
        if slot.is_some() {
            return Err(EmitError::RelocatableRedefined(r.0));
        }
        *slot = Some(value);
        Ok(())
    }

    /// Offset a label was bound to, if any.
    pub fn label_offset(&self, label: Label) -> Option<u32> {
        self.labels.get(label.0 as usize).copied().flatten()
    }

    pub fn offset(&self) -> usize {
        self.code.len()
    }

    fn current_offset(&self) -> Result<u32, EmitError> {
        u32::try_from(self.code.len()).map_err(|_| EmitError::ImageTooLarge {
            max: u32::MAX as u64,
        })
    }

    pub fn u8(&mut self, value: u8) {
        self.code.push(value);
    }

    pub fn u16(&mut self, value: u16) {
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    pub fn u32(&mut self, value: u32) {
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    pub fn u64(&mut self, value: u64) {
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    /// `u16` byte length followed by UTF-8 bytes.
    pub fn str(&mut self, s: &str) -> Result<(), EmitError> {
        let len = u16::try_from(s.len()).map_err(|_| EmitError::StringTooLong(s.len()))?;
        self.u16(len);
        self.code.extend_from_slice(s.as_bytes());
        Ok(())
    }

    pub fn opcode(&mut self, op: Opcode) {
        self.u8(op as u8);
    }

    pub fn reg(&mut self, reg: Reg) {
        self.u8(reg.0);
    }

    pub fn selector(&mut self, idx: SelectorIdx) {
        self.u16(idx.0);
    }

    /// 32-bit placeholder for the offset `label` is eventually bound to.
    pub fn label(&mut self, label: Label) {
        self.reference(label, Width::U32);
    }

    /// 32-bit placeholder for the value `r` is eventually defined as.
    pub fn relocatable(&mut self, r: Relocatable) {
        self.reference(r, Width::U32);
    }

    pub fn reference(&mut self, target: impl Into<Target>, width: Width) {
        self.relocations.push(Relocation {
            position: self.code.len(),
            target: target.into(),
            width,
        });
        self.code.resize(self.code.len() + width.bytes(), 0);
    }

    /// Patch every recorded reference and return the finished buffer.
    pub fn finish(mut self) -> Result<Vec<u8>, EmitError> {
        self.current_offset()?;

        for reloc in &self.relocations {
            let value = match reloc.target {
                Target::Label(l) => self.labels[l.0 as usize]
                    .map(u64::from)
                    .ok_or(EmitError::UnboundLabel(l.0))?,
                Target::Relocatable(r) => self.relocatables[r.0 as usize]
                    .ok_or(EmitError::UnboundRelocatable(r.0))?,
            };

            if value > reloc.width.max() {
                return Err(EmitError::ValueOutOfRange {
                    value,
                    width: reloc.width.bytes() as u8,
                });
            }

            let at = reloc.position;
            match reloc.width {
                Width::U16 => self.code[at..at + 2].copy_from_slice(&(value as u16).to_le_bytes()),
                Width::U32 => self.code[at..at + 4].copy_from_slice(&(value as u32).to_le_bytes()),
            }
        }

        Ok(self.code)
    }
}
