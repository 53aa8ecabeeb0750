use crate::checksum::compute_checksum;
use crate::core_api::{CoreError, Result};
use crate::layout::{
    CHECKSUM_OFFSET, SAVE_BLOCK_LEN, SAVE_INDEX_OFFSET, SECTION_ID_OFFSET, SLOT_LEN,
    SLOTS_PER_BLOCK, payload_size,
};
use crate::reader::{read_u16_le, read_u32_le};

/// One slot of a save block, viewed through its footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    pub block: u8,
    pub slot: usize,
    /// Offset of the slot within its block.
    pub slot_offset: usize,
    pub id: u32,
    pub payload: &'a [u8],
    pub stored_checksum: u16,
    pub save_index: u32,
}

impl Section<'_> {
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }

    pub fn computed_checksum(&self) -> Result<u16> {
        compute_checksum(self.payload)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SaveBlock<'a> {
    index: u8,
    bytes: &'a [u8],
}

impl<'a> SaveBlock<'a> {
    pub fn new(index: u8, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < SAVE_BLOCK_LEN {
            return Err(CoreError::TruncatedFile {
                len: bytes.len(),
                required: SAVE_BLOCK_LEN,
            });
        }
        Ok(Self {
            index,
            bytes: &bytes[..SAVE_BLOCK_LEN],
        })
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Walks the 14 slots in order. Each call starts over from slot 0.
    pub fn sections(&self) -> SectionIter<'a> {
        SectionIter {
            block: *self,
            slot: 0,
        }
    }

    pub fn section(&self, slot: usize) -> Result<Section<'a>> {
        let slot_offset = slot * SLOT_LEN;
        let slot_bytes = self
            .bytes
            .get(slot_offset..slot_offset + SLOT_LEN)
            .ok_or(CoreError::OutOfBounds {
                offset: slot_offset,
                width: SLOT_LEN,
                len: self.bytes.len(),
            })?;

        let id = u32::from(read_u16_le(slot_bytes, SECTION_ID_OFFSET)?);
        let size = payload_size(id)?;
        let stored_checksum = read_u16_le(slot_bytes, CHECKSUM_OFFSET)?;
        let save_index = read_u32_le(slot_bytes, SAVE_INDEX_OFFSET)?;

        Ok(Section {
            block: self.index,
            slot,
            slot_offset,
            id,
            payload: &slot_bytes[..size],
            stored_checksum,
            save_index,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SectionIter<'a> {
    block: SaveBlock<'a>,
    slot: usize,
}

impl<'a> Iterator for SectionIter<'a> {
    type Item = Result<Section<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.slot >= SLOTS_PER_BLOCK {
            return None;
        }
        let section = self.block.section(self.slot);
        self.slot += 1;
        Some(section)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = SLOTS_PER_BLOCK - self.slot.min(SLOTS_PER_BLOCK);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SectionIter<'_> {}
