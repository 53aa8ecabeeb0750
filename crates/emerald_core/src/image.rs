use crate::core_api::{CoreError, Result};
use crate::layout::{FileLayout, IMAGE_LEN, RegionId, SAVE_BLOCK_COUNT};
use crate::section::SaveBlock;

/// Borrowed view over a whole save image.
#[derive(Debug, Clone, Copy)]
pub struct SaveImage<'a> {
    bytes: &'a [u8],
}

impl<'a> SaveImage<'a> {
    /// Fails with `TruncatedFile` before anything is read if the buffer is
    /// shorter than the fixed image length. Longer buffers are accepted.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < IMAGE_LEN {
            return Err(CoreError::TruncatedFile {
                len: bytes.len(),
                required: IMAGE_LEN,
            });
        }
        Ok(Self { bytes })
    }

    pub fn file_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn trailing_bytes(&self) -> usize {
        self.bytes.len() - IMAGE_LEN
    }

    pub fn region(&self, id: RegionId) -> Option<&'a [u8]> {
        let range = FileLayout::gen3().region(id)?;
        self.bytes.get(range.start..range.end)
    }

    pub fn block(&self, index: u8) -> Result<SaveBlock<'a>> {
        let bytes = self
            .region(RegionId::SaveBlock(index))
            .ok_or_else(|| CoreError::InvalidLayout(format!("no save block with index {index}")))?;
        SaveBlock::new(index, bytes)
    }

    /// Primary then backup.
    pub fn blocks(&self) -> Result<Vec<SaveBlock<'a>>> {
        (0..SAVE_BLOCK_COUNT as u8)
            .map(|index| self.block(index))
            .collect()
    }
}
