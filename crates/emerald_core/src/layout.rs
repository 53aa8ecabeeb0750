use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, Result};

pub const IMAGE_LEN: usize = 0x20000;
pub const SAVE_BLOCK_LEN: usize = 0xe000;
pub const SAVE_BLOCK_COUNT: usize = 2;
pub const SLOT_LEN: usize = 0x1000;
pub const SLOTS_PER_BLOCK: usize = 14;

pub const HALL_OF_FAME_OFFSET: usize = 0x1c000;
pub const HALL_OF_FAME_LEN: usize = 0x2000;
pub const MYSTERY_GIFT_OFFSET: usize = 0x1e000;
pub const MYSTERY_GIFT_LEN: usize = 0x1000;
pub const RECORDED_BATTLE_OFFSET: usize = 0x1f000;
pub const RECORDED_BATTLE_LEN: usize = 0x1000;

// Field offsets relative to the start of a slot.
pub const SECTION_ID_OFFSET: usize = 0xff4;
pub const CHECKSUM_OFFSET: usize = 0xff6;
pub const SAVE_INDEX_OFFSET: usize = 0xffc;

pub const MAX_SECTION_ID: u32 = 13;

/// Payload size per section identifier, indexed by id.
const SECTION_PAYLOAD_SIZES: [usize; SLOTS_PER_BLOCK] = [
    3884, // 0
    3968, // 1
    3968, // 2
    3968, // 3
    3948, // 4
    3968, // 5
    3968, // 6
    3968, // 7
    3968, // 8
    3968, // 9
    3968, // 10
    3968, // 11
    3968, // 12
    2000, // 13
];

/// Number of leading slot bytes covered by the checksum for section `id`.
pub fn payload_size(id: u32) -> Result<usize> {
    SECTION_PAYLOAD_SIZES
        .get(id as usize)
        .copied()
        .ok_or(CoreError::InvalidSectionId { id })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionId {
    SaveBlock(u8),
    HallOfFame,
    MysteryGift,
    RecordedBattle,
}

impl RegionId {
    pub fn label(&self) -> String {
        match self {
            Self::SaveBlock(n) => format!("save block {n}"),
            Self::HallOfFame => "hall of fame".to_string(),
            Self::MysteryGift => "mystery gift".to_string(),
            Self::RecordedBattle => "recorded battle".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLayout {
    pub id: RegionId,
    pub range: ByteRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLayout {
    pub file_len: usize,
    pub regions: Vec<RegionLayout>,
}

impl FileLayout {
    /// The fixed five-region layout of a 128 KiB image.
    pub fn gen3() -> Self {
        let region = |id, start, len| RegionLayout {
            id,
            range: ByteRange {
                start,
                end: start + len,
            },
        };

        Self {
            file_len: IMAGE_LEN,
            regions: vec![
                region(RegionId::SaveBlock(0), 0, SAVE_BLOCK_LEN),
                region(RegionId::SaveBlock(1), SAVE_BLOCK_LEN, SAVE_BLOCK_LEN),
                region(RegionId::HallOfFame, HALL_OF_FAME_OFFSET, HALL_OF_FAME_LEN),
                region(RegionId::MysteryGift, MYSTERY_GIFT_OFFSET, MYSTERY_GIFT_LEN),
                region(
                    RegionId::RecordedBattle,
                    RECORDED_BATTLE_OFFSET,
                    RECORDED_BATTLE_LEN,
                ),
            ],
        }
    }

    pub fn region(&self, id: RegionId) -> Option<ByteRange> {
        self.regions.iter().find(|r| r.id == id).map(|r| r.range)
    }

    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.regions.first() else {
            return Err(CoreError::InvalidLayout(
                "file layout must contain at least one region".to_string(),
            ));
        };

        if first.range.start != 0 {
            return Err(CoreError::InvalidLayout(
                "layout does not start at byte 0".to_string(),
            ));
        }

        let mut expected = 0usize;
        for region in &self.regions {
            if region.range.start != expected {
                return Err(CoreError::InvalidLayout(format!(
                    "gap/overlap around {}: expected start {:#x}, got {:#x}",
                    region.id.label(),
                    expected,
                    region.range.start
                )));
            }
            if region.range.end < region.range.start {
                return Err(CoreError::InvalidLayout(format!(
                    "invalid range for {}: {:#x}..{:#x}",
                    region.id.label(),
                    region.range.start,
                    region.range.end
                )));
            }
            expected = region.range.end;
        }

        if expected != self.file_len {
            return Err(CoreError::InvalidLayout(format!(
                "layout does not cover file: ended at {:#x}, file length {:#x}",
                expected, self.file_len
            )));
        }

        Ok(())
    }
}
