use serde::{Deserialize, Serialize};

use super::error::CoreErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    IndexMismatch {
        block: u8,
        slot_offset: usize,
        identifier: u32,
        found_index: u32,
        canonical_index: u32,
        canonical_identifier: u32,
    },
    ChecksumMismatch {
        block: u8,
        slot_offset: usize,
        identifier: u32,
        computed: u16,
        expected: u16,
    },
}

impl Finding {
    pub fn block(&self) -> u8 {
        match self {
            Self::IndexMismatch { block, .. } | Self::ChecksumMismatch { block, .. } => *block,
        }
    }

    pub fn slot_offset(&self) -> usize {
        match self {
            Self::IndexMismatch { slot_offset, .. }
            | Self::ChecksumMismatch { slot_offset, .. } => *slot_offset,
        }
    }

    pub fn identifier(&self) -> u32 {
        match self {
            Self::IndexMismatch { identifier, .. } | Self::ChecksumMismatch { identifier, .. } => {
                *identifier
            }
        }
    }

    /// Sort key within a block: slot first, then index audit before checksum audit.
    pub fn order_key(&self) -> (u8, usize, u8) {
        let kind = match self {
            Self::IndexMismatch { .. } => 0,
            Self::ChecksumMismatch { .. } => 1,
        };
        (self.block(), self.slot_offset(), kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionSummary {
    pub slot: usize,
    pub slot_offset: usize,
    pub identifier: u32,
    pub payload_size: usize,
    pub stored_checksum: u16,
    pub computed_checksum: u16,
    pub save_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub canonical_index: u32,
    pub canonical_identifier: u32,
    pub sections: Vec<SectionSummary>,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlockOutcome {
    Analyzed(BlockSummary),
    /// Stopped at `slot_offset`; `findings` cover the slots before it.
    Aborted {
        code: CoreErrorCode,
        message: String,
        slot_offset: usize,
        findings: Vec<Finding>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReport {
    pub block: u8,
    pub outcome: BlockOutcome,
}

impl BlockReport {
    pub fn findings(&self) -> &[Finding] {
        match &self.outcome {
            BlockOutcome::Analyzed(summary) => &summary.findings,
            BlockOutcome::Aborted { findings, .. } => findings,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(&self.outcome, BlockOutcome::Analyzed(summary) if summary.findings.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub file_len: usize,
    pub trailing_bytes: usize,
    pub blocks: Vec<BlockReport>,
}

impl Report {
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.blocks.iter().flat_map(|b| b.findings().iter())
    }

    pub fn aborted_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.outcome, BlockOutcome::Aborted { .. }))
            .count()
    }

    pub fn anomaly_count(&self) -> usize {
        self.findings().count() + self.aborted_blocks()
    }

    pub fn has_anomalies(&self) -> bool {
        self.anomaly_count() > 0
    }

    /// The clean block with the highest save index, i.e. the one a loader
    /// would pick. Ties go to the lower block number.
    pub fn newest_block(&self) -> Option<u8> {
        self.blocks
            .iter()
            .filter_map(|b| match &b.outcome {
                BlockOutcome::Analyzed(summary) if summary.findings.is_empty() => {
                    Some((b.block, summary.canonical_index))
                }
                _ => None,
            })
            .fold(None, |best: Option<(u8, u32)>, (block, index)| match best {
                Some((_, best_index)) if best_index >= index => best,
                _ => Some((block, index)),
            })
            .map(|(block, _)| block)
    }
}
