use log::{debug, info};

use crate::core_api::{
    BlockOutcome, BlockReport, BlockSummary, Finding, Report, Result, SectionSummary,
};
use crate::image::SaveImage;
use crate::layout::{SLOT_LEN, SLOTS_PER_BLOCK};
use crate::section::{SaveBlock, Section};

/// Compares every slot's save index against slot 0's.
pub fn audit_indices(sections: &[Section<'_>]) -> Vec<Finding> {
    let Some(canonical) = sections.first() else {
        return Vec::new();
    };

    sections
        .iter()
        .filter(|s| s.save_index != canonical.save_index)
        .map(|s| Finding::IndexMismatch {
            block: s.block,
            slot_offset: s.slot_offset,
            identifier: s.id,
            found_index: s.save_index,
            canonical_index: canonical.save_index,
            canonical_identifier: canonical.id,
        })
        .collect()
}

/// Recomputes each section's checksum over its declared payload.
pub fn audit_checksums(sections: &[Section<'_>]) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();
    for s in sections {
        findings.extend(checksum_finding(s, verify(s)?));
    }
    Ok(findings)
}

fn verify(s: &Section<'_>) -> Result<u16> {
    debug!(
        "verifying checksum for section {} of save {} at offset {:x}",
        s.id, s.block, s.slot_offset
    );
    s.computed_checksum()
}

fn checksum_finding(s: &Section<'_>, computed: u16) -> Option<Finding> {
    (computed != s.stored_checksum).then_some(Finding::ChecksumMismatch {
        block: s.block,
        slot_offset: s.slot_offset,
        identifier: s.id,
        computed,
        expected: s.stored_checksum,
    })
}

/// Walks the slots in order and audits every one that resolves. A slot that
/// fails to resolve stops the walk; the slots before it are still audited and
/// their findings kept in the aborted outcome.
pub fn audit_block(block: &SaveBlock<'_>) -> BlockOutcome {
    let mut sections = Vec::with_capacity(SLOTS_PER_BLOCK);
    let mut summaries = Vec::with_capacity(SLOTS_PER_BLOCK);
    let mut failure = None;

    for resolved in block.sections() {
        let checked = resolved.and_then(|s| verify(&s).map(|computed| (s, computed)));
        match checked {
            Ok((s, computed)) => {
                summaries.push(SectionSummary {
                    slot: s.slot,
                    slot_offset: s.slot_offset,
                    identifier: s.id,
                    payload_size: s.payload_size(),
                    stored_checksum: s.stored_checksum,
                    computed_checksum: computed,
                    save_index: s.save_index,
                });
                sections.push(s);
            }
            Err(e) => {
                failure = Some((sections.len() * SLOT_LEN, e));
                break;
            }
        }
    }

    let mut findings = audit_indices(&sections);
    findings.extend(
        sections
            .iter()
            .zip(&summaries)
            .filter_map(|(s, summary)| checksum_finding(s, summary.computed_checksum)),
    );
    findings.sort_by_key(Finding::order_key);

    match failure {
        Some((slot_offset, e)) => BlockOutcome::Aborted {
            code: e.code(),
            message: e.to_string(),
            slot_offset,
            findings,
        },
        None => {
            let (canonical_index, canonical_identifier) = sections
                .first()
                .map(|s| (s.save_index, s.id))
                .unwrap_or_default();
            BlockOutcome::Analyzed(BlockSummary {
                canonical_index,
                canonical_identifier,
                sections: summaries,
                findings,
            })
        }
    }
}

pub fn audit_image(image: &SaveImage<'_>) -> Result<Report> {
    let mut blocks = Vec::new();
    for block in image.blocks()? {
        let outcome = audit_block(&block);
        match &outcome {
            BlockOutcome::Analyzed(summary) => info!(
                "save {}: save index {}, {} finding(s)",
                block.index(),
                summary.canonical_index,
                summary.findings.len()
            ),
            BlockOutcome::Aborted {
                message,
                slot_offset,
                findings,
                ..
            } => info!(
                "save {}: analysis stopped at offset {:x} after {} finding(s): {message}",
                block.index(),
                slot_offset,
                findings.len()
            ),
        }
        blocks.push(BlockReport {
            block: block.index(),
            outcome,
        });
    }

    Ok(Report {
        file_len: image.file_len(),
        trailing_bytes: image.trailing_bytes(),
        blocks,
    })
}
