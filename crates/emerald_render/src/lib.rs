use std::fmt::Write as _;

use emerald_core::core_api::{BlockOutcome, BlockReport, BlockSummary, Finding, Report};
use emerald_core::layout::FileLayout;
use serde_json::{Map as JsonMap, Value as JsonValue};

const RULE_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// List every section of each analysed block, not only anomalies.
    pub sections: bool,
}

pub fn render_text(report: &Report) -> String {
    render_text_with_options(report, TextRenderOptions::default())
}

pub fn render_text_with_options(report: &Report, options: TextRenderOptions) -> String {
    let mut out = String::new();

    for block in &report.blocks {
        if options.sections
            && let BlockOutcome::Analyzed(summary) = &block.outcome
        {
            write_section_table(&mut out, block.block, summary);
        }
        match &block.outcome {
            BlockOutcome::Analyzed(summary) => {
                for finding in &summary.findings {
                    writeln!(&mut out, "{}", finding_line(finding))
                        .expect("writing to String cannot fail");
                }
            }
            BlockOutcome::Aborted {
                message,
                slot_offset,
                findings,
                ..
            } => {
                for finding in findings {
                    writeln!(&mut out, "{}", finding_line(finding))
                        .expect("writing to String cannot fail");
                }
                writeln!(
                    &mut out,
                    "Save {} not analyzed: {message} at offset {slot_offset:x}",
                    block.block
                )
                .expect("writing to String cannot fail");
            }
        }
    }

    if report.trailing_bytes > 0 {
        writeln!(
            &mut out,
            "Ignored {} trailing byte(s) past offset {:x}",
            report.trailing_bytes,
            report.file_len - report.trailing_bytes
        )
        .expect("writing to String cannot fail");
    }

    let count = report.anomaly_count();
    writeln!(
        &mut out,
        "{count} {} found",
        if count == 1 { "anomaly" } else { "anomalies" }
    )
    .expect("writing to String cannot fail");
    let newest = report
        .newest_block()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "none".to_string());
    writeln!(&mut out, "Newest intact save: {newest}").expect("writing to String cannot fail");

    out
}

/// One line per finding, carrying block, section id, offset and both values.
pub fn finding_line(finding: &Finding) -> String {
    match *finding {
        Finding::IndexMismatch {
            block,
            slot_offset,
            identifier,
            found_index,
            canonical_index,
            canonical_identifier,
        } => format!(
            "Inconsistent save index {found_index} found in section {identifier} of save {block} \
             at offset {slot_offset:x}. (Canonical index {canonical_index} established from \
             section {canonical_identifier})"
        ),
        Finding::ChecksumMismatch {
            block,
            slot_offset,
            identifier,
            computed,
            expected,
        } => format!(
            "Bad checksum {computed:x} computed for section {identifier} of save {block} \
             at offset {slot_offset:x}. (Expected {expected:x})"
        ),
    }
}

fn write_section_table(out: &mut String, block: u8, summary: &BlockSummary) {
    writeln!(
        out,
        "Save {block} (save index {}, canonical section {})",
        summary.canonical_index, summary.canonical_identifier
    )
    .expect("writing to String cannot fail");
    writeln!(
        out,
        "  {:>4}  {:>6}  {:>2}  {:>4}  {:>6}  {:>8}  {:>10}",
        "slot", "offset", "id", "size", "stored", "computed", "index"
    )
    .expect("writing to String cannot fail");
    writeln!(out, "  {}", "-".repeat(RULE_WIDTH - 2)).expect("writing to String cannot fail");
    for s in &summary.sections {
        let intact = s.stored_checksum == s.computed_checksum
            && s.save_index == summary.canonical_index;
        let mark = if intact { "" } else { " *" };
        writeln!(
            out,
            "  {:>4}  {:>6x}  {:>2}  {:>4}  {:>6x}  {:>8x}  {:>10}{mark}",
            s.slot,
            s.slot_offset,
            s.identifier,
            s.payload_size,
            s.stored_checksum,
            s.computed_checksum,
            s.save_index
        )
        .expect("writing to String cannot fail");
    }
}

pub fn render_json(report: &Report, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(report_json(report)),
    }
}

fn report_json(report: &Report) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert("file_len".to_string(), JsonValue::from(report.file_len));
    out.insert(
        "trailing_bytes".to_string(),
        JsonValue::from(report.trailing_bytes),
    );
    out.insert(
        "anomaly_count".to_string(),
        JsonValue::from(report.anomaly_count()),
    );
    out.insert(
        "newest_block".to_string(),
        match report.newest_block() {
            Some(block) => JsonValue::from(block),
            None => JsonValue::Null,
        },
    );
    out.insert(
        "blocks".to_string(),
        JsonValue::Array(report.blocks.iter().map(block_to_json).collect()),
    );
    out
}

fn block_to_json(block: &BlockReport) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("block".to_string(), JsonValue::from(block.block));
    match &block.outcome {
        BlockOutcome::Analyzed(summary) => {
            out.insert(
                "status".to_string(),
                JsonValue::String("analyzed".to_string()),
            );
            out.insert(
                "canonical_index".to_string(),
                JsonValue::from(summary.canonical_index),
            );
            out.insert(
                "canonical_identifier".to_string(),
                JsonValue::from(summary.canonical_identifier),
            );
            out.insert(
                "sections".to_string(),
                JsonValue::Array(
                    summary
                        .sections
                        .iter()
                        .map(|s| {
                            let mut m = JsonMap::new();
                            m.insert("slot".to_string(), JsonValue::from(s.slot));
                            m.insert("offset".to_string(), JsonValue::from(s.slot_offset));
                            m.insert("id".to_string(), JsonValue::from(s.identifier));
                            m.insert("size".to_string(), JsonValue::from(s.payload_size));
                            m.insert(
                                "stored_checksum".to_string(),
                                JsonValue::from(s.stored_checksum),
                            );
                            m.insert(
                                "computed_checksum".to_string(),
                                JsonValue::from(s.computed_checksum),
                            );
                            m.insert("save_index".to_string(), JsonValue::from(s.save_index));
                            JsonValue::Object(m)
                        })
                        .collect(),
                ),
            );
            out.insert(
                "findings".to_string(),
                JsonValue::Array(summary.findings.iter().map(finding_to_json).collect()),
            );
        }
        BlockOutcome::Aborted {
            code,
            message,
            slot_offset,
            findings,
        } => {
            out.insert(
                "status".to_string(),
                JsonValue::String("aborted".to_string()),
            );
            out.insert(
                "error_code".to_string(),
                JsonValue::String(format!("{code:?}")),
            );
            out.insert("error".to_string(), JsonValue::String(message.clone()));
            out.insert("offset".to_string(), JsonValue::from(*slot_offset));
            out.insert(
                "findings".to_string(),
                JsonValue::Array(findings.iter().map(finding_to_json).collect()),
            );
        }
    }
    JsonValue::Object(out)
}

fn finding_to_json(finding: &Finding) -> JsonValue {
    let mut out = JsonMap::new();
    match *finding {
        Finding::IndexMismatch {
            block,
            slot_offset,
            identifier,
            found_index,
            canonical_index,
            canonical_identifier,
        } => {
            out.insert(
                "kind".to_string(),
                JsonValue::String("index_mismatch".to_string()),
            );
            out.insert("block".to_string(), JsonValue::from(block));
            out.insert("offset".to_string(), JsonValue::from(slot_offset));
            out.insert("id".to_string(), JsonValue::from(identifier));
            out.insert("found_index".to_string(), JsonValue::from(found_index));
            out.insert(
                "canonical_index".to_string(),
                JsonValue::from(canonical_index),
            );
            out.insert(
                "canonical_id".to_string(),
                JsonValue::from(canonical_identifier),
            );
        }
        Finding::ChecksumMismatch {
            block,
            slot_offset,
            identifier,
            computed,
            expected,
        } => {
            out.insert(
                "kind".to_string(),
                JsonValue::String("checksum_mismatch".to_string()),
            );
            out.insert("block".to_string(), JsonValue::from(block));
            out.insert("offset".to_string(), JsonValue::from(slot_offset));
            out.insert("id".to_string(), JsonValue::from(identifier));
            out.insert("computed".to_string(), JsonValue::from(computed));
            out.insert("expected".to_string(), JsonValue::from(expected));
        }
    }
    JsonValue::Object(out)
}

pub fn render_layout_text(layout: &FileLayout) -> String {
    let mut out = String::new();
    writeln!(&mut out, "{:<18}{:>10}{:>10}", "region", "offset", "length")
        .expect("writing to String cannot fail");
    for region in &layout.regions {
        writeln!(
            &mut out,
            "{:<18}{:>#10x}{:>#10x}",
            region.id.label(),
            region.range.start,
            region.range.len()
        )
        .expect("writing to String cannot fail");
    }
    writeln!(&mut out, "{:<18}{:>#10x}", "total", layout.file_len)
        .expect("writing to String cannot fail");
    out
}

pub fn render_layout_json(layout: &FileLayout) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("file_len".to_string(), JsonValue::from(layout.file_len));
    out.insert(
        "validation_ok".to_string(),
        JsonValue::Bool(layout.validate().is_ok()),
    );
    out.insert(
        "regions".to_string(),
        JsonValue::Array(
            layout
                .regions
                .iter()
                .map(|r| {
                    let mut m = JsonMap::new();
                    m.insert("id".to_string(), JsonValue::String(r.id.label()));
                    m.insert("start".to_string(), JsonValue::from(r.range.start));
                    m.insert("end".to_string(), JsonValue::from(r.range.end));
                    m.insert("len".to_string(), JsonValue::from(r.range.len()));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    JsonValue::Object(out)
}
