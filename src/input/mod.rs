pub mod csv;
pub mod store;

pub use self::csv::SegmentTable;
pub use store::LocalSegmentStore;

use crate::api::sponsorblock::RawSegment;
use crate::core::Segment;
use anyhow::{Context, Result};
use std::collections::HashMap;

/// Input format detection result
#[derive(Debug, Clone, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
    Unknown,
}

/// Detect the format of a segments file from its first bytes
pub fn detect_format(data: &[u8]) -> InputFormat {
    if is_json(data) {
        return InputFormat::Json;
    }

    if is_csv(data) {
        return InputFormat::Csv;
    }

    InputFormat::Unknown
}

fn is_json(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{')
}

fn is_csv(data: &[u8]) -> bool {
    let sample = &data[..data.len().min(500)];
    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // the cut landed inside a multi-byte character
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default(),
        Err(_) => return false,
    };

    // a header and at least one row with start and end
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .take(2)
        .filter(|line| line.chars().filter(|&c| c == ',').count() >= 2)
        .count()
        == 2
}

/// Parse a JSON map of video id to SponsorBlock segment lists
///
/// `{"dQw4w9WgXcQ": [{"segment": [10.0, 20.0], "UUID": "..."}]}`
pub fn parse_json(data: &[u8]) -> Result<SegmentTable> {
    let raw: HashMap<String, Vec<RawSegment>> = serde_json::from_slice(data).context("Invalid segments JSON")?;
    Ok(raw
        .into_iter()
        .map(|(video, segments)| (video, segments.into_iter().map(Segment::from).collect()))
        .collect())
}

/// Load segments from a file, auto-detecting format
pub fn load_file(path: &str) -> Result<SegmentTable> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    match detect_format(&data) {
        InputFormat::Csv => self::csv::read_csv(data.as_slice()),
        InputFormat::Json => parse_json(&data),
        InputFormat::Unknown => anyhow::bail!("Unknown input format"),
    }
}
