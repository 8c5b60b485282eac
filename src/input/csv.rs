use crate::core::Segment;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;

/// Segments grouped by video id
pub type SegmentTable = HashMap<String, Vec<Segment>>;

/// Read segments from CSV data
///
/// Supports flexible column formats:
/// - video_id,start,end
/// - video,start_time,end_time,category,uuid
/// - id,from,to,type
///
/// Times are seconds from the start of the video. Rows without a uuid get a
/// generated local one.
pub fn read_csv<R: Read>(reader: R) -> Result<SegmentTable> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = detect_columns(&headers)?;

    let mut table = SegmentTable::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.context("Failed to read CSV row")?;

        let video_id = record.get(columns.video).context("Missing video column")?.trim().to_string();
        let start = parse_seconds(record.get(columns.start)).with_context(|| format!("Bad start time in row {}", row + 1))?;
        let end = parse_seconds(record.get(columns.end)).with_context(|| format!("Bad end time in row {}", row + 1))?;

        let category = columns
            .category
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("sponsor")
            .to_string();

        let uuid = columns
            .uuid
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("local-{}-{}", video_id, row));

        table.entry(video_id).or_default().push(Segment::new(start, end, uuid, category));
    }

    Ok(table)
}

fn parse_seconds(field: Option<&str>) -> Result<f64> {
    let text = field.context("Missing time column")?.trim();
    text.parse::<f64>().with_context(|| format!("Invalid number {:?}", text))
}

struct Columns {
    video: usize,
    start: usize,
    end: usize,
    category: Option<usize>,
    uuid: Option<usize>,
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<Columns> {
    Ok(Columns {
        video: find_column(headers, &["video_id", "videoid", "video", "id"])?,
        start: find_column(headers, &["start", "start_time", "from", "begin"])?,
        end: find_column(headers, &["end", "end_time", "to", "stop"])?,
        category: find_column(headers, &["category", "type", "kind"]).ok(),
        uuid: find_column(headers, &["uuid", "segment_id"]).ok(),
    })
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Result<usize> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.trim().to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    anyhow::bail!("Could not find column with names: {:?}", names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_groups_by_video() {
        let data = "video_id,start,end,category,uuid\n\
                    dQw4w9WgXcQ,10,20,sponsor,abc\n\
                    dQw4w9WgXcQ,50.5,60,intro,\n\
                    aaaaaaaaaaa,1,2,,\n";
        let table = read_csv(data.as_bytes()).unwrap();

        let first = &table["dQw4w9WgXcQ"];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0], Segment::new(10.0, 20.0, "abc", "sponsor"));
        assert_eq!(first[1].start, 50.5);
        assert_eq!(first[1].category, "intro");
        assert_eq!(first[1].uuid, "local-dQw4w9WgXcQ-1");

        assert_eq!(table["aaaaaaaaaaa"][0].category, "sponsor");
    }

    #[test]
    fn test_read_csv_alternate_headers() {
        let data = "Video, From, To\nxyz,5,9\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table["xyz"][0].start, 5.0);
        assert_eq!(table["xyz"][0].end, 9.0);
    }

    #[test]
    fn test_read_csv_errors() {
        assert!(read_csv("video,begin\nx,1\n".as_bytes()).is_err());
        assert!(read_csv("video,start,end\nx,one,2\n".as_bytes()).is_err());
    }
}
