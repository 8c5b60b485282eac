use crate::core::segment::Segment;
use thiserror::Error;

/// Reasons a list of segments cannot be scheduled
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("segment list is empty")]
    Empty,

    #[error("segment {uuid} has invalid start/end time ({start} - {end}), must span more than 0.1s")]
    TooShort { uuid: String, start: f64, end: f64 },

    #[error("segment {uuid} starts at {start}, not after the previous segment at {previous_start}")]
    OutOfOrder {
        uuid: String,
        start: f64,
        previous_start: f64,
    },
}

/// Validated, time-ordered segments for one playback session
///
/// Starts are strictly increasing and every segment spans more than
/// [`MIN_SEGMENT_DURATION`](crate::core::segment::MIN_SEGMENT_DURATION). The set is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSet {
    segments: Vec<Segment>,
}

impl SegmentSet {
    /// Sort and validate raw segments from a lookup
    ///
    /// Overlapping or duplicate starts are rejected rather than merged, so a
    /// single bad entry makes the whole set unusable.
    pub fn build(mut raw: Vec<Segment>) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Empty);
        }

        if let Some(seg) = raw.iter().find(|seg| !seg.is_valid()) {
            return Err(ValidationError::TooShort {
                uuid: seg.uuid.clone(),
                start: seg.start,
                end: seg.end,
            });
        }

        // All starts are finite at this point
        raw.sort_by(|a, b| a.start.total_cmp(&b.start));

        for pair in raw.windows(2) {
            if pair[1].start <= pair[0].start {
                return Err(ValidationError::OutOfOrder {
                    uuid: pair[1].uuid.clone(),
                    start: pair[1].start,
                    previous_start: pair[0].start,
                });
            }
        }

        Ok(Self { segments: raw })
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Iterate over segments in ascending start order
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }
}

/// Find the next checkpoint: the first segment starting strictly after `position`
///
/// A position exactly on a segment's start counts as already past it.
pub fn select_next(position: f64, segments: &SegmentSet) -> Option<&Segment> {
    segments.iter().find(|seg| seg.start > position)
}
