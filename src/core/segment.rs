use serde::{Deserialize, Serialize};

/// Segments this short (in seconds) or shorter are treated as noise
pub const MIN_SEGMENT_DURATION: f64 = 0.1;

/// A flagged time range inside a media timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start of the range in seconds
    pub start: f64,

    /// End of the range in seconds
    pub end: f64,

    /// Identifier used by the remote API when voting
    pub uuid: String,

    /// Category label (sponsor, intro, ...)
    pub category: String,
}

impl Segment {
    /// Create a new segment
    pub fn new(start: f64, end: f64, uuid: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            start,
            end,
            uuid: uuid.into(),
            category: category.into(),
        }
    }

    /// Length of the segment in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Check if a playback position falls inside the segment
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }

    /// Check if the segment has finite bounds and is long enough to be skipped
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.duration() > MIN_SEGMENT_DURATION
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{:.2}s - {:.2}s] ({})", self.category, self.start, self.end, self.uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_validity() {
        assert!(Segment::new(10.0, 20.0, "a", "sponsor").is_valid());
        assert!(Segment::new(10.0, 10.2, "a", "sponsor").is_valid());
        assert!(!Segment::new(10.0, 10.1, "a", "sponsor").is_valid());
        assert!(!Segment::new(10.0, 9.0, "a", "sponsor").is_valid());
        assert!(!Segment::new(f64::NAN, 9.0, "a", "sponsor").is_valid());
        assert!(!Segment::new(0.0, f64::INFINITY, "a", "sponsor").is_valid());
    }

    #[test]
    fn test_segment_contains() {
        let seg = Segment::new(10.0, 20.0, "a", "sponsor");
        assert!(seg.contains(10.0));
        assert!(seg.contains(19.9));
        assert!(!seg.contains(20.0));
        assert!(!seg.contains(9.9));
    }
}
