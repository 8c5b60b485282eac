pub mod segment;
pub mod segment_set;

pub use segment::Segment;
pub use segment_set::{select_next, SegmentSet};

/// Canonical identifier of a piece of content (a YouTube video id)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
