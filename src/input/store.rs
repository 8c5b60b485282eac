use crate::api::{ApiError, SegmentProvider, VoteApi};
use crate::core::{ContentId, Segment};
use crate::input::{load_file, SegmentTable};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

/// A vote or view recorded by the local store
#[derive(Debug, Clone, PartialEq)]
pub enum LocalRecord {
    Vote { uuid: String, upvote: bool },
    Viewed { uuid: String },
}

/// Offline segment source backed by a segments file
///
/// Votes and skip reports are kept in memory instead of being sent anywhere.
pub struct LocalSegmentStore {
    table: SegmentTable,
    records: Mutex<Vec<LocalRecord>>,
}

impl LocalSegmentStore {
    pub fn new(table: SegmentTable) -> Self {
        Self {
            table,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Load a CSV or JSON segments file
    pub fn open(path: &str) -> Result<Self> {
        let table = load_file(path)?;
        info!("loaded segments for {} videos from {}", table.len(), path);
        Ok(Self::new(table))
    }

    #[cfg(test)]
    pub fn records(&self) -> Vec<LocalRecord> {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn record(&self, record: LocalRecord) {
        info!("recorded {:?}", record);
        self.records.lock().unwrap_or_else(|p| p.into_inner()).push(record);
    }
}

#[async_trait]
impl SegmentProvider for LocalSegmentStore {
    async fn lookup(&self, content_id: &ContentId) -> Result<Vec<Segment>, ApiError> {
        self.table.get(content_id.as_str()).cloned().ok_or(ApiError::NotFound)
    }
}

#[async_trait]
impl VoteApi for LocalSegmentStore {
    async fn vote(&self, segment: &Segment, upvote: bool) -> Result<(), ApiError> {
        self.record(LocalRecord::Vote {
            uuid: segment.uuid.clone(),
            upvote,
        });
        Ok(())
    }

    async fn viewed(&self, segment: &Segment) -> Result<(), ApiError> {
        self.record(LocalRecord::Viewed {
            uuid: segment.uuid.clone(),
        });
        Ok(())
    }
}
