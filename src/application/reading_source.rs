// Source trait for remote sensor readings
use crate::domain::connection::ConnectionConfig;
use crate::domain::error::AcquisitionError;
use crate::domain::reading::SourceRow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Rows per request during a backfill.
pub const PAGE_SIZE: usize = 1000;

/// How the lower time bound of a query is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `timestamp >= since`
    Inclusive,
    /// `timestamp > since`
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

/// One request against the source, always ordered by ascending timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingQuery {
    pub since: DateTime<Utc>,
    pub bound: Bound,
    pub page: Option<Page>,
}

impl ReadingQuery {
    /// Backfill page starting at `since` (inclusive).
    pub fn backfill(since: DateTime<Utc>, offset: usize) -> Self {
        Self {
            since,
            bound: Bound::Inclusive,
            page: Some(Page {
                limit: PAGE_SIZE,
                offset,
            }),
        }
    }

    /// Everything strictly newer than `after`, unpaginated.
    pub fn newer_than(after: DateTime<Utc>) -> Self {
        Self {
            since: after,
            bound: Bound::Exclusive,
            page: None,
        }
    }
}

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch the rows matching `query` for the sensor named in `config`.
    async fn fetch(
        &self,
        config: &ConnectionConfig,
        query: &ReadingQuery,
    ) -> Result<Vec<SourceRow>, AcquisitionError>;
}
