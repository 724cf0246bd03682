use std::time::Duration;

use serde::Serialize;

use crate::error::DigestError;
use crate::state::{FinalStatus, ItemType, LogEvent};

/// One classified entry with its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestItem {
    #[serde(flatten)]
    pub event: LogEvent,

    /// File content. Only set for included files that were read.
    pub content: Option<String>,

    /// Why the content could not be read, if it could not.
    pub read_error: Option<String>,
}

impl DigestItem {
    pub(crate) fn bare(event: LogEvent) -> Self {
        Self { event, content: None, read_error: None }
    }
}

/// The output of a completed parallel digest.
pub struct Results {
    /// Every classified entry, sorted by path.
    pub items: Vec<DigestItem>,

    /// Counters over `items`.
    pub stats: TraversalStats,

    /// Non-fatal errors met below the root (permission denied, symlink
    /// loops). Entries behind them were skipped, not classified.
    pub errors: Vec<DigestError>,
}

impl Results {
    /// Included items only, in path order.
    pub fn included(&self) -> impl Iterator<Item = &DigestItem> {
        self.items.iter().filter(|item| item.event.is_included())
    }

    /// Look up the item for a root-relative path.
    pub fn get(&self, path: &str) -> Option<&DigestItem> {
        self.items
            .binary_search_by(|item| item.event.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.items[i])
    }
}

/// Counters for a digest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TraversalStats {
    /// Files that ended up included.
    pub included_files: usize,

    /// Files and folders that ended up excluded or in error. Folders that
    /// were descended into without being excluded are not counted.
    pub excluded_items: usize,

    /// Sum of the sizes of included files, in KB.
    pub total_content_size_kb: f64,

    /// Wall-clock time from walk start to the last classified entry.
    pub duration: Duration,
}

impl TraversalStats {
    pub(crate) fn record(&mut self, event: &LogEvent) {
        match (event.status, event.item_type) {
            (FinalStatus::Included, ItemType::File) => {
                self.included_files += 1;
                self.total_content_size_kb += event.size_kb;
            }
            (FinalStatus::Included, ItemType::Folder) => {}
            (FinalStatus::Excluded | FinalStatus::Error, _) => self.excluded_items += 1,
        }
    }

    /// Tally `items` in one pass.
    pub(crate) fn compute(items: &[DigestItem], duration: Duration) -> Self {
        let mut stats = Self::default();
        for item in items {
            stats.record(&item.event);
        }
        stats.duration = duration;
        stats
    }
}
