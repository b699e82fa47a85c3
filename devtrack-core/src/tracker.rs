//! The explicit application state handed to whatever drives the UI.

use crate::error::Result;
use crate::export::Snapshot;
use crate::mis::MonthlyReportStore;
use crate::requests::RequestStore;
use crate::sample::sample_requests;
use crate::tracked::TrackedItemStore;

/// Bundles the request, tracked-item and monthly-report stores.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    pub requests: RequestStore,
    pub items: TrackedItemStore,
    pub reports: MonthlyReportStore,
}

impl Tracker {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker preloaded with the demonstration requests.
    pub fn with_sample_data() -> Result<Self> {
        Ok(Self {
            requests: RequestStore::from_requests(sample_requests()?),
            ..Self::default()
        })
    }

    /// Rebuilds every store from a snapshot. The request counter continues
    /// after the highest imported id.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            requests: RequestStore::from_requests(snapshot.requests),
            items: TrackedItemStore::from_items(snapshot.tracked_items),
            reports: MonthlyReportStore::from_reports(snapshot.reports),
        }
    }

    /// Copies the current state into a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            requests: self.requests.all().to_vec(),
            tracked_items: self.items.all().to_vec(),
            reports: self.reports.reports().clone(),
        }
    }
}
