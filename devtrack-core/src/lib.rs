pub mod config;
pub mod error;
pub mod export;
pub mod mis;
pub mod models;
pub mod month;
pub mod phase;
pub mod requests;
pub mod sample;
pub mod stats;
pub mod tracked;
pub mod tracker;

// Re-export commonly used types
pub use config::{determine_data_source, get_config_path, Config, DataSource};
pub use error::{Error, Result};
pub use export::{export_snapshot, load_snapshot, write_snapshot, Snapshot, SnapshotFormat};
pub use mis::{MonthlyReport, MonthlyReportPatch, MonthlyReportStore};
pub use models::{
    ApprovalStatus, DeploymentType, DevelopmentRequest, Document, Environment, FeasibilityStatus,
    FinalStatus, ItemDraft, ItemPatch, ItemStatus, ItemType, Outcome, PhaseEdit, Priority,
    RequestDraft, RequestPatch, Severity, TestStatus, TrackedItem, UatStatus,
};
pub use month::MonthKey;
pub use phase::{classify, phases, ItemPhase, PhaseStatus, Stage};
pub use requests::{RequestFilter, RequestStore};
pub use tracked::{format_size, new_documents, FileInfo, TrackedItemStore};
pub use tracker::Tracker;
