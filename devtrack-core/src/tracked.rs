//! Bug, task and issue tracking for the testing, UAT and post-deployment
//! phases.
//!
//! Items live in buckets keyed by `(request id, phase)`. The store does not
//! check that the request exists; the request id is a plain foreign key.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Document, ItemDraft, ItemPatch, TrackedItem};
use crate::phase::ItemPhase;

/// Owns every tracked item across all requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackedItemStore {
    items: Vec<TrackedItem>,
    /// Last millisecond timestamp handed out, so ids stay unique when two
    /// items are created within the same millisecond.
    #[serde(skip)]
    last_stamp: i64,
}

impl TrackedItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<TrackedItem>) -> Self {
        Self {
            items,
            last_stamp: 0,
        }
    }

    /// Creates an item in the `(request_id, phase)` bucket.
    pub fn create(
        &mut self,
        request_id: &str,
        phase: ItemPhase,
        draft: ItemDraft,
    ) -> Result<TrackedItem> {
        self.create_on(request_id, phase, draft, Local::now().date_naive())
    }

    /// Creates an item, using `today` when the draft has no reported date.
    pub fn create_on(
        &mut self,
        request_id: &str,
        phase: ItemPhase,
        draft: ItemDraft,
        today: NaiveDate,
    ) -> Result<TrackedItem> {
        if let Err(e) = draft.validate() {
            warn!(request_id, %phase, error = %e, "rejected new tracked item");
            return Err(e);
        }

        let item = TrackedItem {
            id: self.next_id(phase),
            request_id: request_id.to_string(),
            item_type: draft.item_type,
            title: draft.title,
            description: draft.description,
            severity: draft.severity,
            status: draft.status,
            assigned_to: draft.assigned_to,
            reported_by: draft.reported_by,
            reported_date: draft.reported_date.unwrap_or(today),
            resolved_date: draft.resolved_date,
            phase,
            documents: draft.documents,
        };
        info!(id = %item.id, request_id, %phase, kind = %item.item_type, "created tracked item");

        self.items.push(item.clone());
        Ok(item)
    }

    /// Shallow-merges `patch` onto the item. The merged item must still have
    /// every required field filled in.
    pub fn update(&mut self, id: &str, patch: ItemPatch) -> Result<TrackedItem> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::ItemNotFound(id.to_string()))?;

        let mut merged = item.clone();
        merged.apply(patch);
        merged.validate()?;

        *item = merged.clone();
        debug!(id, status = %merged.status, "updated tracked item");
        Ok(merged)
    }

    /// Removes the item with `id`. Removing an unknown id is a no-op.
    pub fn delete(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() != before {
            debug!(id, "deleted tracked item");
        }
    }

    /// Appends documents to an item's attachment list, keeping order.
    ///
    /// A document whose id is already held anywhere in the store is given a
    /// fresh `doc-<millis>-0` id first.
    pub fn attach_documents(&mut self, item_id: &str, documents: Vec<Document>) -> Result<TrackedItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;

        let mut accepted: Vec<Document> = Vec::with_capacity(documents.len());
        for mut doc in documents {
            if self.document_id_taken(&doc.id, &accepted) {
                let fresh = self.next_document_id(&accepted);
                debug!(item_id, old = %doc.id, new = %fresh, "re-stamped duplicate document id");
                doc.id = fresh;
            }
            accepted.push(doc);
        }

        debug!(item_id, count = accepted.len(), "attaching documents");
        let item = &mut self.items[index];
        item.documents.extend(accepted);
        Ok(item.clone())
    }

    /// Removes one document from an item. An unknown document id is a no-op.
    pub fn remove_document(&mut self, item_id: &str, document_id: &str) -> Result<TrackedItem> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;
        item.documents.retain(|d| d.id != document_id);
        Ok(item.clone())
    }

    pub fn get(&self, id: &str) -> Option<&TrackedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items in one bucket, in creation order
    pub fn list(&self, request_id: &str, phase: ItemPhase) -> Vec<&TrackedItem> {
        self.items
            .iter()
            .filter(|i| i.request_id == request_id && i.phase == phase)
            .collect()
    }

    /// Every item raised against a request, across phases
    pub fn for_request(&self, request_id: &str) -> Vec<&TrackedItem> {
        self.items
            .iter()
            .filter(|i| i.request_id == request_id)
            .collect()
    }

    /// Number of open or in-progress items for a request
    pub fn open_count(&self, request_id: &str) -> usize {
        self.items
            .iter()
            .filter(|i| i.request_id == request_id && i.status.is_open())
            .count()
    }

    pub fn all(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn next_id(&mut self, phase: ItemPhase) -> String {
        let now = Utc::now().timestamp_millis();
        let mut stamp = now.max(self.last_stamp + 1);
        while self.items.iter().any(|i| i.id == format!("{}-{}", phase.id_prefix(), stamp)) {
            stamp += 1;
        }
        self.last_stamp = stamp;
        format!("{}-{}", phase.id_prefix(), stamp)
    }

    fn document_id_taken(&self, id: &str, pending: &[Document]) -> bool {
        pending.iter().any(|d| d.id == id)
            || self
                .items
                .iter()
                .any(|i| i.documents.iter().any(|d| d.id == id))
    }

    fn next_document_id(&mut self, pending: &[Document]) -> String {
        let now = Utc::now().timestamp_millis();
        let mut stamp = now.max(self.last_stamp + 1);
        while self.document_id_taken(&format!("doc-{}-0", stamp), pending) {
            stamp += 1;
        }
        self.last_stamp = stamp;
        format!("doc-{}-0", stamp)
    }
}

/// A file picked for upload, before it becomes a [`Document`].
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    /// Local reference to the file, if any
    pub url: Option<String>,
}

/// Turns picked files into document records uploaded by `uploaded_by`.
///
/// Ids are `doc-<millis>-<n>` where `n` is the file's position in the batch.
pub fn new_documents(
    uploaded_by: &str,
    files: Vec<FileInfo>,
    today: NaiveDate,
) -> Result<Vec<Document>> {
    let uploaded_by = uploaded_by.trim();
    if uploaded_by.is_empty() {
        return Err(Error::Validation {
            fields: vec!["uploadedBy"],
        });
    }

    let stamp = Utc::now().timestamp_millis();
    Ok(files
        .into_iter()
        .enumerate()
        .map(|(i, file)| Document {
            id: format!("doc-{}-{}", stamp, i),
            name: file.name,
            size: file.size,
            mime_type: file.mime_type,
            uploaded_by: uploaded_by.to_string(),
            uploaded_date: today,
            url: file.url,
        })
        .collect())
}

/// Human-readable file size (`0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Two decimals, trailing zeros dropped.
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemStatus, ItemType, Severity};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(title: &str) -> ItemDraft {
        ItemDraft {
            title: title.into(),
            description: "Steps to reproduce".into(),
            assigned_to: "Bob Martinez".into(),
            reported_by: "Sarah Wilson".into(),
            ..Default::default()
        }
    }

    fn file(name: &str, size: u64) -> FileInfo {
        FileInfo {
            name: name.into(),
            size,
            mime_type: "application/pdf".into(),
            url: None,
        }
    }

    #[test]
    fn test_create_sets_defaults() {
        let mut store = TrackedItemStore::new();
        let item = store
            .create_on("REQ-002", ItemPhase::Testing, draft("Totals wrong"), date(2024, 5, 28))
            .unwrap();

        assert!(item.id.starts_with("testing-"));
        assert_eq!(item.phase, ItemPhase::Testing);
        assert_eq!(item.reported_date, date(2024, 5, 28));
        assert_eq!(item.item_type, ItemType::Bug);
        assert_eq!(item.severity, Severity::Medium);
        assert_eq!(item.status, ItemStatus::Open);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_requires_fields() {
        let mut store = TrackedItemStore::new();
        let mut d = draft("x");
        d.assigned_to = String::new();
        d.reported_by = " ".into();
        let err = store.create("REQ-001", ItemPhase::Uat, d).unwrap_err();
        match err {
            Error::Validation { fields } => assert_eq!(fields, vec!["assignedTo", "reportedBy"]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut store = TrackedItemStore::new();
        let a = store.create("REQ-001", ItemPhase::PostDeployment, draft("a")).unwrap();
        let b = store.create("REQ-001", ItemPhase::PostDeployment, draft("b")).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("post-deployment-"));
    }

    #[test]
    fn test_buckets_are_separate() {
        let mut store = TrackedItemStore::new();
        store.create("REQ-001", ItemPhase::Testing, draft("a")).unwrap();
        store.create("REQ-001", ItemPhase::Uat, draft("b")).unwrap();
        store.create("REQ-002", ItemPhase::Testing, draft("c")).unwrap();

        assert_eq!(store.list("REQ-001", ItemPhase::Testing).len(), 1);
        assert_eq!(store.list("REQ-001", ItemPhase::Uat)[0].title, "b");
        assert_eq!(store.for_request("REQ-001").len(), 2);
        assert!(store.list("REQ-003", ItemPhase::Testing).is_empty());
    }

    #[test]
    fn test_update_merges_and_validates() {
        let mut store = TrackedItemStore::new();
        let item = store.create("REQ-001", ItemPhase::Testing, draft("a")).unwrap();

        let updated = store
            .update(
                &item.id,
                ItemPatch {
                    status: Some(ItemStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, ItemStatus::Resolved);
        assert_eq!(updated.title, "a");

        let err = store
            .update(
                &item.id,
                ItemPatch {
                    title: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        // A rejected update leaves the stored item untouched.
        assert_eq!(store.get(&item.id).unwrap().title, "a");

        assert!(store.update("missing", ItemPatch::default()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let mut store = TrackedItemStore::new();
        store.create("REQ-001", ItemPhase::Testing, draft("a")).unwrap();
        store.create("REQ-001", ItemPhase::Testing, draft("b")).unwrap();
        let before = store.all().to_vec();

        store.delete("nonexistent-id");

        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_delete_removes_item() {
        let mut store = TrackedItemStore::new();
        let a = store.create("REQ-001", ItemPhase::Testing, draft("a")).unwrap();
        store.create("REQ-001", ItemPhase::Testing, draft("b")).unwrap();

        store.delete(&a.id);
        store.delete(&a.id);

        assert_eq!(store.len(), 1);
        assert!(store.get(&a.id).is_none());
    }

    #[test]
    fn test_attach_and_remove_documents() {
        let mut store = TrackedItemStore::new();
        let item = store.create("REQ-001", ItemPhase::Uat, draft("a")).unwrap();
        let today = date(2024, 6, 1);

        let docs = new_documents("Alice", vec![file("log.pdf", 2048), file("log.pdf", 2048)], today).unwrap();
        let updated = store.attach_documents(&item.id, docs.clone()).unwrap();
        assert_eq!(updated.documents.len(), 2);
        assert_eq!(updated.documents[0].id, docs[0].id);

        let more = new_documents("Alice", vec![file("screenshot.png", 10)], today).unwrap();
        let updated = store.attach_documents(&item.id, more).unwrap();
        assert_eq!(updated.documents.len(), 3);
        assert_eq!(updated.documents[2].name, "screenshot.png");

        let updated = store.remove_document(&item.id, &docs[0].id).unwrap();
        assert_eq!(updated.documents.len(), 2);
        let updated = store.remove_document(&item.id, "doc-missing").unwrap();
        assert_eq!(updated.documents.len(), 2);

        assert!(store.attach_documents("missing", Vec::new()).is_err());
    }

    #[test]
    fn test_back_to_back_batches_keep_distinct_ids() {
        let mut store = TrackedItemStore::new();
        let item = store.create("REQ-001", ItemPhase::Testing, draft("a")).unwrap();
        let today = date(2024, 6, 1);

        let first = new_documents("Alice", vec![file("a.txt", 1)], today).unwrap();
        let second = new_documents("Alice", vec![file("b.txt", 2)], today).unwrap();
        store.attach_documents(&item.id, first.clone()).unwrap();
        let updated = store.attach_documents(&item.id, second).unwrap();

        assert_eq!(updated.documents.len(), 2);
        assert_eq!(updated.documents[0].id, first[0].id);
        assert_ne!(updated.documents[0].id, updated.documents[1].id);

        let updated = store.remove_document(&item.id, &first[0].id).unwrap();
        assert_eq!(updated.documents.len(), 1);
        assert_eq!(updated.documents[0].name, "b.txt");
    }

    #[test]
    fn test_document_ids_unique_across_items() {
        let mut store = TrackedItemStore::new();
        let a = store.create("REQ-001", ItemPhase::Uat, draft("a")).unwrap();
        let b = store.create("REQ-002", ItemPhase::Uat, draft("b")).unwrap();
        let docs = new_documents("Alice", vec![file("log.pdf", 10)], date(2024, 6, 1)).unwrap();

        store.attach_documents(&a.id, docs.clone()).unwrap();
        let updated = store.attach_documents(&b.id, docs.clone()).unwrap();
        assert_ne!(updated.documents[0].id, docs[0].id);

        let updated = store.remove_document(&a.id, &docs[0].id).unwrap();
        assert!(updated.documents.is_empty());
        assert_eq!(store.get(&b.id).unwrap().documents.len(), 1);
    }

    #[test]
    fn test_new_documents_requires_uploader() {
        let err = new_documents("  ", vec![file("a.txt", 1)], date(2024, 1, 1)).unwrap_err();
        assert!(err.is_validation());

        let docs = new_documents("Bob", vec![file("a.txt", 1), file("b.txt", 2)], date(2024, 1, 1)).unwrap();
        assert!(docs[0].id.starts_with("doc-"));
        assert!(docs[0].id.ends_with("-0"));
        assert!(docs[1].id.ends_with("-1"));
        assert_eq!(docs[1].uploaded_by, "Bob");
    }

    #[test]
    fn test_open_count() {
        let mut store = TrackedItemStore::new();
        let a = store.create("REQ-001", ItemPhase::Testing, draft("a")).unwrap();
        let mut d = draft("b");
        d.status = ItemStatus::InProgress;
        store.create("REQ-001", ItemPhase::Uat, d).unwrap();
        store.create("REQ-002", ItemPhase::Uat, draft("c")).unwrap();
        assert_eq!(store.open_count("REQ-001"), 2);

        store
            .update(
                &a.id,
                ItemPatch {
                    status: Some(ItemStatus::Closed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.open_count("REQ-001"), 1);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
    }
}
