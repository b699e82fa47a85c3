//! The authoritative collection of development requests.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{DevelopmentRequest, PhaseEdit, Priority, RequestDraft, RequestPatch};
use crate::phase::Stage;

/// Filter for [`RequestStore::list`]. `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Case-insensitive substring matched against title, id and requester
    pub search_term: Option<String>,
    pub priority: Option<Priority>,
    pub stage: Option<Stage>,
}

impl RequestFilter {
    pub fn matches(&self, req: &DevelopmentRequest) -> bool {
        let matches_search = match self.search_term.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                req.title.to_lowercase().contains(&term)
                    || req.id.to_lowercase().contains(&term)
                    || req.requested_by.to_lowercase().contains(&term)
            }
        };
        let matches_priority = self.priority.map_or(true, |p| req.priority == p);
        let matches_stage = self.stage.map_or(true, |s| req.current_stage == s);

        matches_search && matches_priority && matches_stage
    }
}

/// Collection of all development requests
///
/// Ids are drawn from a monotonic counter rather than the collection length,
/// so they stay unique even if records are ever removed or imported out of
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStore {
    requests: Vec<DevelopmentRequest>,
    #[serde(default = "default_next_request_number")]
    next_request_number: u64,
}

/// Default value for next_request_number
fn default_next_request_number() -> u64 {
    1
}

/// Parses the numeric part of a `REQ-###` id.
fn request_number(id: &str) -> Option<u32> {
    id.strip_prefix("REQ-")?.parse().ok()
}

/// Formats the id for the given request number (`REQ-001`).
pub fn format_request_id(number: u64) -> String {
    format!("REQ-{:03}", number)
}

impl RequestStore {
    /// Creates an empty request store
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            next_request_number: 1,
        }
    }

    /// Builds a store from existing records, continuing numbering after the
    /// highest `REQ-###` id present.
    pub fn from_requests(requests: Vec<DevelopmentRequest>) -> Self {
        let highest = requests
            .iter()
            .filter_map(|r| request_number(&r.id))
            .max()
            .unwrap_or(0);
        Self {
            requests,
            // Imported ids parse as u32, so the counter never overflows.
            next_request_number: u64::from(highest) + 1,
        }
    }

    /// Creates a request dated today.
    pub fn create(&mut self, draft: RequestDraft) -> Result<DevelopmentRequest> {
        self.create_on(draft, Local::now().date_naive())
    }

    /// Creates a request, using `today` when the draft has no request date.
    pub fn create_on(&mut self, draft: RequestDraft, today: NaiveDate) -> Result<DevelopmentRequest> {
        if let Err(e) = draft.validate() {
            warn!(error = %e, "rejected new request");
            return Err(e);
        }

        let id = self.next_id();
        let request = DevelopmentRequest::from_draft(id, draft, today);
        info!(id = %request.id, title = %request.title, "created request");

        self.requests.push(request.clone());
        Ok(request)
    }

    /// Shallow-merges `patch` onto the request with `id`.
    pub fn update(&mut self, id: &str, patch: RequestPatch) -> Result<DevelopmentRequest> {
        let request = self
            .get_mut(id)
            .ok_or_else(|| Error::RequestNotFound(id.to_string()))?;
        request.apply(patch);
        debug!(id, stage = %request.current_stage, "updated request");
        Ok(request.clone())
    }

    /// Applies an edit from a single phase editor.
    pub fn apply_phase_edit(&mut self, id: &str, edit: PhaseEdit) -> Result<DevelopmentRequest> {
        debug!(id, phase = %edit.stage(), "applying phase edit");
        self.update(id, edit.into())
    }

    /// Moves the advisory stage. No field completeness is checked.
    pub fn set_stage(&mut self, id: &str, stage: Stage) -> Result<DevelopmentRequest> {
        self.update(id, RequestPatch::stage(stage))
    }

    /// Gets a request by id
    pub fn get(&self, id: &str) -> Option<&DevelopmentRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut DevelopmentRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    /// Requests matching `filter`, in store order
    pub fn list(&self, filter: &RequestFilter) -> Vec<DevelopmentRequest> {
        self.requests
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// All requests, in creation order
    pub fn all(&self) -> &[DevelopmentRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Gets the next id that would be assigned
    pub fn peek_next_id(&self) -> String {
        format_request_id(self.next_request_number)
    }

    fn next_id(&mut self) -> String {
        // Skip numbers already taken by imported records.
        while self.get(&format_request_id(self.next_request_number)).is_some() {
            self.next_request_number += 1;
        }
        let id = format_request_id(self.next_request_number);
        self.next_request_number += 1;
        id
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalDetails, ApprovalStatus, RequirementEdit};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(title: &str) -> RequestDraft {
        RequestDraft {
            title: title.into(),
            requested_by: "x".into(),
            department: "y".into(),
            priority: Priority::Low,
            business_justification: "z".into(),
            related_module: "w".into(),
            request_date: None,
        }
    }

    fn is_req_id(id: &str) -> bool {
        id.len() == 7
            && id.starts_with("REQ-")
            && id[4..].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut store = RequestStore::new();
        let err = store.create(draft("")).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("title"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_assigns_id_and_stage() {
        let mut store = RequestStore::new();
        let req = store.create_on(draft("A"), date(2024, 6, 15)).unwrap();

        assert!(is_req_id(&req.id));
        assert_eq!(req.id, "REQ-001");
        assert_eq!(req.current_stage, Stage::RequirementGathering);
        assert_eq!(req.request_date, date(2024, 6, 15));
        assert_eq!(store.len(), 1);
        assert_eq!(store.peek_next_id(), "REQ-002");
    }

    #[test]
    fn test_create_keeps_supplied_request_date() {
        let mut store = RequestStore::new();
        let mut d = draft("A");
        d.request_date = Some(date(2023, 1, 2));
        let req = store.create_on(d, date(2024, 6, 15)).unwrap();
        assert_eq!(req.request_date, date(2023, 1, 2));
    }

    #[test]
    fn test_create_today_by_default() {
        let mut store = RequestStore::new();
        let before = Local::now().date_naive();
        let req = store.create(draft("A")).unwrap();
        let after = Local::now().date_naive();
        assert!(req.request_date == before || req.request_date == after);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut store = RequestStore::new();
        let a = store.create(draft("A")).unwrap();
        let b = store.create(draft("B")).unwrap();
        assert_eq!(a.id, "REQ-001");
        assert_eq!(b.id, "REQ-002");
    }

    #[test]
    fn test_from_requests_continues_after_highest_id() {
        let mut seed = RequestStore::new();
        seed.create(draft("A")).unwrap();
        let mut records = seed.all().to_vec();
        records[0].id = "REQ-041".into();

        let mut store = RequestStore::from_requests(records);
        let next = store.create(draft("B")).unwrap();
        assert_eq!(next.id, "REQ-042");
    }

    #[test]
    fn test_from_requests_with_largest_id() {
        let mut seed = RequestStore::new();
        seed.create(draft("A")).unwrap();
        let mut records = seed.all().to_vec();
        records[0].id = format!("REQ-{}", u32::MAX);

        let mut store = RequestStore::from_requests(records);
        assert_eq!(store.peek_next_id(), "REQ-4294967296");
        let next = store.create(draft("B")).unwrap();
        assert_eq!(next.id, "REQ-4294967296");
        assert_eq!(store.create(draft("C")).unwrap().id, "REQ-4294967297");
    }

    #[test]
    fn test_update_merges_partial_patch() {
        let mut store = RequestStore::new();
        let req = store.create(draft("A")).unwrap();

        let updated = store
            .update(
                &req.id,
                RequestPatch {
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "A");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(store.get(&req.id).unwrap().priority, Priority::High);
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let mut store = RequestStore::new();
        let err = store.update("REQ-999", RequestPatch::default()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "request not found: REQ-999");
    }

    #[test]
    fn test_phase_edit_and_stage_change() {
        let mut store = RequestStore::new();
        let req = store.create(draft("A")).unwrap();

        store
            .apply_phase_edit(
                &req.id,
                PhaseEdit::Approval(ApprovalDetails {
                    approval_status: Some(ApprovalStatus::Approved),
                    approved_date: Some(date(2024, 6, 20)),
                    ..Default::default()
                }),
            )
            .unwrap();
        store
            .apply_phase_edit(
                &req.id,
                PhaseEdit::RequirementGathering(RequirementEdit {
                    title: Some("A2".into()),
                    ..Default::default()
                }),
            )
            .unwrap();

        // Stage is advisory: jumping ahead is allowed, as is moving back.
        store.set_stage(&req.id, Stage::Deployment).unwrap();
        let moved = store.set_stage(&req.id, Stage::Testing).unwrap();

        assert_eq!(moved.title, "A2");
        assert_eq!(moved.current_stage, Stage::Testing);
        assert_eq!(moved.approval.approval_status, Some(ApprovalStatus::Approved));
        assert_eq!(moved.priority, Priority::Low);
    }

    #[test]
    fn test_list_filters() {
        let mut store = RequestStore::new();
        store.create(draft("Payroll Integration")).unwrap();
        let mut d = draft("Vendor Portal");
        d.requested_by = "Mark Johnson".into();
        d.priority = Priority::High;
        let vendor = store.create(d).unwrap();
        store.set_stage(&vendor.id, Stage::Analysis).unwrap();

        let by_title = store.list(&RequestFilter {
            search_term: Some("PAYROLL".into()),
            ..Default::default()
        });
        assert_eq!(by_title.len(), 1);

        let by_requester = store.list(&RequestFilter {
            search_term: Some("johnson".into()),
            ..Default::default()
        });
        assert_eq!(by_requester[0].id, vendor.id);

        let by_id = store.list(&RequestFilter {
            search_term: Some("req-00".into()),
            ..Default::default()
        });
        assert_eq!(by_id.len(), 2);

        let by_priority = store.list(&RequestFilter {
            priority: Some(Priority::High),
            ..Default::default()
        });
        assert_eq!(by_priority.len(), 1);

        let combined = store.list(&RequestFilter {
            search_term: Some("portal".into()),
            priority: Some(Priority::High),
            stage: Some(Stage::RequirementGathering),
        });
        assert!(combined.is_empty());

        assert_eq!(store.list(&RequestFilter::default()).len(), 2);
    }

    #[test]
    fn test_list_preserves_store_order() {
        let mut store = RequestStore::new();
        for title in ["C", "A", "B"] {
            store.create(draft(title)).unwrap();
        }
        let titles: Vec<String> = store
            .list(&RequestFilter::default())
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
        assert_eq!(store.all()[0].title, "C");
    }
}
