use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{blank_fields, Error, Result};
use crate::phase::{ItemPhase, Stage};

/// Declares a closed enumeration whose serialized form is its display label.
///
/// Parsing is case-insensitive and ignores spaces and punctuation, so
/// `"on hold"`, `"On Hold"` and `"on-hold"` all name the same variant.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let needle = $crate::models::normalize_label(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| $crate::models::normalize_label(v.label()) == needle)
                    .ok_or_else(|| $crate::error::Error::UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

pub(crate) use labeled_enum;

pub(crate) fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

labeled_enum! {
    /// Priority of a development request
    Priority, "priority" {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Urgent => "Urgent",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

labeled_enum! {
    /// Outcome of the analysis phase's feasibility check
    FeasibilityStatus, "feasibility status" {
        Yes => "Yes",
        No => "No",
        Partial => "Partial",
    }
}

labeled_enum! {
    ApprovalStatus, "approval status" {
        Approved => "Approved",
        Rejected => "Rejected",
        OnHold => "On Hold",
        Pending => "Pending",
    }
}

labeled_enum! {
    TestStatus, "test status" {
        Pass => "Pass",
        Fail => "Fail",
        Pending => "Pending",
    }
}

labeled_enum! {
    UatStatus, "UAT status" {
        Accepted => "Accepted",
        Rejected => "Rejected",
        ChangesRequired => "Changes Required",
        Pending => "Pending",
    }
}

labeled_enum! {
    DeploymentType, "deployment type" {
        Hotfix => "Hotfix",
        MinorRelease => "Minor Release",
        MajorRelease => "Major Release",
    }
}

labeled_enum! {
    /// Target environment of a deployment
    Environment, "environment" {
        Dev => "Dev",
        Uat => "UAT",
        Prod => "Prod",
    }
}

labeled_enum! {
    Outcome, "outcome" {
        Successful => "Successful",
        IssuesFound => "Issues Found",
        Pending => "Pending",
    }
}

labeled_enum! {
    FinalStatus, "final status" {
        Closed => "Closed",
        PendingRework => "Pending Rework",
    }
}

// =========================================================================
// Phase details
// =========================================================================
//
// Each struct holds exactly the fields one phase editor owns. They are
// flattened into the request record when serialized, and double as their own
// patch type: a `Some` field overwrites, a `None` field is left alone.

/// Fields owned by the analysis phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasibility_status: Option<FeasibilityStatus>,
    /// Estimated effort in person-days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_analyst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impacted_systems: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<String>,
}

/// Fields owned by the approval phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver_comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_allocation: Option<f64>,
}

/// Fields owned by the development phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_developer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_completion_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub development_notes: Option<String>,
}

/// Fields owned by the testing phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestingDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_case_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_completion_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_status: Option<TestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bugs_reported: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rework_needed: Option<bool>,
}

/// Fields owned by the UAT phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UatDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uat_status: Option<UatStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uat_completion_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uat_feedback: Option<String>,
}

/// Fields owned by the deployment phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<DeploymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_plan: Option<bool>,
}

/// Fields owned by the post-deployment (closure) phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_status: Option<FinalStatus>,
}

/// Overwrites `target` with `patch` when the patch value is set.
fn merge_field<T>(target: &mut Option<T>, patch: Option<T>) {
    if patch.is_some() {
        *target = patch;
    }
}

impl AnalysisDetails {
    pub fn merge(&mut self, patch: AnalysisDetails) {
        merge_field(&mut self.requirement_description, patch.requirement_description);
        merge_field(&mut self.feasibility_status, patch.feasibility_status);
        merge_field(&mut self.estimated_effort, patch.estimated_effort);
        merge_field(&mut self.assigned_analyst, patch.assigned_analyst);
        merge_field(&mut self.impacted_systems, patch.impacted_systems);
        merge_field(&mut self.dependencies, patch.dependencies);
    }
}

impl ApprovalDetails {
    pub fn merge(&mut self, patch: ApprovalDetails) {
        merge_field(&mut self.approval_status, patch.approval_status);
        merge_field(&mut self.approved_date, patch.approved_date);
        merge_field(&mut self.approver_comments, patch.approver_comments);
        merge_field(&mut self.budget_allocation, patch.budget_allocation);
    }
}

impl DevelopmentDetails {
    pub fn merge(&mut self, patch: DevelopmentDetails) {
        merge_field(&mut self.assigned_developer, patch.assigned_developer);
        merge_field(&mut self.start_date, patch.start_date);
        merge_field(&mut self.target_completion_date, patch.target_completion_date);
        merge_field(&mut self.development_notes, patch.development_notes);
    }
}

impl TestingDetails {
    pub fn merge(&mut self, patch: TestingDetails) {
        merge_field(&mut self.test_case_reference, patch.test_case_reference);
        merge_field(&mut self.test_start_date, patch.test_start_date);
        merge_field(&mut self.test_completion_date, patch.test_completion_date);
        merge_field(&mut self.test_status, patch.test_status);
        merge_field(&mut self.bugs_reported, patch.bugs_reported);
        merge_field(&mut self.rework_needed, patch.rework_needed);
    }
}

impl UatDetails {
    pub fn merge(&mut self, patch: UatDetails) {
        merge_field(&mut self.uat_status, patch.uat_status);
        merge_field(&mut self.uat_completion_date, patch.uat_completion_date);
        merge_field(&mut self.uat_feedback, patch.uat_feedback);
    }
}

impl DeploymentDetails {
    pub fn merge(&mut self, patch: DeploymentDetails) {
        merge_field(&mut self.deployment_date, patch.deployment_date);
        merge_field(&mut self.deployed_by, patch.deployed_by);
        merge_field(&mut self.deployment_type, patch.deployment_type);
        merge_field(&mut self.environment, patch.environment);
        merge_field(&mut self.rollback_plan, patch.rollback_plan);
    }
}

impl ClosureDetails {
    pub fn merge(&mut self, patch: ClosureDetails) {
        merge_field(&mut self.outcome, patch.outcome);
        merge_field(&mut self.issues, patch.issues);
        merge_field(&mut self.lessons_learned, patch.lessons_learned);
        merge_field(&mut self.close_date, patch.close_date);
        merge_field(&mut self.final_status, patch.final_status);
    }
}

// =========================================================================
// Development request
// =========================================================================

/// A single development request moving through the lifecycle.
///
/// Serialized flat: the phase detail structs are flattened so every field
/// sits at the top level of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentRequest {
    /// Human-friendly id (e.g., "REQ-001"), assigned by the store
    pub id: String,

    /// Short title or summary of the request
    pub title: String,

    pub request_date: NaiveDate,

    pub requested_by: String,

    pub department: String,

    pub priority: Priority,

    pub business_justification: String,

    /// System or module the request affects
    pub related_module: String,

    /// Advisory lifecycle position; not derived from the phase fields
    pub current_stage: Stage,

    #[serde(flatten)]
    pub analysis: AnalysisDetails,

    #[serde(flatten)]
    pub approval: ApprovalDetails,

    #[serde(flatten)]
    pub development: DevelopmentDetails,

    #[serde(flatten)]
    pub testing: TestingDetails,

    #[serde(flatten)]
    pub uat: UatDetails,

    #[serde(flatten)]
    pub deployment: DeploymentDetails,

    #[serde(flatten)]
    pub closure: ClosureDetails,
}

impl DevelopmentRequest {
    /// Builds a fresh record from a validated draft.
    pub(crate) fn from_draft(id: String, draft: RequestDraft, today: NaiveDate) -> Self {
        Self {
            id,
            title: draft.title,
            request_date: draft.request_date.unwrap_or(today),
            requested_by: draft.requested_by,
            department: draft.department,
            priority: draft.priority,
            business_justification: draft.business_justification,
            related_module: draft.related_module,
            current_stage: Stage::RequirementGathering,
            analysis: AnalysisDetails::default(),
            approval: ApprovalDetails::default(),
            development: DevelopmentDetails::default(),
            testing: TestingDetails::default(),
            uat: UatDetails::default(),
            deployment: DeploymentDetails::default(),
            closure: ClosureDetails::default(),
        }
    }

    /// Shallow-merges `patch` onto this record; unset patch fields are left
    /// untouched.
    pub fn apply(&mut self, patch: RequestPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(requested_by) = patch.requested_by {
            self.requested_by = requested_by;
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(justification) = patch.business_justification {
            self.business_justification = justification;
        }
        if let Some(module) = patch.related_module {
            self.related_module = module;
        }
        if let Some(date) = patch.request_date {
            self.request_date = date;
        }
        if let Some(stage) = patch.current_stage {
            self.current_stage = stage;
        }
        self.analysis.merge(patch.analysis);
        self.approval.merge(patch.approval);
        self.development.merge(patch.development);
        self.testing.merge(patch.testing);
        self.uat.merge(patch.uat);
        self.deployment.merge(patch.deployment);
        self.closure.merge(patch.closure);
    }

    /// The date field associated with `stage`, used for monthly activity.
    ///
    /// Requirement gathering and analysis both key off the request date.
    pub fn stage_date(&self, stage: Stage) -> Option<NaiveDate> {
        match stage {
            Stage::RequirementGathering | Stage::Analysis => Some(self.request_date),
            Stage::Approval => self.approval.approved_date,
            Stage::Development => self.development.start_date,
            Stage::Testing => self.testing.test_start_date,
            Stage::Uat => self.uat.uat_completion_date,
            Stage::Deployment => self.deployment.deployment_date,
            Stage::Completed => self.closure.close_date,
        }
    }
}

/// Input to [`crate::requests::RequestStore::create`].
/// `id`, `current_stage` and (by default) `request_date` are set by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub title: String,
    pub requested_by: String,
    pub department: String,
    #[serde(default)]
    pub priority: Priority,
    pub business_justification: String,
    pub related_module: String,
    #[serde(default)]
    pub request_date: Option<NaiveDate>,
}

impl RequestDraft {
    /// Fails with [`Error::Validation`] naming every blank required field.
    pub fn validate(&self) -> Result<()> {
        let fields = blank_fields(&[
            ("title", &self.title),
            ("requestedBy", &self.requested_by),
            ("department", &self.department),
            ("businessJustification", &self.business_justification),
            ("relatedModule", &self.related_module),
        ]);
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { fields })
        }
    }
}

/// A partial update for a request. Every `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPatch {
    pub title: Option<String>,
    pub requested_by: Option<String>,
    pub department: Option<String>,
    pub priority: Option<Priority>,
    pub business_justification: Option<String>,
    pub related_module: Option<String>,
    pub request_date: Option<NaiveDate>,
    pub current_stage: Option<Stage>,
    pub analysis: AnalysisDetails,
    pub approval: ApprovalDetails,
    pub development: DevelopmentDetails,
    pub testing: TestingDetails,
    pub uat: UatDetails,
    pub deployment: DeploymentDetails,
    pub closure: ClosureDetails,
}

impl RequestPatch {
    /// A patch that only moves the advisory stage.
    pub fn stage(stage: Stage) -> Self {
        Self {
            current_stage: Some(stage),
            ..Self::default()
        }
    }
}

/// Requirement-gathering fields editable after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementEdit {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub business_justification: Option<String>,
    pub requested_by: Option<String>,
    pub department: Option<String>,
    pub related_module: Option<String>,
}

/// An edit made from one phase's editor.
///
/// Each variant carries only the fields that phase owns, so a phase editor
/// cannot write another phase's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseEdit {
    RequirementGathering(RequirementEdit),
    Analysis(AnalysisDetails),
    Approval(ApprovalDetails),
    Development(DevelopmentDetails),
    Testing(TestingDetails),
    Uat(UatDetails),
    Deployment(DeploymentDetails),
    Closure(ClosureDetails),
}

impl PhaseEdit {
    /// The stage whose editor produced this edit
    pub fn stage(&self) -> Stage {
        match self {
            PhaseEdit::RequirementGathering(_) => Stage::RequirementGathering,
            PhaseEdit::Analysis(_) => Stage::Analysis,
            PhaseEdit::Approval(_) => Stage::Approval,
            PhaseEdit::Development(_) => Stage::Development,
            PhaseEdit::Testing(_) => Stage::Testing,
            PhaseEdit::Uat(_) => Stage::Uat,
            PhaseEdit::Deployment(_) => Stage::Deployment,
            PhaseEdit::Closure(_) => Stage::Completed,
        }
    }
}

impl From<PhaseEdit> for RequestPatch {
    fn from(edit: PhaseEdit) -> Self {
        let mut patch = RequestPatch::default();
        match edit {
            PhaseEdit::RequirementGathering(basics) => {
                patch.title = basics.title;
                patch.priority = basics.priority;
                patch.business_justification = basics.business_justification;
                patch.requested_by = basics.requested_by;
                patch.department = basics.department;
                patch.related_module = basics.related_module;
            }
            PhaseEdit::Analysis(details) => patch.analysis = details,
            PhaseEdit::Approval(details) => patch.approval = details,
            PhaseEdit::Development(details) => patch.development = details,
            PhaseEdit::Testing(details) => patch.testing = details,
            PhaseEdit::Uat(details) => patch.uat = details,
            PhaseEdit::Deployment(details) => patch.deployment = details,
            PhaseEdit::Closure(details) => patch.closure = details,
        }
        patch
    }
}

// =========================================================================
// Tracked items (bugs, tasks, issues)
// =========================================================================

labeled_enum! {
    ItemType, "item type" {
        Bug => "Bug",
        Task => "Task",
    }
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::Bug
    }
}

labeled_enum! {
    Severity, "severity" {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Critical => "Critical",
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

labeled_enum! {
    ItemStatus, "item status" {
        Open => "Open",
        InProgress => "In Progress",
        Resolved => "Resolved",
        Closed => "Closed",
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Open
    }
}

impl ItemStatus {
    /// Open and in-progress items still need work
    pub fn is_open(self) -> bool {
        matches!(self, ItemStatus::Open | ItemStatus::InProgress)
    }
}

/// Metadata for an attached document. The `url` is a local reference only;
/// no file content is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type, e.g. "application/pdf"
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uploaded_by: String,
    pub uploaded_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A bug, task or issue raised against one phase of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub id: String,
    /// The request this item belongs to
    pub request_id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: ItemStatus,
    pub assigned_to: String,
    pub reported_by: String,
    pub reported_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<NaiveDate>,
    pub phase: ItemPhase,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl TrackedItem {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_item_fields(
            &self.title,
            &self.description,
            &self.assigned_to,
            &self.reported_by,
        )
    }
}

fn validate_item_fields(
    title: &str,
    description: &str,
    assigned_to: &str,
    reported_by: &str,
) -> Result<()> {
    let fields = blank_fields(&[
        ("title", title),
        ("description", description),
        ("assignedTo", assigned_to),
        ("reportedBy", reported_by),
    ]);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation { fields })
    }
}

/// Input to [`crate::tracked::TrackedItemStore::create`].
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub item_type: ItemType,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: ItemStatus,
    pub assigned_to: String,
    pub reported_by: String,
    /// Defaults to today when not supplied
    pub reported_date: Option<NaiveDate>,
    pub resolved_date: Option<NaiveDate>,
    pub documents: Vec<Document>,
}

impl ItemDraft {
    pub fn validate(&self) -> Result<()> {
        validate_item_fields(
            &self.title,
            &self.description,
            &self.assigned_to,
            &self.reported_by,
        )
    }
}

/// A partial update for a tracked item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub item_type: Option<ItemType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<ItemStatus>,
    pub assigned_to: Option<String>,
    pub reported_by: Option<String>,
    pub reported_date: Option<NaiveDate>,
    pub resolved_date: Option<NaiveDate>,
    pub documents: Option<Vec<Document>>,
}

impl TrackedItem {
    /// Shallow-merges `patch`; `id`, `request_id` and `phase` never change.
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(item_type) = patch.item_type {
            self.item_type = item_type;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(reported_by) = patch.reported_by {
            self.reported_by = reported_by;
        }
        if let Some(date) = patch.reported_date {
            self.reported_date = date;
        }
        merge_field(&mut self.resolved_date, patch.resolved_date);
        if let Some(documents) = patch.documents {
            self.documents = documents;
        }
    }
}

impl fmt::Display for TrackedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({}, {})", self.item_type, self.title, self.severity, self.status)
    }
}
