//! Monthly operational ("MIS") reports.
//!
//! One [`MonthlyReport`] per calendar month. A month that has never been
//! saved reads as the default report, which is then cached so later reads
//! and saves build on the same value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{labeled_enum, normalize_label};
use crate::month::MonthKey;

labeled_enum! {
    /// Red/amber/green project health
    RagStatus, "project status" {
        Green => "green",
        Amber => "amber",
        Red => "red",
    }
}

impl Default for RagStatus {
    fn default() -> Self {
        RagStatus::Green
    }
}

fn text(s: &str) -> String {
    s.to_string()
}

// -------------------------------------------------------------------------
// IT operations
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// Uptime percentage
    pub uptime: f64,
    pub status: String,
}

impl ServiceHealth {
    fn new(uptime: f64, status: &str) -> Self {
        Self {
            uptime,
            status: text(status),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: i64,
    pub resolved: i64,
    pub pending: i64,
    pub sla_adherence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringIssue {
    pub issue: String,
    pub root_cause: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItOperations {
    pub applications: BTreeMap<String, ServiceHealth>,
    pub infrastructure: BTreeMap<String, ServiceHealth>,
    pub tickets: TicketStats,
    pub recurring_issues: Vec<RecurringIssue>,
}

impl Default for ItOperations {
    fn default() -> Self {
        Self {
            applications: BTreeMap::from([
                (text("erp"), ServiceHealth::new(99.8, "operational")),
                (text("crm"), ServiceHealth::new(99.5, "operational")),
                (text("portal"), ServiceHealth::new(98.9, "maintenance")),
            ]),
            infrastructure: BTreeMap::from([
                (text("servers"), ServiceHealth::new(99.9, "operational")),
                (text("network"), ServiceHealth::new(99.7, "operational")),
                (text("vpn"), ServiceHealth::new(99.2, "operational")),
            ]),
            tickets: TicketStats {
                total: 45,
                resolved: 38,
                pending: 7,
                sla_adherence: 92.0,
            },
            recurring_issues: Vec::new(),
        }
    }
}

// -------------------------------------------------------------------------
// Cybersecurity
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub total: i64,
    pub resolved: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySystem {
    pub status: String,
    pub last_update: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchStatus {
    /// Percentage of machines patched
    pub completion: f64,
    pub pending: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStats {
    pub success: i64,
    pub failure: i64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReview {
    pub department: String,
    pub last_review: String,
    pub findings: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cybersecurity {
    pub incidents: IncidentStats,
    pub systems: BTreeMap<String, SecuritySystem>,
    pub patches: BTreeMap<String, PatchStatus>,
    pub backups: BackupStats,
    pub user_access_reviews: Vec<AccessReview>,
}

impl Default for Cybersecurity {
    fn default() -> Self {
        let system = |status: &str, last_update: &str| SecuritySystem {
            status: text(status),
            last_update: text(last_update),
        };
        let patch = |completion: f64, pending: i64| PatchStatus {
            completion,
            pending,
        };
        Self {
            incidents: IncidentStats {
                total: 2,
                resolved: 2,
                pending: 0,
            },
            systems: BTreeMap::from([
                (text("antivirus"), system("up-to-date", "2024-01-20")),
                (text("firewall"), system("active", "2024-01-18")),
                (text("intrusion"), system("active", "2024-01-19")),
            ]),
            patches: BTreeMap::from([
                (text("os"), patch(95.0, 3)),
                (text("apps"), patch(88.0, 12)),
                (text("firmware"), patch(92.0, 5)),
            ]),
            backups: BackupStats {
                success: 28,
                failure: 2,
                success_rate: 93.0,
            },
            user_access_reviews: Vec::new(),
        }
    }
}

// -------------------------------------------------------------------------
// Projects
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OngoingProject {
    /// `P###`, see [`ProjectsSection::add_ongoing`]
    pub id: String,
    pub name: String,
    pub status: RagStatus,
    /// Percent complete
    pub progress: f64,
    pub department: String,
    pub budget: f64,
    pub timeline: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInitiative {
    pub name: String,
    pub kickoff: String,
    pub department: String,
    pub budget: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDelay {
    pub project: String,
    pub reason: String,
    pub mitigation: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedProject {
    pub name: String,
    pub impact: String,
    pub completion_date: String,
    pub budget: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsSection {
    pub ongoing: Vec<OngoingProject>,
    pub new_initiatives: Vec<NewInitiative>,
    pub delays: Vec<ProjectDelay>,
    pub completed: Vec<CompletedProject>,
}

impl ProjectsSection {
    /// Appends a new ongoing project with green status and zero progress.
    /// The id is one past the highest `P###` already listed. Returns the
    /// assigned id.
    pub fn add_ongoing(&mut self, name: &str, department: &str, budget: f64, timeline: &str) -> String {
        let highest = self
            .ongoing
            .iter()
            .filter_map(|p| p.id.strip_prefix('P')?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let id = format!("P{:03}", highest.saturating_add(1));
        self.ongoing.push(OngoingProject {
            id: id.clone(),
            name: text(name),
            status: RagStatus::Green,
            progress: 0.0,
            department: text(department),
            budget,
            timeline: text(timeline),
        });
        id
    }
}

// -------------------------------------------------------------------------
// System usage
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUsage {
    pub active_users: i64,
    pub total_users: i64,
    /// Percentage of licensed users active this month
    pub usage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUsage {
    pub used: i64,
    pub available: i64,
    pub utilization: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    pub conducted: i64,
    pub planned: i64,
    pub attendees: i64,
    /// Average rating out of 5
    pub feedback: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    pub system: String,
    pub issue: String,
    pub status: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUsage {
    pub applications: BTreeMap<String, AppUsage>,
    pub licenses: BTreeMap<String, LicenseUsage>,
    pub training: TrainingStats,
    pub feedback: Vec<UserFeedback>,
}

impl Default for SystemUsage {
    fn default() -> Self {
        let app = |active_users: i64, total_users: i64, usage: f64| AppUsage {
            active_users,
            total_users,
            usage,
        };
        let license = |used: i64, available: i64, utilization: f64, cost: f64| LicenseUsage {
            used,
            available,
            utilization,
            cost,
        };
        Self {
            applications: BTreeMap::from([
                (text("erp"), app(450, 500, 90.0)),
                (text("crm"), app(280, 320, 87.5)),
                (text("portal"), app(180, 250, 72.0)),
            ]),
            licenses: BTreeMap::from([
                (text("office365"), license(480, 500, 96.0, 15000.0)),
                (text("adobe"), license(25, 30, 83.0, 2500.0)),
                (text("project"), license(15, 20, 75.0, 1200.0)),
            ]),
            training: TrainingStats {
                conducted: 8,
                planned: 12,
                attendees: 145,
                feedback: 4.2,
            },
            feedback: Vec::new(),
        }
    }
}

// -------------------------------------------------------------------------
// Automation
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationInitiative {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub time_saved: String,
    pub cost_saved: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSavings {
    /// Hours saved this month
    pub total_time_saved: f64,
    pub cost_saved: f64,
    /// Number of automated processes
    pub processes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMlProject {
    pub name: String,
    pub status: String,
    pub impact: String,
    pub roi: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSuggestion {
    pub idea: String,
    pub priority: String,
    pub estimated_savings: String,
    pub feasibility: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub initiatives: Vec<AutomationInitiative>,
    pub savings: AutomationSavings,
    pub ai_ml: Vec<AiMlProject>,
    pub suggestions: Vec<AutomationSuggestion>,
}

impl Default for Automation {
    fn default() -> Self {
        Self {
            initiatives: Vec::new(),
            savings: AutomationSavings {
                total_time_saved: 320.0,
                cost_saved: 24000.0,
                processes: 12,
            },
            ai_ml: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

// -------------------------------------------------------------------------
// Budget
// -------------------------------------------------------------------------

/// Where actual spend sits relative to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceState {
    UnderBudget,
    OnBudget,
    OverBudget,
}

impl VarianceState {
    pub fn label(self) -> &'static str {
        match self {
            VarianceState::UnderBudget => "Under Budget",
            VarianceState::OnBudget => "On Budget",
            VarianceState::OverBudget => "Over Budget",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    pub budget: f64,
    pub actual: f64,
    /// Actual minus budget, as entered; not recomputed
    pub variance: f64,
}

impl BudgetLine {
    /// Actual spend as a percentage of budget; 0 when the budget is 0.
    pub fn utilization(&self) -> f64 {
        if self.budget == 0.0 {
            0.0
        } else {
            self.actual / self.budget * 100.0
        }
    }

    pub fn variance_state(&self) -> VarianceState {
        if self.variance < 0.0 {
            VarianceState::UnderBudget
        } else if self.variance > 0.0 {
            VarianceState::OverBudget
        } else {
            VarianceState::OnBudget
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudget {
    pub opex: BudgetLine,
    pub capex: BudgetLine,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorPurchase {
    pub item: String,
    pub amount: f64,
    pub date: String,
    pub status: String,
    pub vendor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub next_month: f64,
    pub next_quarter: f64,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub monthly: MonthlyBudget,
    pub major_purchases: Vec<MajorPurchase>,
    pub forecast: Forecast,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            monthly: MonthlyBudget {
                opex: BudgetLine {
                    budget: 150000.0,
                    actual: 142000.0,
                    variance: -8000.0,
                },
                capex: BudgetLine {
                    budget: 200000.0,
                    actual: 185000.0,
                    variance: -15000.0,
                },
            },
            major_purchases: Vec::new(),
            forecast: Forecast {
                next_month: 320000.0,
                next_quarter: 980000.0,
                risk_factors: Vec::new(),
            },
        }
    }
}

// -------------------------------------------------------------------------
// Risks
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorRisk {
    pub risk: String,
    pub severity: String,
    pub mitigation: String,
    pub owner: String,
    pub due_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub item: String,
    pub depends_on: String,
    pub status: String,
    pub eta: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceItem {
    pub area: String,
    pub status: String,
    pub last_audit: String,
    pub next_review: String,
    pub findings: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risks {
    pub major_risks: Vec<MajorRisk>,
    pub dependencies: Vec<Dependency>,
    pub compliance: Vec<ComplianceItem>,
}

// -------------------------------------------------------------------------
// Roadmap
// -------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedUpgrade {
    pub name: String,
    pub date: String,
    pub impact: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub responsible: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindow {
    pub system: String,
    pub date: String,
    pub duration: String,
    pub window: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    pub program: String,
    pub date: String,
    pub audience: String,
    pub trainer: String,
    pub budget: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementPlan {
    pub item: String,
    pub timeline: String,
    /// Free-form amount as entered, e.g. `$150,000`
    pub budget: String,
    pub status: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub upgrades: Vec<PlannedUpgrade>,
    pub maintenance: Vec<MaintenanceWindow>,
    pub training: Vec<TrainingPlan>,
    pub procurement: Vec<ProcurementPlan>,
}

// -------------------------------------------------------------------------
// Report
// -------------------------------------------------------------------------

/// Operational snapshot for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub it_operations: ItOperations,
    pub cybersecurity: Cybersecurity,
    pub projects: ProjectsSection,
    pub system_usage: SystemUsage,
    pub automation: Automation,
    pub budget: Budget,
    pub risks: Risks,
    pub roadmap: Roadmap,
}

/// Names of the report sections, in display order.
pub const SECTIONS: [&str; 8] = [
    "itOperations",
    "cybersecurity",
    "projects",
    "systemUsage",
    "automation",
    "budget",
    "risks",
    "roadmap",
];

/// Resolves a section name case-insensitively ("it-operations",
/// "IT Operations" and "itOperations" all match).
pub fn section_name(name: &str) -> Result<&'static str> {
    let needle = normalize_label(name);
    SECTIONS
        .iter()
        .copied()
        .find(|s| normalize_label(s) == needle)
        .ok_or_else(|| Error::UnknownValue {
            kind: "report section",
            value: name.to_string(),
        })
}

impl MonthlyReport {
    /// Renders one section as a JSON value, by its camelCase name.
    pub fn section(&self, name: &str) -> Option<serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map.remove(name),
            _ => None,
        }
    }

    /// Renders one section as YAML, for editing.
    pub fn section_yaml(&self, name: &str) -> Result<String> {
        let name = section_name(name)?;
        let value = self.section(name).unwrap_or(serde_json::Value::Null);
        Ok(serde_yaml::to_string(&value)?)
    }
}

/// Sections to replace on save. Absent sections are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReportPatch {
    #[serde(default)]
    pub it_operations: Option<ItOperations>,
    #[serde(default)]
    pub cybersecurity: Option<Cybersecurity>,
    #[serde(default)]
    pub projects: Option<ProjectsSection>,
    #[serde(default)]
    pub system_usage: Option<SystemUsage>,
    #[serde(default)]
    pub automation: Option<Automation>,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub risks: Option<Risks>,
    #[serde(default)]
    pub roadmap: Option<Roadmap>,
}

impl MonthlyReportPatch {
    /// A patch replacing the single section `name` with the given YAML body.
    pub fn from_section_yaml(name: &str, yaml: &str) -> Result<Self> {
        let name = section_name(name)?;
        let body: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let mut wrapper = serde_yaml::Mapping::new();
        wrapper.insert(serde_yaml::Value::String(name.to_string()), body);
        Ok(serde_yaml::from_value(serde_yaml::Value::Mapping(wrapper))?)
    }

    /// Names of the sections this patch replaces
    pub fn sections(&self) -> Vec<&'static str> {
        let present = [
            self.it_operations.is_some(),
            self.cybersecurity.is_some(),
            self.projects.is_some(),
            self.system_usage.is_some(),
            self.automation.is_some(),
            self.budget.is_some(),
            self.risks.is_some(),
            self.roadmap.is_some(),
        ];
        SECTIONS
            .iter()
            .zip(present)
            .filter(|(_, p)| *p)
            .map(|(name, _)| *name)
            .collect()
    }
}

impl MonthlyReport {
    fn merge(&mut self, patch: MonthlyReportPatch) {
        if let Some(section) = patch.it_operations {
            self.it_operations = section;
        }
        if let Some(section) = patch.cybersecurity {
            self.cybersecurity = section;
        }
        if let Some(section) = patch.projects {
            self.projects = section;
        }
        if let Some(section) = patch.system_usage {
            self.system_usage = section;
        }
        if let Some(section) = patch.automation {
            self.automation = section;
        }
        if let Some(section) = patch.budget {
            self.budget = section;
        }
        if let Some(section) = patch.risks {
            self.risks = section;
        }
        if let Some(section) = patch.roadmap {
            self.roadmap = section;
        }
    }
}

/// Month-keyed monthly reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReportStore {
    reports: BTreeMap<MonthKey, MonthlyReport>,
}

impl MonthlyReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reports(reports: BTreeMap<MonthKey, MonthlyReport>) -> Self {
        Self { reports }
    }

    /// The report for `month`, inserting the default report on first read.
    pub fn get(&mut self, month: MonthKey) -> &MonthlyReport {
        self.reports.entry(month).or_insert_with(|| {
            debug!(%month, "no report stored, using defaults");
            MonthlyReport::default()
        })
    }

    /// Read-only lookup; a missing month yields a default report that is not
    /// stored.
    pub fn peek(&self, month: MonthKey) -> MonthlyReport {
        self.reports.get(&month).cloned().unwrap_or_default()
    }

    /// Replaces each section present in `patch`, keeping the others.
    pub fn save(&mut self, month: MonthKey, patch: MonthlyReportPatch) -> MonthlyReport {
        debug!(%month, sections = ?patch.sections(), "saving report");
        let report = self.reports.entry(month).or_default();
        report.merge(patch);
        report.clone()
    }

    /// Stored month keys, oldest first
    pub fn months(&self) -> Vec<MonthKey> {
        self.reports.keys().copied().collect()
    }

    pub fn reports(&self) -> &BTreeMap<MonthKey, MonthlyReport> {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_get_unknown_month_returns_full_default() {
        let mut store = MonthlyReportStore::new();
        let report = store.get(month("2099-01")).clone();

        assert_eq!(report.budget.monthly.opex.budget, 150000.0);
        assert_eq!(report.it_operations.applications.len(), 3);
        assert_eq!(report.it_operations.tickets.total, 45);
        assert_eq!(report.cybersecurity.patches["apps"].pending, 12);
        assert_eq!(report.system_usage.applications["crm"].usage, 87.5);
        assert_eq!(report.automation.savings.processes, 12);
        assert!(report.projects.ongoing.is_empty());
        assert!(report.risks.major_risks.is_empty());

        // Cached on first read
        assert_eq!(store.months(), vec![month("2099-01")]);
    }

    #[test]
    fn test_save_replaces_only_present_sections() {
        let mut store = MonthlyReportStore::new();
        let mut budget = store.get(month("2099-01")).budget.clone();
        budget.monthly.opex.budget = 999.0;

        store.save(
            month("2099-01"),
            MonthlyReportPatch {
                budget: Some(budget),
                ..Default::default()
            },
        );

        let report = store.get(month("2099-01"));
        assert_eq!(report.budget.monthly.opex.budget, 999.0);
        assert_eq!(report.budget.monthly.capex.budget, 200000.0);
        assert_eq!(report.cybersecurity, Cybersecurity::default());
    }

    #[test]
    fn test_save_without_prior_read_starts_from_default() {
        let mut store = MonthlyReportStore::new();
        let saved = store.save(
            month("2024-06"),
            MonthlyReportPatch {
                risks: Some(Risks {
                    major_risks: vec![MajorRisk {
                        risk: "Legacy ERP end of support".into(),
                        severity: "High".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        assert_eq!(saved.risks.major_risks.len(), 1);
        assert_eq!(saved.it_operations, ItOperations::default());
        assert_eq!(store.peek(month("2024-06")), saved);
    }

    #[test]
    fn test_months_are_isolated() {
        let mut store = MonthlyReportStore::new();
        let mut tickets = ItOperations::default();
        tickets.tickets.total = 1;
        store.save(
            month("2024-05"),
            MonthlyReportPatch {
                it_operations: Some(tickets),
                ..Default::default()
            },
        );
        assert_eq!(store.peek(month("2024-06")).it_operations.tickets.total, 45);
        assert_eq!(store.peek(month("2024-05")).it_operations.tickets.total, 1);
        // peek does not cache
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_patch_sections() {
        let patch = MonthlyReportPatch {
            budget: Some(Budget::default()),
            roadmap: Some(Roadmap::default()),
            ..Default::default()
        };
        assert_eq!(patch.sections(), vec!["budget", "roadmap"]);
    }

    #[test]
    fn test_section_lookup_by_name() {
        let report = MonthlyReport::default();
        for name in SECTIONS {
            assert!(report.section(name).is_some(), "missing section {}", name);
        }
        let ops = report.section("itOperations").unwrap();
        assert_eq!(ops["tickets"]["slaAdherence"], 92.0);
        assert!(report.section("payroll").is_none());
    }

    #[test]
    fn test_section_name_is_loose() {
        assert_eq!(section_name("it-operations").unwrap(), "itOperations");
        assert_eq!(section_name("System Usage").unwrap(), "systemUsage");
        assert_eq!(section_name("BUDGET").unwrap(), "budget");
        assert!(matches!(
            section_name("payroll"),
            Err(Error::UnknownValue { kind: "report section", .. })
        ));
    }

    #[test]
    fn test_section_yaml_edit_cycle() {
        let mut store = MonthlyReportStore::new();
        let key = month("2024-06");
        let yaml = store.get(key).section_yaml("budget").unwrap();
        let edited = yaml.replace("150000.0", "175000.0");

        let patch = MonthlyReportPatch::from_section_yaml("budget", &edited).unwrap();
        assert_eq!(patch.sections(), vec!["budget"]);
        let saved = store.save(key, patch);
        assert_eq!(saved.budget.monthly.opex.budget, 175000.0);
        assert_eq!(saved.budget.monthly.capex.budget, 200000.0);
    }

    #[test]
    fn test_section_yaml_rejects_bad_shape() {
        assert!(MonthlyReportPatch::from_section_yaml("budget", "monthly: 3").is_err());
        assert!(MonthlyReportPatch::from_section_yaml("nope", "{}").is_err());
    }

    #[test]
    fn test_budget_line() {
        let opex = Budget::default().monthly.opex;
        assert!((opex.utilization() - 94.666).abs() < 0.01);
        assert_eq!(opex.variance_state(), VarianceState::UnderBudget);

        let over = BudgetLine {
            budget: 100.0,
            actual: 120.0,
            variance: 20.0,
        };
        assert_eq!(over.variance_state(), VarianceState::OverBudget);
        assert_eq!(BudgetLine::default().utilization(), 0.0);
        assert_eq!(BudgetLine::default().variance_state(), VarianceState::OnBudget);
    }

    #[test]
    fn test_add_ongoing_assigns_sequential_ids() {
        let mut projects = ProjectsSection::default();
        let first = projects.add_ongoing("Data Warehouse", "Finance", 50000.0, "Q3 2024");
        let second = projects.add_ongoing("Intranet Refresh", "HR", 12000.0, "Q4 2024");

        assert_eq!(first, "P001");
        assert_eq!(second, "P002");
        assert_eq!(projects.ongoing[1].status, RagStatus::Green);
        assert_eq!(projects.ongoing[1].progress, 0.0);
    }

    #[test]
    fn test_add_ongoing_after_removal_does_not_reuse_id() {
        let mut projects = ProjectsSection::default();
        projects.add_ongoing("A", "IT", 1.0, "Q1");
        projects.add_ongoing("B", "IT", 1.0, "Q1");
        projects.add_ongoing("C", "IT", 1.0, "Q1");
        projects.ongoing.remove(0);

        let id = projects.add_ongoing("D", "IT", 1.0, "Q2");
        assert_eq!(id, "P004");

        let ids: Vec<&str> = projects.ongoing.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P002", "P003", "P004"]);
    }

    #[test]
    fn test_procurement_budget_is_free_text() {
        let yaml = "upgrades: []\nmaintenance: []\ntraining: []\nprocurement:\n  - item: Laptops\n    timeline: Q2 2024\n    budget: $200,000\n    status: Planning\n    priority: high\n";
        let patch = MonthlyReportPatch::from_section_yaml("roadmap", yaml).unwrap();
        let roadmap = patch.roadmap.unwrap();
        assert_eq!(roadmap.procurement[0].budget, "$200,000");
    }

    #[test]
    fn test_rag_status_serde() {
        assert_eq!(serde_json::to_string(&RagStatus::Amber).unwrap(), "\"amber\"");
        assert_eq!("RED".parse::<RagStatus>().unwrap(), RagStatus::Red);
        assert!(serde_json::from_str::<RagStatus>("\"blue\"").is_err());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let json = serde_json::to_value(MonthlyReport::default()).unwrap();
        assert!(json.get("itOperations").is_some());
        assert_eq!(json["systemUsage"]["licenses"]["office365"]["cost"], 15000.0);
        assert_eq!(json["budget"]["forecast"]["nextQuarter"], 980000.0);
    }
}
