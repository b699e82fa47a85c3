use anyhow::{Context, Result};
use chrono::NaiveDate;
use inquire::{Confirm, Select, Text};
use std::fmt;
use std::fs;
use std::path::Path;

use devtrack_core::models::{
    AnalysisDetails, ApprovalDetails, ClosureDetails, DeploymentDetails, DevelopmentDetails,
    RequirementEdit, TestingDetails, UatDetails,
};
use devtrack_core::{
    ApprovalStatus, DeploymentType, DevelopmentRequest, Environment, FeasibilityStatus, FileInfo,
    FinalStatus, ItemDraft, ItemPatch, ItemPhase, ItemStatus, ItemType, MonthKey, Outcome,
    PhaseEdit, Priority, RequestDraft, RequestFilter, Severity, Stage, TestStatus, TrackedItem,
    UatStatus,
};

/// A select option that either keeps the current value or sets a new one.
#[derive(Clone, Copy)]
enum Choice<T> {
    Keep,
    Set(T),
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Keep => write!(f, "(keep current)"),
            Choice::Set(value) => write!(f, "{}", value),
        }
    }
}

/// Text prompt pre-filled with `current`. Returns `None` when left blank or
/// unchanged.
fn optional_text(label: &str, current: Option<&str>) -> Result<Option<String>> {
    let input = Text::new(label)
        .with_initial_value(current.unwrap_or(""))
        .prompt()?;
    let input = input.trim();
    if input.is_empty() || Some(input) == current {
        Ok(None)
    } else {
        Ok(Some(input.to_string()))
    }
}

fn optional_date(label: &str, current: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    let prompt = format!("{} (YYYY-MM-DD):", label);
    let initial = current.map(|d| d.to_string()).unwrap_or_default();
    let input = Text::new(&prompt).with_initial_value(&initial).prompt()?;
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", input))?;
    Ok((Some(date) != current).then_some(date))
}

fn optional_number(label: &str, current: Option<f64>) -> Result<Option<f64>> {
    let initial = current.map(|n| n.to_string()).unwrap_or_default();
    let input = Text::new(label).with_initial_value(&initial).prompt()?;
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let number: f64 = input
        .parse()
        .with_context(|| format!("Invalid number '{}'", input))?;
    Ok((Some(number) != current).then_some(number))
}

fn optional_choice<T>(label: &str, options: &[T], current: Option<T>) -> Result<Option<T>>
where
    T: Copy + PartialEq + fmt::Display,
{
    let mut choices = vec![Choice::Keep];
    choices.extend(options.iter().map(|&o| Choice::Set(o)));
    let label = match current {
        Some(value) => format!("{} [{}]", label, value),
        None => label.to_string(),
    };

    match Select::new(&label, choices).prompt()? {
        Choice::Keep => Ok(None),
        Choice::Set(value) if Some(value) == current => Ok(None),
        Choice::Set(value) => Ok(Some(value)),
    }
}

/// Select over `options` with a leading "All" entry, which yields `None`.
fn filter_choice<T>(label: &str, options: &[T]) -> Result<Option<T>>
where
    T: Copy + fmt::Display,
{
    let index = Select::new(label, filter_labels(options)).raw_prompt()?.index;
    Ok(filter_pick(options, index))
}

fn filter_labels<T: fmt::Display>(options: &[T]) -> Vec<String> {
    let mut labels = vec!["All".to_string()];
    labels.extend(options.iter().map(|o| o.to_string()));
    labels
}

fn filter_pick<T: Copy>(options: &[T], index: usize) -> Option<T> {
    index.checked_sub(1).and_then(|i| options.get(i).copied())
}

fn optional_flag(label: &str, current: Option<bool>) -> Result<Option<bool>> {
    let answer = Confirm::new(label)
        .with_default(current.unwrap_or(false))
        .prompt()?;
    Ok((Some(answer) != current).then_some(answer))
}

fn required_text(label: &str, default: Option<&str>) -> Result<String> {
    let mut prompt = Text::new(label);
    if let Some(default) = default {
        prompt = prompt.with_default(default);
    }
    Ok(prompt.prompt()?.trim().to_string())
}

/// Prompts for the search term and the priority and stage filters.
pub fn prompt_request_filter() -> Result<RequestFilter> {
    let search = Text::new("Search (blank for all):").prompt()?;
    let search = search.trim();
    Ok(RequestFilter {
        search_term: (!search.is_empty()).then(|| search.to_string()),
        priority: filter_choice("Priority:", Priority::ALL)?,
        stage: filter_choice("Stage:", &Stage::ALL)?,
    })
}

/// Prompts the user for a new development request
pub fn prompt_new_request(default_requester: Option<&str>) -> Result<RequestDraft> {
    let title = required_text("Title:", None)?;
    let requested_by = required_text("Requested by:", default_requester)?;
    let department = required_text("Department:", None)?;
    let priority = Select::new("Priority:", Priority::ALL.to_vec())
        .with_starting_cursor(1)
        .prompt()?;
    let related_module = required_text("Related module:", None)?;
    let business_justification = inquire::Editor::new("Business justification:").prompt()?;

    Ok(RequestDraft {
        title,
        requested_by,
        department,
        priority,
        business_justification: business_justification.trim().to_string(),
        related_module,
        request_date: None,
    })
}

/// Prompts the user to select a request from a list, returning its id
pub fn prompt_select_request(requests: &[DevelopmentRequest]) -> Result<String> {
    if requests.is_empty() {
        anyhow::bail!("No requests available");
    }
    let options: Vec<String> = requests
        .iter()
        .map(|r| format!("{} - {} ({})", r.id, r.title, r.current_stage))
        .collect();

    let selection = Select::new("Select a request:", options).prompt()?;
    let id = selection
        .split(" - ")
        .next()
        .context("Unexpected request selection")?;

    Ok(id.to_string())
}

pub fn prompt_select_stage(label: &str, current: Stage) -> Result<Stage> {
    Ok(Select::new(label, Stage::ALL.to_vec())
        .with_starting_cursor(current.index())
        .prompt()?)
}

pub fn prompt_select_item_phase() -> Result<ItemPhase> {
    Ok(Select::new("Phase:", ItemPhase::ALL.to_vec()).prompt()?)
}

/// Prompts for the fields owned by the editor of `stage`, pre-filled from
/// the request.
pub fn prompt_phase_edit(stage: Stage, req: &DevelopmentRequest) -> Result<PhaseEdit> {
    let edit = match stage {
        Stage::RequirementGathering => PhaseEdit::RequirementGathering(RequirementEdit {
            title: optional_text("Title:", Some(&req.title))?,
            priority: optional_choice("Priority:", Priority::ALL, Some(req.priority))?,
            business_justification: optional_text(
                "Business justification:",
                Some(&req.business_justification),
            )?,
            requested_by: optional_text("Requested by:", Some(&req.requested_by))?,
            department: optional_text("Department:", Some(&req.department))?,
            related_module: optional_text("Related module:", Some(&req.related_module))?,
        }),
        Stage::Analysis => {
            let a = &req.analysis;
            PhaseEdit::Analysis(AnalysisDetails {
                requirement_description: optional_text(
                    "Requirement description:",
                    a.requirement_description.as_deref(),
                )?,
                feasibility_status: optional_choice(
                    "Feasibility:",
                    FeasibilityStatus::ALL,
                    a.feasibility_status,
                )?,
                estimated_effort: optional_number(
                    "Estimated effort (person-days):",
                    a.estimated_effort,
                )?,
                assigned_analyst: optional_text("Assigned analyst:", a.assigned_analyst.as_deref())?,
                impacted_systems: optional_text("Impacted systems:", a.impacted_systems.as_deref())?,
                dependencies: optional_text("Dependencies:", a.dependencies.as_deref())?,
            })
        }
        Stage::Approval => {
            let p = &req.approval;
            PhaseEdit::Approval(ApprovalDetails {
                approval_status: optional_choice(
                    "Approval status:",
                    ApprovalStatus::ALL,
                    p.approval_status,
                )?,
                approved_date: optional_date("Approved date", p.approved_date)?,
                approver_comments: optional_text(
                    "Approver comments:",
                    p.approver_comments.as_deref(),
                )?,
                budget_allocation: optional_number("Budget allocation:", p.budget_allocation)?,
            })
        }
        Stage::Development => {
            let d = &req.development;
            PhaseEdit::Development(DevelopmentDetails {
                assigned_developer: optional_text(
                    "Assigned developer:",
                    d.assigned_developer.as_deref(),
                )?,
                start_date: optional_date("Start date", d.start_date)?,
                target_completion_date: optional_date(
                    "Target completion date",
                    d.target_completion_date,
                )?,
                development_notes: optional_text(
                    "Development notes:",
                    d.development_notes.as_deref(),
                )?,
            })
        }
        Stage::Testing => {
            let t = &req.testing;
            PhaseEdit::Testing(TestingDetails {
                test_case_reference: optional_text(
                    "Test case reference:",
                    t.test_case_reference.as_deref(),
                )?,
                test_start_date: optional_date("Test start date", t.test_start_date)?,
                test_completion_date: optional_date(
                    "Test completion date",
                    t.test_completion_date,
                )?,
                test_status: optional_choice("Test status:", TestStatus::ALL, t.test_status)?,
                bugs_reported: optional_text("Bugs reported:", t.bugs_reported.as_deref())?,
                rework_needed: optional_flag("Rework needed?", t.rework_needed)?,
            })
        }
        Stage::Uat => {
            let u = &req.uat;
            PhaseEdit::Uat(UatDetails {
                uat_status: optional_choice("UAT status:", UatStatus::ALL, u.uat_status)?,
                uat_completion_date: optional_date(
                    "UAT completion date",
                    u.uat_completion_date,
                )?,
                uat_feedback: optional_text("UAT feedback:", u.uat_feedback.as_deref())?,
            })
        }
        Stage::Deployment => {
            let d = &req.deployment;
            PhaseEdit::Deployment(DeploymentDetails {
                deployment_date: optional_date("Deployment date", d.deployment_date)?,
                deployed_by: optional_text("Deployed by:", d.deployed_by.as_deref())?,
                deployment_type: optional_choice(
                    "Deployment type:",
                    DeploymentType::ALL,
                    d.deployment_type,
                )?,
                environment: optional_choice("Environment:", Environment::ALL, d.environment)?,
                rollback_plan: optional_flag("Rollback plan in place?", d.rollback_plan)?,
            })
        }
        Stage::Completed => {
            let c = &req.closure;
            PhaseEdit::Closure(ClosureDetails {
                outcome: optional_choice("Outcome:", Outcome::ALL, c.outcome)?,
                issues: optional_text("Issues:", c.issues.as_deref())?,
                lessons_learned: optional_text("Lessons learned:", c.lessons_learned.as_deref())?,
                close_date: optional_date("Close date", c.close_date)?,
                final_status: optional_choice("Final status:", FinalStatus::ALL, c.final_status)?,
            })
        }
    };

    Ok(edit)
}

/// Prompts the user for a new bug, task or issue
pub fn prompt_new_item(phase: ItemPhase, default_reporter: Option<&str>) -> Result<ItemDraft> {
    let item_type = Select::new("Type:", ItemType::ALL.to_vec()).prompt()?;
    let title = required_text(&format!("{} title:", phase.item_noun()), None)?;
    let description = required_text("Description:", None)?;
    let severity = Select::new("Severity:", Severity::ALL.to_vec())
        .with_starting_cursor(1)
        .prompt()?;
    let assigned_to = required_text("Assigned to:", None)?;
    let reported_by = required_text("Reported by:", default_reporter)?;

    Ok(ItemDraft {
        item_type,
        title,
        description,
        severity,
        assigned_to,
        reported_by,
        ..Default::default()
    })
}

/// Prompts for changes to an existing item
pub fn prompt_item_patch(item: &TrackedItem) -> Result<ItemPatch> {
    let status = optional_choice("Status:", ItemStatus::ALL, Some(item.status))?;
    let resolved_date = match status {
        Some(ItemStatus::Resolved) | Some(ItemStatus::Closed) => {
            optional_date("Resolved date", item.resolved_date)?
        }
        _ => None,
    };

    Ok(ItemPatch {
        status,
        resolved_date,
        severity: optional_choice("Severity:", Severity::ALL, Some(item.severity))?,
        assigned_to: optional_text("Assigned to:", Some(&item.assigned_to))?,
        title: optional_text("Title:", Some(&item.title))?,
        description: optional_text("Description:", Some(&item.description))?,
        ..Default::default()
    })
}

pub fn prompt_select_item<'a>(items: &[&'a TrackedItem]) -> Result<&'a TrackedItem> {
    if items.is_empty() {
        anyhow::bail!("No items in this phase");
    }
    let options: Vec<String> = items.iter().map(|i| format!("{} {}", i.id, i)).collect();
    let selection = Select::new("Select an item:", options.clone()).prompt()?;
    let index = options
        .iter()
        .position(|o| *o == selection)
        .context("Unexpected item selection")?;
    Ok(items[index])
}

/// Guesses a MIME type from the file extension.
fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") | Some("log") => "text/plain",
        Some("csv") => "text/csv",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Prompts for file paths to attach. Only metadata is recorded.
pub fn prompt_files() -> Result<Vec<FileInfo>> {
    let input = Text::new("File paths (comma separated):").prompt()?;
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| {
            let path = Path::new(raw);
            let metadata = fs::metadata(path)
                .with_context(|| format!("Failed to read file metadata: {:?}", path))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| raw.to_string());
            Ok(FileInfo {
                name,
                size: metadata.len(),
                mime_type: mime_type(path).to_string(),
                url: Some(raw.to_string()),
            })
        })
        .collect()
}

pub fn prompt_month(label: &str, default: MonthKey) -> Result<MonthKey> {
    let input = Text::new(label)
        .with_default(&default.to_string())
        .prompt()?;
    Ok(input.parse()?)
}

/// Prompts for a new ongoing project: name, department, budget, timeline
pub fn prompt_new_project() -> Result<(String, String, f64, String)> {
    let name = required_text("Project name:", None)?;
    let department = required_text("Department:", None)?;
    let budget = optional_number("Budget:", None)?.unwrap_or(0.0);
    let timeline = required_text("Timeline:", None)?;
    Ok((name, department, budget, timeline))
}

pub fn prompt_user_name(default: Option<&str>) -> Result<String> {
    required_text("Your name:", default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_labels_lead_with_all() {
        let labels = filter_labels(&Stage::ALL);
        assert_eq!(labels.len(), Stage::ALL.len() + 1);
        assert_eq!(labels[0], "All");
        assert_eq!(labels[1], Stage::RequirementGathering.to_string());
    }

    #[test]
    fn test_filter_pick_maps_index_to_value() {
        assert_eq!(filter_pick(Priority::ALL, 0), None);
        assert_eq!(filter_pick(Priority::ALL, 1), Some(Priority::ALL[0]));
        assert_eq!(filter_pick(&Stage::ALL, 8), Some(Stage::Completed));
        assert_eq!(filter_pick(&Stage::ALL, 9), None);
    }
}
