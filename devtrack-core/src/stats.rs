//! Dashboard and MIS aggregates.
//!
//! Everything here is a pure function of the request slice; nothing is
//! cached, so callers can recompute on every render.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ApprovalStatus, DevelopmentRequest, FinalStatus, Priority, TestStatus, UatStatus};
use crate::month::MonthKey;
use crate::phase::{classify, phases, PhaseStatus, Stage};

/// Number of recent requests shown on the dashboard
pub const RECENT_LIMIT: usize = 5;

/// `count / total` as a whole percentage, rounded half away from zero.
/// Returns 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

/// Request count per stage. All eight stages are present, in lifecycle order.
pub fn stage_breakdown(requests: &[DevelopmentRequest]) -> Vec<(Stage, usize)> {
    phases()
        .iter()
        .map(|&stage| {
            let count = requests.iter().filter(|r| r.current_stage == stage).count();
            (stage, count)
        })
        .collect()
}

/// Request count per priority, Low through Urgent, zero-filled.
pub fn priority_breakdown(requests: &[DevelopmentRequest]) -> Vec<(Priority, usize)> {
    Priority::ALL
        .iter()
        .map(|&priority| {
            let count = requests.iter().filter(|r| r.priority == priority).count();
            (priority, count)
        })
        .collect()
}

/// Request count per department, for departments that appear at least once,
/// in first-seen order.
pub fn department_breakdown(requests: &[DevelopmentRequest]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for req in requests {
        match counts.iter_mut().find(|(dept, _)| *dept == req.department) {
            Some((_, count)) => *count += 1,
            None => counts.push((req.department.clone(), 1)),
        }
    }
    counts
}

/// Requests raised in `month`.
pub fn monthly_filter(requests: &[DevelopmentRequest], month: MonthKey) -> Vec<DevelopmentRequest> {
    requests
        .iter()
        .filter(|r| month.contains(r.request_date))
        .cloned()
        .collect()
}

/// Headline numbers for the MIS view of one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total: usize,
    pub completed: usize,
    pub approved: usize,
    pub in_development: usize,
    /// Requests in testing or UAT
    pub in_testing: usize,
    /// Requests with a deployment date
    pub deployed: usize,
    pub pending: usize,
    pub completion_rate: u32,
    pub approval_rate: u32,
    pub deployment_rate: u32,
}

/// Counts over the requests raised in `month`.
pub fn monthly_stats(requests: &[DevelopmentRequest], month: MonthKey) -> MonthlyStats {
    let monthly = monthly_filter(requests, month);
    let total = monthly.len();
    let in_stage = |stages: &[Stage]| {
        monthly
            .iter()
            .filter(|r| stages.contains(&r.current_stage))
            .count()
    };

    let completed = in_stage(&[Stage::Completed]);
    let in_development = in_stage(&[Stage::Development]);
    let in_testing = in_stage(&[Stage::Testing, Stage::Uat]);
    let approved = monthly
        .iter()
        .filter(|r| r.approval.approval_status == Some(ApprovalStatus::Approved))
        .count();
    let deployed = monthly
        .iter()
        .filter(|r| r.deployment.deployment_date.is_some())
        .count();

    MonthlyStats {
        total,
        completed,
        approved,
        in_development,
        in_testing,
        deployed,
        pending: total - completed,
        completion_rate: percentage(completed, total),
        approval_rate: percentage(approved, total),
        deployment_rate: percentage(deployed, total),
    }
}

/// One dated lifecycle event of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseActivity {
    pub phase: Stage,
    pub action: String,
    pub date: NaiveDate,
    pub status: PhaseStatus,
}

/// All activity of one request within a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestActivity {
    pub request_id: String,
    pub title: String,
    pub department: String,
    pub current_stage: Stage,
    pub activities: Vec<PhaseActivity>,
}

/// Describes what happened in `stage` from the request's status fields.
fn activity_action(req: &DevelopmentRequest, stage: Stage) -> String {
    match stage {
        Stage::RequirementGathering => "Requirements collected and documented".to_string(),
        Stage::Analysis => "Technical analysis completed".to_string(),
        Stage::Approval => match req.approval.approval_status {
            Some(ApprovalStatus::Approved) => "Request approved".to_string(),
            Some(status) => format!("Request {}", status.label().to_lowercase()),
            None => "Request pending".to_string(),
        },
        Stage::Development => "Development work started".to_string(),
        Stage::Testing => match req.testing.test_status {
            Some(TestStatus::Pass) => "Testing completed successfully".to_string(),
            _ => "Testing in progress".to_string(),
        },
        Stage::Uat => match req.uat.uat_status {
            Some(UatStatus::Accepted) => "UAT accepted by business".to_string(),
            _ => "UAT feedback received".to_string(),
        },
        Stage::Deployment => match req.deployment.environment {
            Some(env) => format!("Deployed to {}", env),
            None => "Deployment recorded".to_string(),
        },
        Stage::Completed => match req.closure.final_status {
            Some(FinalStatus::Closed) => "Project closed successfully".to_string(),
            _ => "Post-deployment review completed".to_string(),
        },
    }
}

/// Phase events dated within `month`, grouped per request.
///
/// Each stage contributes a row when its date field falls in the month;
/// requests with no such rows are left out.
pub fn phase_activity(requests: &[DevelopmentRequest], month: MonthKey) -> Vec<RequestActivity> {
    requests
        .iter()
        .filter_map(|req| {
            let activities: Vec<PhaseActivity> = phases()
                .iter()
                .filter_map(|&stage| {
                    let date = req.stage_date(stage).filter(|d| month.contains(*d))?;
                    Some(PhaseActivity {
                        phase: stage,
                        action: activity_action(req, stage),
                        date,
                        status: classify(stage, req.current_stage),
                    })
                })
                .collect();

            if activities.is_empty() {
                None
            } else {
                Some(RequestActivity {
                    request_id: req.id.clone(),
                    title: req.title.clone(),
                    department: req.department.clone(),
                    current_stage: req.current_stage,
                    activities,
                })
            }
        })
        .collect()
}

/// Dashboard summary across all requests
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub stages: Vec<(Stage, usize)>,
    pub priorities: Vec<(Priority, usize)>,
    /// First [`RECENT_LIMIT`] requests in store order
    pub recent: Vec<DevelopmentRequest>,
}

pub fn overview(requests: &[DevelopmentRequest]) -> Overview {
    let stages = stage_breakdown(requests);
    let completed = stages
        .iter()
        .find(|(stage, _)| *stage == Stage::Completed)
        .map_or(0, |(_, count)| *count);

    Overview {
        total: requests.len(),
        completed,
        in_progress: requests.len() - completed,
        stages,
        priorities: priority_breakdown(requests),
        recent: requests.iter().take(RECENT_LIMIT).cloned().collect(),
    }
}
