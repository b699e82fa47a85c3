//! Built-in demonstration data.

use crate::error::Result;
use crate::models::DevelopmentRequest;

const SAMPLE_REQUESTS: &str = include_str!("../data/sample_requests.yaml");

/// The twelve demonstration requests (REQ-001 through REQ-012) used when no
/// snapshot is configured.
pub fn sample_requests() -> Result<Vec<DevelopmentRequest>> {
    Ok(serde_yaml::from_str(SAMPLE_REQUESTS)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, Environment, FinalStatus, Priority, UatStatus};
    use crate::phase::Stage;
    use crate::stats::{department_breakdown, stage_breakdown};
    use chrono::NaiveDate;

    #[test]
    fn test_sample_requests_parse() {
        let requests = sample_requests().unwrap();
        assert_eq!(requests.len(), 12);
        for (i, req) in requests.iter().enumerate() {
            assert_eq!(req.id, format!("REQ-{:03}", i + 1));
        }
    }

    #[test]
    fn test_sample_request_fields() {
        let requests = sample_requests().unwrap();

        let first = &requests[0];
        assert_eq!(first.title, "User Authentication Enhancement");
        assert_eq!(first.priority, Priority::High);
        assert_eq!(first.current_stage, Stage::Completed);
        assert_eq!(first.deployment.environment, Some(Environment::Prod));
        assert_eq!(first.closure.final_status, Some(FinalStatus::Closed));
        assert_eq!(
            first.closure.close_date,
            NaiveDate::from_ymd_opt(2024, 5, 30)
        );

        assert_eq!(requests[5].approval.approval_status, Some(ApprovalStatus::OnHold));
        assert_eq!(requests[6].uat.uat_status, Some(UatStatus::ChangesRequired));
        assert_eq!(requests[7].deployment.environment, Some(Environment::Uat));
    }

    #[test]
    fn test_sample_distribution() {
        let requests = sample_requests().unwrap();
        let stages = stage_breakdown(&requests);
        assert_eq!(stages[Stage::RequirementGathering.index()].1, 2);
        assert_eq!(stages[Stage::Analysis.index()].1, 2);
        assert_eq!(stages[Stage::Completed.index()].1, 1);

        let departments = department_breakdown(&requests);
        assert_eq!(departments[0], ("Security".to_string(), 1));
        assert_eq!(departments.len(), 8);
    }
}
