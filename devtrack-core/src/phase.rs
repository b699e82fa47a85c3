//! The request lifecycle: eight ordered stages and the rules for placing a
//! stage relative to a request's current one.
//!
//! The order of [`Stage::ALL`] is load-bearing. Progress rendering, the
//! completed/current/pending classification and the monthly activity report
//! all compare stage positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A lifecycle stage of a development request.
///
/// Variants are declared in lifecycle order, so the derived `Ord` matches
/// positional comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    RequirementGathering,
    Analysis,
    Approval,
    Development,
    Testing,
    Uat,
    Deployment,
    Completed,
}

impl Stage {
    /// Every stage, in lifecycle order.
    pub const ALL: [Stage; 8] = [
        Stage::RequirementGathering,
        Stage::Analysis,
        Stage::Approval,
        Stage::Development,
        Stage::Testing,
        Stage::Uat,
        Stage::Deployment,
        Stage::Completed,
    ];

    /// Zero-based position in the lifecycle
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage identifier as it appears in data files (`requirement-gathering`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::RequirementGathering => "requirement-gathering",
            Stage::Analysis => "analysis",
            Stage::Approval => "approval",
            Stage::Development => "development",
            Stage::Testing => "testing",
            Stage::Uat => "uat",
            Stage::Deployment => "deployment",
            Stage::Completed => "completed",
        }
    }

    /// Display label used by dashboards and lists
    pub fn label(self) -> &'static str {
        match self {
            Stage::RequirementGathering => "Requirement Gathering",
            Stage::Analysis => "Analysis",
            Stage::Approval => "Approval",
            Stage::Development => "Development",
            Stage::Testing => "Testing",
            Stage::Uat => "UAT",
            Stage::Deployment => "Deployment",
            Stage::Completed => "Completed",
        }
    }

    /// Label used on the request timeline and in activity rows, where the
    /// final stage reads as the post-deployment review.
    pub fn timeline_label(self) -> &'static str {
        match self {
            Stage::Completed => "Post-Deployment",
            other => other.label(),
        }
    }

    /// The following stage, or `None` for `Completed`.
    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    /// The preceding stage, or `None` for `RequirementGathering`.
    pub fn previous(self) -> Option<Stage> {
        self.index().checked_sub(1).map(|i| Stage::ALL[i])
    }

    /// Names of the request fields this stage's editor is allowed to write.
    pub fn owned_fields(self) -> &'static [&'static str] {
        match self {
            Stage::RequirementGathering => &[
                "title",
                "priority",
                "businessJustification",
                "requestedBy",
                "department",
                "relatedModule",
            ],
            Stage::Analysis => &[
                "requirementDescription",
                "feasibilityStatus",
                "estimatedEffort",
                "assignedAnalyst",
                "impactedSystems",
                "dependencies",
            ],
            Stage::Approval => &[
                "approvalStatus",
                "approvedDate",
                "approverComments",
                "budgetAllocation",
            ],
            Stage::Development => &[
                "assignedDeveloper",
                "startDate",
                "targetCompletionDate",
                "developmentNotes",
            ],
            Stage::Testing => &[
                "testCaseReference",
                "testStartDate",
                "testCompletionDate",
                "testStatus",
                "bugsReported",
                "reworkNeeded",
            ],
            Stage::Uat => &["uatStatus", "uatCompletionDate", "uatFeedback"],
            Stage::Deployment => &[
                "deploymentDate",
                "deployedBy",
                "deploymentType",
                "environment",
                "rollbackPlan",
            ],
            Stage::Completed => &[
                "outcome",
                "issues",
                "lessonsLearned",
                "closeDate",
                "finalStatus",
            ],
        }
    }

    /// Returns the stage whose editor owns `field`, if any.
    pub fn owner_of(field: &str) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.owned_fields().contains(&field))
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::RequirementGathering
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Stage {
    type Err = Error;

    /// Accepts the identifier (`uat`), the label (`UAT`) or the timeline label
    /// (`Post-Deployment`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| {
                stage.as_str() == needle
                    || stage.label().to_lowercase() == needle
                    || stage.timeline_label().to_lowercase() == needle
            })
            .ok_or_else(|| Error::unknown("stage", s))
    }
}

/// Ordered list of all lifecycle stages.
pub fn phases() -> &'static [Stage] {
    &Stage::ALL
}

/// Where a stage sits relative to a request's current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    Completed,
    Current,
    Pending,
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseStatus::Completed => write!(f, "Completed"),
            PhaseStatus::Current => write!(f, "Current"),
            PhaseStatus::Pending => write!(f, "Pending"),
        }
    }
}

/// Classifies `phase` against `current` by lifecycle position.
///
/// Earlier stages are completed, the same stage is current, later stages are
/// pending. No other transition rule exists.
pub fn classify(phase: Stage, current: Stage) -> PhaseStatus {
    match phase.index().cmp(&current.index()) {
        std::cmp::Ordering::Less => PhaseStatus::Completed,
        std::cmp::Ordering::Equal => PhaseStatus::Current,
        std::cmp::Ordering::Greater => PhaseStatus::Pending,
    }
}

/// The phases that carry bug/task/issue trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemPhase {
    Testing,
    #[serde(rename = "UAT")]
    Uat,
    #[serde(rename = "Post-Deployment")]
    PostDeployment,
}

impl ItemPhase {
    pub const ALL: [ItemPhase; 3] = [ItemPhase::Testing, ItemPhase::Uat, ItemPhase::PostDeployment];

    pub fn label(self) -> &'static str {
        match self {
            ItemPhase::Testing => "Testing",
            ItemPhase::Uat => "UAT",
            ItemPhase::PostDeployment => "Post-Deployment",
        }
    }

    /// Prefix for generated item ids (`testing`, `uat`, `post-deployment`)
    pub fn id_prefix(self) -> &'static str {
        match self {
            ItemPhase::Testing => "testing",
            ItemPhase::Uat => "uat",
            ItemPhase::PostDeployment => "post-deployment",
        }
    }

    /// The lifecycle stage this tracker hangs off.
    pub fn stage(self) -> Stage {
        match self {
            ItemPhase::Testing => Stage::Testing,
            ItemPhase::Uat => Stage::Uat,
            ItemPhase::PostDeployment => Stage::Completed,
        }
    }

    /// What the tracker calls its entries.
    pub fn item_noun(self) -> &'static str {
        match self {
            ItemPhase::Testing => "Bug/Task",
            ItemPhase::Uat | ItemPhase::PostDeployment => "Issue",
        }
    }
}

impl fmt::Display for ItemPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ItemPhase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testing" => Ok(ItemPhase::Testing),
            "uat" => Ok(ItemPhase::Uat),
            "post-deployment" | "postdeployment" | "post_deployment" | "completed" => {
                Ok(ItemPhase::PostDeployment)
            }
            _ => Err(Error::unknown("tracker phase", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_fixed_order() {
        let ids: Vec<&str> = phases().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "requirement-gathering",
                "analysis",
                "approval",
                "development",
                "testing",
                "uat",
                "deployment",
                "completed"
            ]
        );
        for (i, stage) in phases().iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_classify_against_testing() {
        assert_eq!(
            classify(Stage::RequirementGathering, Stage::Testing),
            PhaseStatus::Completed
        );
        assert_eq!(classify(Stage::Testing, Stage::Testing), PhaseStatus::Current);
        assert_eq!(classify(Stage::Uat, Stage::Testing), PhaseStatus::Pending);
    }

    #[test]
    fn test_classify_every_pair() {
        for a in Stage::ALL {
            for b in Stage::ALL {
                let expected = if a < b {
                    PhaseStatus::Completed
                } else if a == b {
                    PhaseStatus::Current
                } else {
                    PhaseStatus::Pending
                };
                assert_eq!(classify(a, b), expected, "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Stage::RequirementGathering.label(), "Requirement Gathering");
        assert_eq!(Stage::Uat.label(), "UAT");
        assert_eq!(Stage::Completed.label(), "Completed");
        assert_eq!(Stage::Completed.timeline_label(), "Post-Deployment");
        assert_eq!(Stage::Analysis.timeline_label(), "Analysis");
    }

    #[test]
    fn test_next_and_previous() {
        assert_eq!(Stage::RequirementGathering.next(), Some(Stage::Analysis));
        assert_eq!(Stage::Completed.next(), None);
        assert_eq!(Stage::RequirementGathering.previous(), None);
        assert_eq!(Stage::Completed.previous(), Some(Stage::Deployment));
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("uat".parse::<Stage>().unwrap(), Stage::Uat);
        assert_eq!("Requirement Gathering".parse::<Stage>().unwrap(), Stage::RequirementGathering);
        assert_eq!("post-deployment".parse::<Stage>().unwrap(), Stage::Completed);
        let err = "review".parse::<Stage>().unwrap_err();
        assert!(err.to_string().contains("unknown stage"));
    }

    #[test]
    fn test_stage_serde_uses_identifiers() {
        let json = serde_json::to_string(&Stage::RequirementGathering).unwrap();
        assert_eq!(json, "\"requirement-gathering\"");
        let parsed: Stage = serde_json::from_str("\"uat\"").unwrap();
        assert_eq!(parsed, Stage::Uat);
        assert!(serde_json::from_str::<Stage>("\"review\"").is_err());
    }

    #[test]
    fn test_every_field_has_one_owner() {
        let mut seen = std::collections::HashSet::new();
        for stage in Stage::ALL {
            for field in stage.owned_fields() {
                assert!(seen.insert(*field), "{} owned twice", field);
                assert_eq!(Stage::owner_of(field), Some(stage));
            }
        }
        assert_eq!(Stage::owner_of("id"), None);
    }

    #[test]
    fn test_item_phase_ids_and_stages() {
        assert_eq!(ItemPhase::Testing.id_prefix(), "testing");
        assert_eq!(ItemPhase::PostDeployment.id_prefix(), "post-deployment");
        assert_eq!(ItemPhase::PostDeployment.stage(), Stage::Completed);
        assert_eq!("UAT".parse::<ItemPhase>().unwrap(), ItemPhase::Uat);
        assert!("deployment".parse::<ItemPhase>().is_err());
    }
}
