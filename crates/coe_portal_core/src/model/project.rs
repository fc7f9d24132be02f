//! Project records, progress stages and partial-update merge.
//!
//! # Invariants
//! - `ProjectUpdate::apply_to` never touches `id` or `proposer_id`.
//! - Fields absent from an update keep their current value.

use crate::model::{UnitId, UserId};
use serde::{Deserialize, Serialize};

/// Coarse project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Ongoing,
    Completed,
}

/// Project workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectProgress {
    Proposed,
    Assigned,
    Started,
    #[serde(rename = "In Progress")]
    InProgress,
    Approval,
    Completed,
    Rejected,
}

impl ProjectProgress {
    /// Stable wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "Proposed",
            Self::Assigned => "Assigned",
            Self::Started => "Started",
            Self::InProgress => "In Progress",
            Self::Approval => "Approval",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }

    /// Review outcomes (`Assigned`, `Rejected`) are decided by the remote side.
    pub fn is_review_outcome(self) -> bool {
        matches!(self, Self::Assigned | Self::Rejected)
    }
}

/// Program level a project belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectLevel {
    University,
    National,
    #[serde(rename = "SIH")]
    Sih,
    Internal,
    #[serde(rename = "UG")]
    Ug,
    #[serde(rename = "PG")]
    Pg,
    #[serde(rename = "PhD")]
    PhD,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Team member display names.
    pub team: Vec<String>,
    pub status: ProjectStatus,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    pub coe_id: UnitId,
    pub level: ProjectLevel,
    pub progress: ProjectProgress,
    pub department: String,
    pub proposer_id: UserId,
    #[serde(default)]
    pub assigned_student_ids: Vec<UserId>,
    #[serde(
        default,
        rename = "reviewed_by_uid",
        skip_serializing_if = "Option::is_none"
    )]
    pub reviewed_by_uid: Option<UserId>,
    #[serde(
        default,
        rename = "reviewed_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub reviewed_at: Option<String>,
    #[serde(
        default,
        rename = "rejection_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<String>,
}

/// Caller-supplied fields for `add_project`; sent as the `submitProject`
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub coe_id: UnitId,
    pub level: ProjectLevel,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
}

/// Partial project update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coe_id: Option<UnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ProjectLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProjectProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_student_ids: Option<Vec<UserId>>,
    #[serde(
        default,
        rename = "reviewed_by_uid",
        skip_serializing_if = "Option::is_none"
    )]
    pub reviewed_by_uid: Option<UserId>,
    #[serde(
        default,
        rename = "reviewed_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub reviewed_at: Option<String>,
    #[serde(
        default,
        rename = "rejection_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<String>,
}

impl ProjectUpdate {
    /// Update that only moves the project to `progress`.
    pub fn progress(progress: ProjectProgress) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// Whether this update carries a review outcome that the remote side must
    /// confirm before it is merged locally.
    pub fn is_review_decision(&self) -> bool {
        self.progress
            .is_some_and(ProjectProgress::is_review_outcome)
    }

    /// Merges every present field into `project`.
    pub fn apply_to(&self, project: &mut Project) {
        merge(&mut project.title, &self.title);
        merge(&mut project.description, &self.description);
        merge(&mut project.team, &self.team);
        merge(&mut project.status, &self.status);
        merge(&mut project.image_url, &self.image_url);
        merge(&mut project.coe_id, &self.coe_id);
        merge(&mut project.level, &self.level);
        merge(&mut project.progress, &self.progress);
        merge(&mut project.department, &self.department);
        merge(&mut project.assigned_student_ids, &self.assigned_student_ids);
        merge_optional(&mut project.labs, &self.labs);
        merge_optional(&mut project.patents, &self.patents);
        merge_optional(&mut project.funding, &self.funding);
        merge_optional(&mut project.reviewed_by_uid, &self.reviewed_by_uid);
        merge_optional(&mut project.reviewed_at, &self.reviewed_at);
        merge_optional(&mut project.rejection_reason, &self.rejection_reason);
    }
}

fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

fn merge_optional<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectLevel, ProjectProgress, ProjectStatus, ProjectUpdate};

    fn sample_project() -> Project {
        Project {
            id: "proj-1".to_string(),
            title: "Lattice crypto".to_string(),
            description: "PQC study".to_string(),
            team: vec!["Asha".to_string()],
            status: ProjectStatus::Ongoing,
            image_url: "img".to_string(),
            labs: Some(vec!["Lab 1".to_string()]),
            patents: None,
            funding: None,
            coe_id: "coe-cyber".to_string(),
            level: ProjectLevel::Ug,
            progress: ProjectProgress::Proposed,
            department: "CSE".to_string(),
            proposer_id: "user-1".to_string(),
            assigned_student_ids: Vec::new(),
            reviewed_by_uid: None,
            reviewed_at: None,
            rejection_reason: None,
        }
    }

    #[test]
    fn apply_to_merges_present_fields_only() {
        let mut project = sample_project();
        let update = ProjectUpdate {
            title: Some("Lattice crypto v2".to_string()),
            funding: Some("DST".to_string()),
            ..ProjectUpdate::default()
        };
        update.apply_to(&mut project);

        assert_eq!(project.title, "Lattice crypto v2");
        assert_eq!(project.funding.as_deref(), Some("DST"));
        assert_eq!(project.description, "PQC study");
        assert_eq!(project.labs, Some(vec!["Lab 1".to_string()]));
        assert_eq!(project.progress, ProjectProgress::Proposed);
    }

    #[test]
    fn review_decision_only_for_assigned_or_rejected() {
        assert!(ProjectUpdate::progress(ProjectProgress::Assigned).is_review_decision());
        assert!(ProjectUpdate::progress(ProjectProgress::Rejected).is_review_decision());
        assert!(!ProjectUpdate::progress(ProjectProgress::Started).is_review_decision());
        assert!(!ProjectUpdate::default().is_review_decision());
    }

    #[test]
    fn progress_labels_match_wire_format() {
        let json = serde_json::to_string(&ProjectProgress::InProgress).expect("serialize");
        assert_eq!(json, "\"In Progress\"");
        assert_eq!(ProjectProgress::InProgress.as_str(), "In Progress");
        let level: ProjectLevel = serde_json::from_str("\"PhD\"").expect("level");
        assert_eq!(level, ProjectLevel::PhD);
    }
}
