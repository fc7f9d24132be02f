//! Declared commit policy of each store mutation.

use crate::api::action::ActionName;
use crate::model::project::ProjectUpdate;

/// How a mutation reaches the local collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Applied to the in-memory collection immediately.
    LocalOnly,
    /// Committed locally only after the named action succeeds remotely.
    RemoteConfirmed(ActionName),
}

impl CommitPolicy {
    pub fn is_remote(self) -> bool {
        matches!(self, Self::RemoteConfirmed(_))
    }
}

/// Mutations exposed by the domain store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    SubmitPaper,
    UpdatePaperStatus,
    CreateApprovedEvent,
    ProposeEvent,
    UpdateEventStatus,
    RegisterForEvent,
    AddProject,
    /// `review_decision`: the update moves progress to `Assigned`/`Rejected`.
    UpdateProject { review_decision: bool },
    AddUser,
}

impl StoreOperation {
    pub fn commit_policy(self) -> CommitPolicy {
        match self {
            Self::AddProject => CommitPolicy::RemoteConfirmed(ActionName::SubmitProject),
            Self::UpdateProject {
                review_decision: true,
            } => CommitPolicy::RemoteConfirmed(ActionName::ApproveProject),
            Self::SubmitPaper
            | Self::UpdatePaperStatus
            | Self::CreateApprovedEvent
            | Self::ProposeEvent
            | Self::UpdateEventStatus
            | Self::RegisterForEvent
            | Self::UpdateProject {
                review_decision: false,
            }
            | Self::AddUser => CommitPolicy::LocalOnly,
        }
    }

    /// Stable operation name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubmitPaper => "submit_paper",
            Self::UpdatePaperStatus => "update_paper_status",
            Self::CreateApprovedEvent => "create_approved_event",
            Self::ProposeEvent => "propose_event",
            Self::UpdateEventStatus => "update_event_status",
            Self::RegisterForEvent => "register_for_event",
            Self::AddProject => "add_project",
            Self::UpdateProject { .. } => "update_project",
            Self::AddUser => "add_user",
        }
    }
}

impl ProjectUpdate {
    /// Store operation this update maps to.
    pub fn operation(&self) -> StoreOperation {
        StoreOperation::UpdateProject {
            review_decision: self.is_review_decision(),
        }
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        self.operation().commit_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitPolicy, StoreOperation};
    use crate::api::action::ActionName;
    use crate::model::project::{ProjectProgress, ProjectUpdate};

    #[test]
    fn only_project_submission_and_review_are_remote() {
        let remote: Vec<StoreOperation> = [
            StoreOperation::SubmitPaper,
            StoreOperation::UpdatePaperStatus,
            StoreOperation::CreateApprovedEvent,
            StoreOperation::ProposeEvent,
            StoreOperation::UpdateEventStatus,
            StoreOperation::RegisterForEvent,
            StoreOperation::AddProject,
            StoreOperation::UpdateProject {
                review_decision: true,
            },
            StoreOperation::UpdateProject {
                review_decision: false,
            },
            StoreOperation::AddUser,
        ]
        .into_iter()
        .filter(|op| op.commit_policy().is_remote())
        .collect();

        assert_eq!(
            remote,
            vec![
                StoreOperation::AddProject,
                StoreOperation::UpdateProject {
                    review_decision: true
                },
            ]
        );
    }

    #[test]
    fn project_update_policy_follows_progress() {
        assert_eq!(
            ProjectUpdate::progress(ProjectProgress::Assigned).commit_policy(),
            CommitPolicy::RemoteConfirmed(ActionName::ApproveProject)
        );
        assert_eq!(
            ProjectUpdate::progress(ProjectProgress::Completed).commit_policy(),
            CommitPolicy::LocalOnly
        );
        assert_eq!(
            StoreOperation::AddProject.commit_policy(),
            CommitPolicy::RemoteConfirmed(ActionName::SubmitProject)
        );
    }
}
