//! Research paper records.

use crate::model::UserId;
use serde::{Deserialize, Serialize};

/// Review status shared by papers and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Paper review status.
pub type PaperStatus = ReviewStatus;

/// Submitted research paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPaper {
    pub id: String,
    pub title: String,
    /// Ordered author list.
    pub authors: Vec<String>,
    pub publication_year: i32,
    pub department: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub file_url: String,
    pub doi: String,
    pub status: PaperStatus,
    pub submitted_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_authors: Option<String>,
    /// RFC 3339 UTC timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<String>,
}

/// Caller-supplied fields for `submit_paper`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaper {
    pub title: String,
    pub authors: Vec<String>,
    pub publication_year: i32,
    pub department: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub doi: String,
    #[serde(default)]
    pub co_authors: Option<String>,
}
