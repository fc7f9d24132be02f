//! Initial collection contents loaded at store construction.

use crate::model::event::Event;
use crate::model::paper::ResearchPaper;
use crate::model::project::Project;
use crate::model::user::User;
use serde::{Deserialize, Serialize};

/// Seed collections, in display order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub papers: Vec<ResearchPaper>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl StoreSeed {
    /// Parses a JSON document `{papers, events, projects, users}`; missing
    /// collections default to empty.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreSeed;

    #[test]
    fn missing_collections_default_to_empty() {
        let seed = StoreSeed::from_json_str(
            r#"{"users":[{"id":"user-1","name":"Asha","email":"asha@example.edu","role":"ADMIN"}]}"#,
        )
        .expect("seed json");
        assert_eq!(seed.users.len(), 1);
        assert!(seed.papers.is_empty());
        assert!(seed.events.is_empty());
        assert!(seed.projects.is_empty());
    }

    #[test]
    fn rejects_unknown_role_label() {
        let err = StoreSeed::from_json_str(
            r#"{"users":[{"id":"u","name":"n","email":"e","role":"ROOT"}]}"#,
        );
        assert!(err.is_err());
    }
}
