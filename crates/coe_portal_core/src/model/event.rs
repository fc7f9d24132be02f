//! Event records and registration set.

use crate::model::paper::ReviewStatus;
use crate::model::{UnitId, UserId};
use serde::{Deserialize, Serialize};

/// Event review status.
pub type EventStatus = ReviewStatus;

/// Event kind label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Workshop,
    Hackathon,
    #[serde(rename = "Guest Lecture")]
    GuestLecture,
    Seminar,
}

/// Portal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    /// Unique user ids. Order carries no meaning.
    #[serde(default)]
    pub registered_users: Vec<UserId>,
    pub status: EventStatus,
    pub submitted_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coe_id: Option<UnitId>,
    #[serde(default, rename = "is_cancelled")]
    pub is_cancelled: bool,
    #[serde(default, rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Event {
    /// Adds `user_id` to the registration set if absent.
    ///
    /// Returns `false` when the user was already registered.
    pub fn register(&mut self, user_id: &str) -> bool {
        if self.is_registered(user_id) {
            return false;
        }
        self.registered_users.push(user_id.to_string());
        true
    }

    pub fn is_registered(&self, user_id: &str) -> bool {
        self.registered_users.iter().any(|id| id == user_id)
    }
}

/// Caller-supplied fields for event creation/proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventType,
}

#[cfg(test)]
mod tests {
    use super::{Event, EventType, NewEvent};
    use crate::model::paper::ReviewStatus;

    fn sample_event() -> Event {
        Event {
            id: "evt-1".to_string(),
            title: "Rust workshop".to_string(),
            date: "2026-11-02".to_string(),
            time: "10:00".to_string(),
            location: "Hall A".to_string(),
            description: "Hands-on".to_string(),
            kind: EventType::Workshop,
            registered_users: Vec::new(),
            status: ReviewStatus::Approved,
            submitted_by: "user-3".to_string(),
            coe_id: None,
            is_cancelled: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn register_is_idempotent() {
        let mut event = sample_event();
        assert!(event.register("user-1"));
        assert!(!event.register("user-1"));
        assert!(event.register("user-2"));
        assert_eq!(event.registered_users.len(), 2);
    }

    #[test]
    fn guest_lecture_label_has_space() {
        let draft: NewEvent = serde_json::from_value(serde_json::json!({
            "title": "t", "date": "d", "time": "h", "location": "l",
            "description": "x", "type": "Guest Lecture"
        }))
        .expect("event json");
        assert_eq!(draft.kind, EventType::GuestLecture);
    }

    #[test]
    fn timestamps_use_snake_case_keys_and_are_optional() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "evt-9", "title": "t", "date": "d", "time": "h", "location": "l",
            "description": "x", "type": "Seminar", "status": "APPROVED",
            "submittedBy": "user-1", "created_at": "2026-10-01T09:00:00.000Z"
        }))
        .expect("event json");
        assert_eq!(event.created_at.as_deref(), Some("2026-10-01T09:00:00.000Z"));
        assert_eq!(event.updated_at, None);

        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["created_at"], "2026-10-01T09:00:00.000Z");
        assert!(value.get("createdAt").is_none());
        assert!(value.get("updated_at").is_none());
    }
}
