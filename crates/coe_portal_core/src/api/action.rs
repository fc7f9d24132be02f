//! Remote action names and request-id generation.

use rand::Rng;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const REQUEST_ID_PREFIX: &str = "REQ";
const REQUEST_ID_SUFFIX_LEN: usize = 9;
const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Actions understood by the remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    SubmitProject,
    ApproveProject,
    GetUser,
    CreateUser,
    TestConnection,
}

impl ActionName {
    pub const ALL: [ActionName; 5] = [
        ActionName::SubmitProject,
        ActionName::ApproveProject,
        ActionName::GetUser,
        ActionName::CreateUser,
        ActionName::TestConnection,
    ];

    /// Wire name placed in the envelope `action` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubmitProject => "submitProject",
            Self::ApproveProject => "approveProject",
            Self::GetUser => "getUser",
            Self::CreateUser => "createUser",
            Self::TestConnection => "testConnection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == value)
    }
}

impl Display for ActionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates a replay-protection id: `REQ-<unix millis>-<9 base36 chars>`.
///
/// The remote side interprets the id; callers only rely on uniqueness.
pub fn new_request_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REQUEST_ID_SUFFIX_LEN)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
        .collect();
    format!("{REQUEST_ID_PREFIX}-{millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::{new_request_id, ActionName};
    use std::collections::HashSet;

    #[test]
    fn action_names_parse_back() {
        for action in ActionName::ALL {
            assert_eq!(ActionName::parse(action.as_str()), Some(action));
        }
        assert_eq!(ActionName::parse("deleteProject"), None);
    }

    #[test]
    fn request_id_has_prefix_millis_and_base36_suffix() {
        let id = new_request_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "REQ");
        assert!(parts[1].parse::<u128>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn request_ids_are_unique_per_call() {
        let ids: HashSet<String> = (0..500).map(|_| new_request_id()).collect();
        assert_eq!(ids.len(), 500);
    }
}
