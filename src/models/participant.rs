use std::fmt;

use serde::{Deserialize, Serialize};

/// The two parties a consultation connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Practitioner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Practitioner => "practitioner",
        }
    }

    /// Prefix used in video-participant uids (`p_…` / `g_…`).
    pub fn uid_prefix(&self) -> &'static str {
        match self {
            Role::Guest => "g",
            Role::Practitioner => "p",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParticipantError {
    #[error("uid must not be empty")]
    Empty,

    #[error("uid `{0}` has no recognized role prefix")]
    UnknownPrefix(String),

    #[error("uid `{0}` is missing an identifier after the role prefix")]
    MissingId(String),
}

/// A video-call participant with an explicit role.
///
/// The wire format encodes the role as a uid prefix; parsing happens once at
/// the request boundary and everything past it works with this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub role: Role,
    pub id: String,
}

impl Participant {
    /// Parse a `p_<id>` / `g_<id>` uid into a typed participant.
    pub fn from_uid(uid: &str) -> Result<Self, ParticipantError> {
        if uid.is_empty() {
            return Err(ParticipantError::Empty);
        }

        let (role, id) = match uid.split_once('_') {
            Some(("p", id)) => (Role::Practitioner, id),
            Some(("g", id)) => (Role::Guest, id),
            _ => return Err(ParticipantError::UnknownPrefix(uid.to_string())),
        };

        if id.is_empty() {
            return Err(ParticipantError::MissingId(uid.to_string()));
        }

        Ok(Self {
            role,
            id: id.to_string(),
        })
    }

    /// Render back to the wire uid form.
    pub fn uid(&self) -> String {
        format!("{}_{}", self.role.uid_prefix(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_practitioner_uid() {
        let p = Participant::from_uid("p_42").expect("parse");
        assert_eq!(p.role, Role::Practitioner);
        assert_eq!(p.id, "42");
    }

    #[test]
    fn parses_guest_uid() {
        let p = Participant::from_uid("g_abc-def").expect("parse");
        assert_eq!(p.role, Role::Guest);
        assert_eq!(p.id, "abc-def");
    }

    #[test]
    fn rejects_unknown_prefix() {
        assert_eq!(
            Participant::from_uid("x_1"),
            Err(ParticipantError::UnknownPrefix("x_1".into()))
        );
        assert_eq!(
            Participant::from_uid("practitioner"),
            Err(ParticipantError::UnknownPrefix("practitioner".into()))
        );
    }

    #[test]
    fn rejects_empty_uid() {
        assert_eq!(Participant::from_uid(""), Err(ParticipantError::Empty));
    }

    #[test]
    fn rejects_missing_id() {
        assert_eq!(
            Participant::from_uid("p_"),
            Err(ParticipantError::MissingId("p_".into()))
        );
    }

    #[test]
    fn uid_round_trips() {
        for uid in ["p_71aa", "g_9"] {
            let participant = Participant::from_uid(uid).expect("parse");
            assert_eq!(participant.uid(), uid);
        }
    }
}
