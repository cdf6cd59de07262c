use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a consultation session.
///
/// Transitions are monotonic: waiting → live → ended. `ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Live,
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Waiting => "waiting",
            Phase::Live => "live",
            Phase::Ended => "ended",
        }
    }

    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_transition(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Waiting, Phase::Live)
                | (Phase::Waiting, Phase::Ended)
                | (Phase::Live, Phase::Ended)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Ended
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Phase::Waiting),
            "live" => Ok(Phase::Live),
            "ended" => Ok(Phase::Ended),
            other => Err(format!("unknown phase `{}`", other)),
        }
    }
}

/// One consultation between a guest and a practitioner.
///
/// Owned and persisted by the hosted database; this process never holds an
/// authoritative copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub guest_id: Uuid,
    pub phase: Phase,
    pub agora_channel: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.practitioner_id == user_id || self.guest_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_monotonic() {
        assert!(Phase::Waiting.can_transition(Phase::Live));
        assert!(Phase::Waiting.can_transition(Phase::Ended));
        assert!(Phase::Live.can_transition(Phase::Ended));
    }

    #[test]
    fn no_regression_or_exit_from_ended() {
        for from in [Phase::Waiting, Phase::Live, Phase::Ended] {
            assert!(!from.can_transition(Phase::Waiting), "{from} -> waiting");
            assert!(!from.can_transition(from), "{from} -> {from}");
        }
        assert!(!Phase::Live.can_transition(Phase::Waiting));
        assert!(!Phase::Ended.can_transition(Phase::Live));
        assert!(!Phase::Ended.can_transition(Phase::Waiting));
        assert!(Phase::Ended.is_terminal());
    }

    #[test]
    fn phase_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_value(Phase::Waiting).unwrap(), "waiting");
        assert_eq!("live".parse::<Phase>().unwrap(), Phase::Live);
        assert!("waiting_room".parse::<Phase>().is_err());
    }
}
