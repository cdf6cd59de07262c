pub mod participant;
pub mod practitioner;
pub mod profile;
pub mod session;

pub use participant::{Participant, ParticipantError, Role};
pub use practitioner::Practitioner;
pub use profile::Profile;
pub use session::{Phase, Session};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::Value;
    use uuid::Uuid;

    /// Every key at every depth must follow the hosted camelCase column
    /// convention, so no underscore may appear in serialized output.
    fn assert_camel_case_keys(value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, nested) in map {
                    assert!(!key.contains('_'), "key `{}` is not camelCase", key);
                    assert_camel_case_keys(nested);
                }
            }
            Value::Array(items) => items.iter().for_each(assert_camel_case_keys),
            _ => {}
        }
    }

    #[test]
    fn profile_serializes_camel_case_only() {
        let profile = Profile {
            id: Uuid::new_v4(),
            display_name: "Ada".into(),
            role: Role::Practitioner,
            avatar_url: Some("https://cdn.example.com/a.png".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&profile).expect("serialize");
        assert_camel_case_keys(&value);
        assert!(value.get("displayName").is_some());
        assert!(value.get("avatarUrl").is_some());
    }

    #[test]
    fn session_serializes_camel_case_only() {
        let session = Session {
            id: Uuid::new_v4(),
            practitioner_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            phase: Phase::Waiting,
            agora_channel: "s_abc".into(),
            created_at: Utc::now(),
            ended_at: None,
        };
        let value = serde_json::to_value(&session).expect("serialize");
        assert_camel_case_keys(&value);
        assert_eq!(value["phase"], "waiting");
        assert!(value.get("practitionerId").is_some());
        assert!(value.get("agoraChannel").is_some());
    }

    #[test]
    fn practitioner_serializes_camel_case_only() {
        let practitioner = Practitioner {
            id: Uuid::new_v4(),
            is_online: true,
            in_service: false,
            rating: Decimal::new(45, 1),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&practitioner).expect("serialize");
        assert_camel_case_keys(&value);
        assert_eq!(value["isOnline"], true);
        assert_eq!(value["inService"], false);
    }
}
