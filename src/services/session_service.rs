use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::{Phase, Practitioner, Role, Session};
use crate::supabase::{Database, SupabaseError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("practitioner {0} not found")]
    PractitionerNotFound(Uuid),

    #[error("practitioner {0} is not online")]
    PractitionerOffline(Uuid),

    #[error("practitioner is already in a session")]
    PractitionerBusy,

    #[error("session is no longer waiting")]
    NotWaiting,

    #[error("only the assigned practitioner may accept this session")]
    NotAssigned,

    #[error("no active session for that channel")]
    ChannelNotFound,

    #[error("session not found")]
    NotParticipant,

    #[error(transparent)]
    Supabase(#[from] SupabaseError),
}

/// Session lifecycle over the hosted database.
///
/// The process holds no session state; every precondition is enforced as a
/// conditional update so concurrent requests resolve through the database's
/// row-level atomicity.
#[derive(Clone)]
pub struct SessionService {
    db: Database,
}

impl SessionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// A guest requests a practitioner: new session in `waiting` with a
    /// fresh opaque channel name. Requires the practitioner to be online.
    pub async fn create(
        &self,
        guest_id: Uuid,
        practitioner_id: Uuid,
    ) -> Result<Session, SessionError> {
        let practitioner: Practitioner = self
            .db
            .from("practitioners")
            .eq("id", practitioner_id)
            .fetch_optional()
            .await?
            .ok_or(SessionError::PractitionerNotFound(practitioner_id))?;

        if !practitioner.is_online {
            return Err(SessionError::PractitionerOffline(practitioner_id));
        }

        let channel = format!("s_{}", Uuid::new_v4().simple());
        let row = json!({
            "practitionerId": practitioner_id,
            "guestId": guest_id,
            "phase": Phase::Waiting,
            "agoraChannel": channel,
            "createdAt": Utc::now(),
        });

        let session: Session = self.db.from("sessions").insert(&row).await?;
        tracing::info!(session = %session.id, practitioner = %practitioner_id, "session created");
        Ok(session)
    }

    /// Practitioner accepts: waiting → live.
    ///
    /// Two conditional updates back this. First the practitioner claim
    /// (`inService` false → true), then the phase swap scoped to `waiting`
    /// and the assigned practitioner. Of two concurrent accepts, exactly one
    /// sees its update return a row; the loser releases the claim.
    pub async fn accept(
        &self,
        session_id: Uuid,
        practitioner_id: Uuid,
    ) -> Result<Session, SessionError> {
        let claimed: Vec<Practitioner> = self
            .db
            .from("practitioners")
            .eq("id", practitioner_id)
            .eq("inService", false)
            .update(&json!({ "inService": true, "updatedAt": Utc::now() }))
            .await?;

        if claimed.is_empty() {
            return Err(SessionError::PractitionerBusy);
        }

        let won: Vec<Session> = self
            .db
            .from("sessions")
            .eq("id", session_id)
            .eq("practitionerId", practitioner_id)
            .eq("phase", Phase::Waiting)
            .update(&json!({ "phase": Phase::Live }))
            .await?;

        match won.into_iter().next() {
            Some(session) => {
                tracing::info!(session = %session.id, "session live");
                Ok(session)
            }
            None => {
                self.release_practitioner(practitioner_id).await?;

                let session: Option<Session> = self
                    .db
                    .from("sessions")
                    .eq("id", session_id)
                    .fetch_optional()
                    .await?;
                Err(losing_accept_error(session, session_id, practitioner_id))
            }
        }
    }

    /// Either participant ends/disconnects: {waiting, live} → ended.
    ///
    /// Idempotent on an already-ended session, because both parties race to
    /// report the same disconnect.
    pub async fn end(&self, session_id: Uuid, caller: Uuid) -> Result<Session, SessionError> {
        let session: Session = self
            .db
            .from("sessions")
            .eq("id", session_id)
            .fetch_optional()
            .await?
            .ok_or(SessionError::NotFound(session_id))?;

        if !session.is_participant(caller) {
            return Err(SessionError::NotParticipant);
        }
        if session.phase.is_terminal() {
            return Ok(session);
        }

        self.finish(session).await
    }

    /// Operator force-end, skipping the participant check.
    pub async fn force_end(&self, session_id: Uuid) -> Result<Session, SessionError> {
        let session: Session = self
            .db
            .from("sessions")
            .eq("id", session_id)
            .fetch_optional()
            .await?
            .ok_or(SessionError::NotFound(session_id))?;

        if session.phase.is_terminal() {
            return Ok(session);
        }
        self.finish(session).await
    }

    async fn finish(&self, session: Session) -> Result<Session, SessionError> {
        let ended: Vec<Session> = self
            .db
            .from("sessions")
            .eq("id", session.id)
            .in_list("phase", &[Phase::Waiting, Phase::Live])
            .update(&json!({ "phase": Phase::Ended, "endedAt": Utc::now() }))
            .await?;

        self.release_practitioner(session.practitioner_id).await?;

        match ended.into_iter().next() {
            Some(s) => {
                tracing::info!(session = %s.id, "session ended");
                Ok(s)
            }
            // The other participant got there first; the session is terminal
            // either way.
            None => Ok(self
                .db
                .from("sessions")
                .eq("id", session.id)
                .fetch_one()
                .await?),
        }
    }

    pub async fn get_for(&self, session_id: Uuid, caller: Uuid) -> Result<Session, SessionError> {
        let session: Session = self
            .db
            .from("sessions")
            .eq("id", session_id)
            .fetch_optional()
            .await?
            .ok_or(SessionError::NotFound(session_id))?;

        if !session.is_participant(caller) {
            return Err(SessionError::NotParticipant);
        }
        Ok(session)
    }

    /// The caller's sessions, newest first, optionally restricted to a
    /// phase set.
    pub async fn list_for(
        &self,
        caller: Uuid,
        role: Role,
        phases: &[Phase],
    ) -> Result<Vec<Session>, SessionError> {
        let mut query = self
            .db
            .from("sessions")
            .eq(participant_column(role), caller)
            .order("createdAt", false);
        if !phases.is_empty() {
            query = query.in_list("phase", phases);
        }
        Ok(query.fetch().await?)
    }

    /// Resolve a channel name to one of the caller's sessions that is still
    /// joinable (waiting or live).
    pub async fn find_by_channel(
        &self,
        caller: Uuid,
        role: Role,
        channel: &str,
    ) -> Result<Session, SessionError> {
        let session: Option<Session> = self
            .db
            .from("sessions")
            .eq(participant_column(role), caller)
            .eq("agoraChannel", channel)
            .in_list("phase", &[Phase::Waiting, Phase::Live])
            .fetch_optional()
            .await?;
        session.ok_or(SessionError::ChannelNotFound)
    }

    async fn release_practitioner(&self, practitioner_id: Uuid) -> Result<(), SessionError> {
        let _: Vec<Practitioner> = self
            .db
            .from("practitioners")
            .eq("id", practitioner_id)
            .update(&json!({ "inService": false, "updatedAt": Utc::now() }))
            .await?;
        Ok(())
    }
}

fn participant_column(role: Role) -> &'static str {
    match role {
        Role::Practitioner => "practitionerId",
        Role::Guest => "guestId",
    }
}

/// Explain a lost phase swap: the session vanished, belongs to someone
/// else, or has already moved past `waiting`.
fn losing_accept_error(
    session: Option<Session>,
    session_id: Uuid,
    practitioner_id: Uuid,
) -> SessionError {
    match session {
        None => SessionError::NotFound(session_id),
        Some(s) if s.practitioner_id != practitioner_id => SessionError::NotAssigned,
        Some(_) => SessionError::NotWaiting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(practitioner_id: Uuid, phase: Phase) -> Session {
        Session {
            id: Uuid::new_v4(),
            practitioner_id,
            guest_id: Uuid::new_v4(),
            phase,
            agora_channel: "s_test".into(),
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    #[test]
    fn participant_column_matches_role() {
        assert_eq!(participant_column(Role::Practitioner), "practitionerId");
        assert_eq!(participant_column(Role::Guest), "guestId");
    }

    #[test]
    fn losing_an_accept_race_is_a_conflict() {
        // The second of two concurrent accepts finds the session live.
        let me = Uuid::new_v4();
        let err = losing_accept_error(Some(session(me, Phase::Live)), Uuid::new_v4(), me);
        assert!(matches!(err, SessionError::NotWaiting));
    }

    #[test]
    fn accepting_someone_elses_session_is_rejected() {
        let err = losing_accept_error(
            Some(session(Uuid::new_v4(), Phase::Waiting)),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        assert!(matches!(err, SessionError::NotAssigned));
    }

    #[test]
    fn accepting_a_missing_session_is_not_found() {
        let id = Uuid::new_v4();
        let err = losing_accept_error(None, id, Uuid::new_v4());
        assert!(matches!(err, SessionError::NotFound(got) if got == id));
    }
}
