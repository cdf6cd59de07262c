use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::Practitioner;
use crate::supabase::{Database, SupabaseError};

#[derive(Debug, thiserror::Error)]
pub enum PractitionerError {
    #[error("practitioner {0} not found")]
    NotFound(Uuid),

    #[error("profile is not a practitioner")]
    NotPractitioner,

    #[error(transparent)]
    Supabase(#[from] SupabaseError),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PractitionerFilter {
    pub online_only: bool,
    pub id: Option<Uuid>,
}

/// Practitioner directory and presence flags.
#[derive(Clone)]
pub struct PractitionerService {
    db: Database,
}

impl PractitionerService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List practitioners, best-rated first.
    pub async fn list(
        &self,
        filter: PractitionerFilter,
    ) -> Result<Vec<Practitioner>, PractitionerError> {
        let mut query = self.db.from("practitioners").order("rating", false);
        if filter.online_only {
            query = query.eq("isOnline", true);
        }
        if let Some(id) = filter.id {
            query = query.eq("id", id);
        }
        Ok(query.fetch().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Practitioner, PractitionerError> {
        self.db
            .from("practitioners")
            .eq("id", id)
            .fetch_optional()
            .await?
            .ok_or(PractitionerError::NotFound(id))
    }

    /// Presence heartbeat / sign-off. Fails when the caller has no
    /// practitioner row.
    pub async fn set_online(
        &self,
        id: Uuid,
        online: bool,
    ) -> Result<Practitioner, PractitionerError> {
        let rows: Vec<Practitioner> = self
            .db
            .from("practitioners")
            .eq("id", id)
            .update(&json!({ "isOnline": online, "updatedAt": Utc::now() }))
            .await?;
        rows.into_iter()
            .next()
            .ok_or(PractitionerError::NotPractitioner)
    }
}
