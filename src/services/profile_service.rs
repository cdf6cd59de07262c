use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::{Profile, Role};
use crate::supabase::identity::IdentityError;
use crate::supabase::{Database, Identity, SupabaseError};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Upstream wording preserved: clients match on "already registered".
    #[error("{0}")]
    EmailTaken(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("profile {0} not found")]
    NotFound(Uuid),

    #[error("no fields to update")]
    EmptyPatch,

    #[error("identity provider returned an unexpected response")]
    UnexpectedIdentityResponse,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Supabase(#[from] SupabaseError),
}

#[derive(Debug)]
pub struct SignupOutcome {
    pub profile: Profile,
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub access_token: String,
    pub expires_in: u64,
    pub profile: Profile,
}

#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Signup/login orchestration and profile CRUD.
#[derive(Clone)]
pub struct ProfileService {
    identity: Identity,
    db: Database,
}

impl ProfileService {
    pub fn new(identity: Identity, db: Database) -> Self {
        Self { identity, db }
    }

    /// Create the identity user, then its profile row, then the practitioner
    /// extension row when applicable.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> Result<SignupOutcome, ProfileError> {
        let created = self
            .identity
            .signup(email, password)
            .await
            .map_err(classify_signup_error)?;

        let user_id = created
            .user_id()
            .ok_or(ProfileError::UnexpectedIdentityResponse)?;

        let now = Utc::now();
        let profile: Profile = self
            .db
            .from("profiles")
            .insert(&json!({
                "id": user_id,
                "displayName": display_name,
                "role": role,
                "createdAt": now,
                "updatedAt": now,
            }))
            .await?;

        if role == Role::Practitioner {
            let _: serde_json::Value = self
                .db
                .from("practitioners")
                .insert(&json!({
                    "id": user_id,
                    "isOnline": false,
                    "inService": false,
                    "rating": 0,
                    "updatedAt": now,
                }))
                .await?;
        }

        tracing::info!(user = %user_id, role = %role, "profile created");
        Ok(SignupOutcome {
            profile,
            access_token: created.access_token,
            expires_in: created.expires_in,
        })
    }

    /// Password-grant login, returning the access token together with the
    /// caller's profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ProfileError> {
        let grant = self
            .identity
            .login(email, password)
            .await
            .map_err(classify_login_error)?;

        let user_id = grant
            .user
            .as_ref()
            .map(|u| u.id)
            .ok_or(ProfileError::UnexpectedIdentityResponse)?;
        let profile = self.get(user_id).await?;

        Ok(LoginOutcome {
            access_token: grant.access_token,
            expires_in: grant.expires_in,
            profile,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Profile, ProfileError> {
        self.db
            .from("profiles")
            .eq("id", id)
            .fetch_optional()
            .await?
            .ok_or(ProfileError::NotFound(id))
    }

    pub async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<Profile, ProfileError> {
        let mut body = serde_json::Map::new();
        if let Some(display_name) = patch.display_name {
            body.insert("displayName".into(), display_name.into());
        }
        if let Some(avatar_url) = patch.avatar_url {
            body.insert("avatarUrl".into(), avatar_url.into());
        }
        if body.is_empty() {
            return Err(ProfileError::EmptyPatch);
        }
        body.insert("updatedAt".into(), json!(Utc::now()));

        let rows: Vec<Profile> = self
            .db
            .from("profiles")
            .eq("id", id)
            .update(&serde_json::Value::Object(body))
            .await?;
        rows.into_iter().next().ok_or(ProfileError::NotFound(id))
    }
}

/// A taken email comes back from the provider as a 4xx whose message names
/// the condition; that wording must reach the client intact.
fn classify_signup_error(e: IdentityError) -> ProfileError {
    match e {
        IdentityError::Rejected { message, .. }
            if message.to_lowercase().contains("already registered") =>
        {
            ProfileError::EmailTaken(message)
        }
        other => other.into(),
    }
}

fn classify_login_error(e: IdentityError) -> ProfileError {
    match e {
        IdentityError::Unauthorized => ProfileError::InvalidCredentials,
        IdentityError::Rejected { status: 400, .. } => ProfileError::InvalidCredentials,
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_signup_preserves_upstream_wording() {
        let err = classify_signup_error(IdentityError::Rejected {
            status: 422,
            message: "User already registered".into(),
        });
        match err {
            ProfileError::EmailTaken(message) => {
                assert!(message.contains("already registered"));
            }
            other => panic!("expected EmailTaken, got {other:?}"),
        }
    }

    #[test]
    fn other_signup_rejections_pass_through() {
        let err = classify_signup_error(IdentityError::Rejected {
            status: 500,
            message: "boom".into(),
        });
        assert!(matches!(err, ProfileError::Identity(_)));
    }

    #[test]
    fn bad_credentials_map_to_invalid_credentials() {
        assert!(matches!(
            classify_login_error(IdentityError::Unauthorized),
            ProfileError::InvalidCredentials
        ));
        assert!(matches!(
            classify_login_error(IdentityError::Rejected {
                status: 400,
                message: "Invalid login credentials".into(),
            }),
            ProfileError::InvalidCredentials
        ));
    }
}

