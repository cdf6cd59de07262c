use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use super::error::upstream_message;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success response; the provider's message is preserved verbatim
    /// (signup with a taken email surfaces "already registered" through
    /// here).
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("bearer token rejected")]
    Unauthorized,

    #[error("invalid identity provider url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A user as the identity provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a password-grant login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<IdentityUser>,
}

/// Signup response; the provider returns a bare user when email confirmation
/// is required and a full grant otherwise, so both shapes are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupResult {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<IdentityUser>,
    #[serde(default)]
    pub id: Option<Uuid>,
}

impl SignupResult {
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id).or(self.id)
    }
}

/// Client for the hosted identity provider's REST API.
#[derive(Clone)]
pub struct Identity {
    http: Client,
    base: Url,
    anon_key: String,
    service_key: String,
}

impl Identity {
    pub fn new(
        http: Client,
        project_url: &Url,
        anon_key: &str,
        service_key: &str,
    ) -> Result<Self, IdentityError> {
        Ok(Self {
            http,
            base: project_url.join("auth/v1/")?,
            anon_key: anon_key.to_string(),
            service_key: service_key.to_string(),
        })
    }

    /// Resolve a bearer token to a user, or fail with `Unauthorized`.
    ///
    /// This is the request gate's upstream call; it has no side effects.
    pub async fn verify_bearer(&self, token: &str) -> Result<IdentityUser, IdentityError> {
        let resp = self
            .http
            .get(self.base.join("user")?)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IdentityError::Unauthorized),
            status if status.is_success() => Ok(resp.json().await?),
            status => Err(rejected(status, resp).await),
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<SignupResult, IdentityError> {
        let resp = self
            .http
            .post(self.base.join("signup")?)
            .header("apikey", self.anon_key.as_str())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            Err(rejected(status, resp).await)
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenGrant, IdentityError> {
        let mut url = self.base.join("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self
            .http
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            Err(rejected(status, resp).await)
        }
    }

    /// Look up a user by email through the admin surface. Operator tooling
    /// only; requires the service key.
    pub async fn admin_find_user(&self, email: &str) -> Result<IdentityUser, IdentityError> {
        #[derive(Deserialize)]
        struct UserList {
            #[serde(default)]
            users: Vec<IdentityUser>,
        }

        let mut url = self.base.join("admin/users")?;
        url.query_pairs_mut().append_pair("email", email);

        let resp = self
            .http
            .get(url)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejected(status, resp).await);
        }

        let list: UserList = resp.json().await?;
        list.users
            .into_iter()
            .find(|u| u.email.as_deref() == Some(email))
            .ok_or(IdentityError::Rejected {
                status: 404,
                message: format!("no identity user with email {email}"),
            })
    }

    /// Patch a user through the admin surface (password resets, email
    /// confirmation). Operator tooling only.
    pub async fn admin_update_user(&self, id: Uuid, patch: &Value) -> Result<(), IdentityError> {
        let resp = self
            .http
            .put(self.base.join(&format!("admin/users/{id}"))?)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(&self.service_key)
            .json(patch)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(rejected(status, resp).await)
        }
    }
}

async fn rejected(status: StatusCode, resp: reqwest::Response) -> IdentityError {
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    IdentityError::Rejected {
        status: status.as_u16(),
        message: upstream_message(&body),
    }
}
