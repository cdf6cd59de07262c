use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{upstream_message, SupabaseError};

/// One-shot upload grant for a client-side file upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub upload_url: String,
    pub public_url: String,
    pub path: String,
}

/// Client for the hosted storage service.
#[derive(Clone)]
pub struct Storage {
    http: Client,
    base: Url,
    service_key: String,
    bucket: String,
}

impl Storage {
    pub fn new(
        http: Client,
        project_url: &Url,
        service_key: &str,
        bucket: &str,
    ) -> Result<Self, SupabaseError> {
        Ok(Self {
            http,
            base: project_url.join("storage/v1/")?,
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    /// Create a signed upload URL for `path` in the avatar bucket and derive
    /// the public URL the object will be served from.
    pub async fn signed_upload(&self, path: &str) -> Result<SignedUpload, SupabaseError> {
        #[derive(Deserialize)]
        struct SignResponse {
            url: String,
        }

        let sign_endpoint = self
            .base
            .join(&format!("object/upload/sign/{}/{}", self.bucket, path))?;

        let resp = self
            .http
            .post(sign_endpoint)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
            return Err(SupabaseError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        let signed: SignResponse = resp.json().await?;
        // The service returns a path relative to the storage root.
        let upload_url = self.base.join(signed.url.trim_start_matches('/'))?;
        let public_url = self
            .base
            .join(&format!("object/public/{}/{}", self.bucket, path))?;

        Ok(SignedUpload {
            upload_url: upload_url.to_string(),
            public_url: public_url.to_string(),
            path: path.to_string(),
        })
    }
}
