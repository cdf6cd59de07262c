use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::error::{upstream_message, SupabaseError};

/// Client for the hosted database's REST query interface.
///
/// Column names are camelCase on the wire and pass through verbatim; no
/// renaming happens in this layer.
#[derive(Clone)]
pub struct Database {
    http: Client,
    base: Url,
    service_key: String,
}

impl Database {
    pub fn new(http: Client, project_url: &Url, service_key: &str) -> Result<Self, SupabaseError> {
        Ok(Self {
            http,
            base: project_url.join("rest/v1/")?,
            service_key: service_key.to_string(),
        })
    }

    /// Start a query against one table.
    pub fn from(&self, table: &str) -> TableQuery {
        TableQuery {
            http: self.http.clone(),
            base: self.base.clone(),
            table: table.to_string(),
            service_key: self.service_key.clone(),
            params: Vec::new(),
        }
    }
}

/// Incrementally built query against a single table.
///
/// Filters become REST query parameters; `update` with filters is the atomic
/// conditional-update primitive (zero returned rows means the precondition
/// no longer held).
pub struct TableQuery {
    http: Client,
    base: Url,
    table: String,
    service_key: String,
    params: Vec<(String, String)>,
}

impl TableQuery {
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.into(), format!("eq.{}", value.to_string())));
        self
    }

    /// Set-membership predicate, e.g. `phase=in.(waiting,live)`.
    pub fn in_list<T: ToString>(mut self, column: &str, values: &[T]) -> Self {
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.into(), format!("in.({joined})")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".into(), format!("{column}.{direction}")));
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.params.push(("limit".into(), n.to_string()));
        self
    }

    /// Raw `column=op.value` predicate passthrough, for operator tooling.
    pub fn filter(mut self, column: &str, predicate: &str) -> Self {
        self.params.push((column.into(), predicate.into()));
        self
    }

    /// The query parameters accumulated so far, in insertion order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.params
    }

    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let resp = self.request(Method::GET)?.send().await?;
        let resp = check(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, SupabaseError> {
        let rows: Vec<T> = self.limit(1).fetch().await?;
        Ok(rows.into_iter().next())
    }

    pub async fn fetch_one<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        self.fetch_optional().await?.ok_or(SupabaseError::NotFound)
    }

    /// Insert one row and return it as stored.
    pub async fn insert<T: DeserializeOwned>(self, row: &Value) -> Result<T, SupabaseError> {
        let resp = self
            .request(Method::POST)?
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let resp = check(resp).await?;
        let mut rows: Vec<T> = resp.json().await?;
        if rows.is_empty() {
            return Err(SupabaseError::NotFound);
        }
        Ok(rows.remove(0))
    }

    /// Conditional update: apply `patch` to every row matching the filters
    /// and return the rows actually updated. An empty result means the
    /// precondition no longer held; the database applies the filter and the
    /// write atomically at row level.
    pub async fn update<T: DeserializeOwned>(self, patch: &Value) -> Result<Vec<T>, SupabaseError> {
        let resp = self
            .request(Method::PATCH)?
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete(self) -> Result<(), SupabaseError> {
        let resp = self.request(Method::DELETE)?.send().await?;
        check(resp).await?;
        Ok(())
    }

    fn request(&self, method: Method) -> Result<reqwest::RequestBuilder, SupabaseError> {
        let mut url = self.base.join(&self.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        Ok(self
            .http
            .request(method, url)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(&self.service_key))
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    Err(SupabaseError::Upstream {
        status: status.as_u16(),
        message: upstream_message(&body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::new(
            Client::new(),
            &Url::parse("https://project.example.com").unwrap(),
            "service-key",
        )
        .expect("database client")
    }

    fn pairs(query: &TableQuery) -> Vec<(String, String)> {
        query.query_pairs().to_vec()
    }

    #[test]
    fn eq_builds_rest_predicate() {
        let q = db().from("practitioners").eq("isOnline", true);
        assert_eq!(pairs(&q), vec![("isOnline".into(), "eq.true".into())]);
    }

    #[test]
    fn in_list_builds_set_membership_predicate() {
        use crate::models::Phase;
        let q = db()
            .from("sessions")
            .in_list("phase", &[Phase::Waiting, Phase::Live]);
        assert_eq!(
            pairs(&q),
            vec![("phase".into(), "in.(waiting,live)".into())]
        );
    }

    #[test]
    fn order_select_and_limit_accumulate() {
        let q = db()
            .from("sessions")
            .select("id")
            .order("createdAt", false)
            .limit(5);
        assert_eq!(
            pairs(&q),
            vec![
                ("select".into(), "id".into()),
                ("order".into(), "createdAt.desc".into()),
                ("limit".into(), "5".into()),
            ]
        );
    }

    #[test]
    fn raw_filter_passes_through() {
        let q = db().from("profiles").filter("role", "eq.practitioner");
        assert_eq!(
            pairs(&q),
            vec![("role".into(), "eq.practitioner".into())]
        );
    }
}
