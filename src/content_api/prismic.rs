use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use spdlog::debug;

use crate::content_api::document::SearchResponse;
use crate::content_api::query::Query;
use crate::content_api::ContentApi;
use crate::error::ContentError;

#[derive(Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

#[derive(Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

/// Client for the Prismic REST API (v2).
pub struct PrismicClient {
    endpoint: String,
    access_token: Option<String>,
    http_client: reqwest::Client,
}

impl PrismicClient {
    pub fn new(endpoint: &str, access_token: Option<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        PrismicClient {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
            http_client,
        }
    }

    fn with_token(&self, mut params: Vec<(String, String)>) -> Vec<(String, String)> {
        if let Some(ref token) = self.access_token {
            params.push(("access_token".to_string(), token.clone()));
        }
        params
    }

    /// `url` with the access token masked, for logs and error messages.
    fn redacted(&self, url: &str) -> String {
        let Some(ref token) = self.access_token else {
            return url.to_string();
        };
        match serde_urlencoded::to_string([("access_token", token)]) {
            Ok(param) => url.replace(&param, "access_token=***"),
            Err(_) => self.endpoint.clone(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ContentError> {
        debug!("GET {}", self.redacted(url));
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Fetch(format!("{} returned {}", self.redacted(url), status)));
        }
        Ok(response.json::<T>().await?)
    }

    async fn master_ref(&self) -> Result<String, ContentError> {
        let params = encode(&self.with_token(vec![]))?;
        let url = if params.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}?{}", self.endpoint, params)
        };

        let info: ApiInfo = self.get_json(&url).await?;
        info.refs.into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| ContentError::Fetch("Content API has no master ref".to_string()))
    }

    /// Cursors are followed as given, but only when they point back at this repository.
    fn owns_cursor(&self, cursor: &str) -> bool {
        cursor.strip_prefix(&self.endpoint)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
    }

    async fn search_url(&self, query: &Query) -> Result<String, ContentError> {
        let revision_ref = match query.revision_ref {
            Some(ref r) => r.clone(),
            None => self.master_ref().await?,
        };

        let mut params = vec![("ref".to_string(), revision_ref)];
        params.extend(query.to_params());
        let params = encode(&self.with_token(params))?;
        Ok(format!("{}/documents/search?{}", self.endpoint, params))
    }
}

fn encode(params: &[(String, String)]) -> Result<String, ContentError> {
    serde_urlencoded::to_string(params)
        .map_err(|e| ContentError::Fetch(format!("Error encoding query: {}", e)))
}

#[async_trait]
impl ContentApi for PrismicClient {
    async fn query(&self, query: &Query) -> Result<SearchResponse, ContentError> {
        let url = self.search_url(query).await?;
        self.get_json(&url).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, ContentError> {
        if !self.owns_cursor(cursor) {
            return Err(ContentError::InvalidCursor);
        }
        self.get_json(cursor).await
    }
}
