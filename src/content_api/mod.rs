use async_trait::async_trait;

use crate::content_api::document::{RawDocument, SearchResponse};
use crate::content_api::query::{Predicate, Query, DOCUMENT_ID};
use crate::error::ContentError;

pub mod document;
pub mod memory;
pub mod prismic;
pub mod query;

/// Read access to the headless content backend.
///
/// `revision_ref` selects the snapshot being read: `None` is the published
/// content, a preview ref returns drafts.
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn query(&self, query: &Query) -> Result<SearchResponse, ContentError>;

    /// Follows a `next_page` cursor exactly as the backend returned it.
    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, ContentError>;

    async fn get_by_uid(&self, doc_type: &str, uid: &str, revision_ref: Option<&str>) -> Result<Option<RawDocument>, ContentError> {
        let query = Query::new(Predicate::at(&format!("my.{}.uid", doc_type), uid))
            .with_ref(revision_ref)
            .page_size(1);
        let response = self.query(&query).await?;
        Ok(response.results.into_iter().next())
    }

    async fn get_by_id(&self, id: &str, revision_ref: Option<&str>) -> Result<Option<RawDocument>, ContentError> {
        let query = Query::new(Predicate::at(DOCUMENT_ID, id))
            .with_ref(revision_ref)
            .page_size(1);
        let response = self.query(&query).await?;
        Ok(response.results.into_iter().next())
    }
}
