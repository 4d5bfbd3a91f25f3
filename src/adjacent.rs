use chrono::{DateTime, Utc};

use crate::content::projection::project_summary;
use crate::content::PostSummary;
use crate::content_api::query::{Ordering, Predicate, Query, DOCUMENT_ID, PUBLICATION_DATE};
use crate::content_api::ContentApi;
use crate::error::ContentError;
use crate::preview::PreviewContext;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacentPosts {
    pub previous: Option<PostSummary>,
    pub next: Option<PostSummary>,
}

/// Candidates fetched per request. Malformed documents are skipped, so the
/// nearest one may not be usable.
const CANDIDATE_PAGE_SIZE: u32 = 5;

/// First candidate that projects to a post, following cursors past pages of
/// malformed documents.
async fn first_valid(api: &dyn ContentApi, query: &Query) -> Result<Option<PostSummary>, ContentError> {
    let mut response = api.query(query).await?;
    loop {
        if let Some(post) = response.results.iter().find_map(project_summary) {
            return Ok(Some(post));
        }

        let Some(cursor) = response.next_page.clone().filter(|c| !c.is_empty()) else {
            return Ok(None);
        };
        response = api.fetch_page(&cursor).await?;
    }
}

/// The post published closest before and closest after `published_at`.
/// Posts sharing the exact same timestamp are neither.
pub async fn resolve(
    api: &dyn ContentApi,
    doc_type: &str,
    preview: &PreviewContext,
    current_id: &str,
    published_at: DateTime<Utc>,
) -> Result<AdjacentPosts, ContentError> {
    let base = || {
        Query::documents_of_type(doc_type)
            .and(Predicate::not(DOCUMENT_ID, current_id))
            .with_ref(preview.revision_ref())
            .page_size(CANDIDATE_PAGE_SIZE)
    };

    let previous_query = base()
        .and(Predicate::DateBefore(PUBLICATION_DATE.to_string(), published_at))
        .order_by(Ordering::desc(PUBLICATION_DATE));
    let previous = first_valid(api, &previous_query).await?;

    let next_query = base()
        .and(Predicate::DateAfter(PUBLICATION_DATE.to_string(), published_at))
        .order_by(Ordering::asc(PUBLICATION_DATE));
    let next = first_valid(api, &next_query).await?;

    Ok(AdjacentPosts { previous, next })
}
