use std::collections::HashSet;

use serde::Serialize;
use spdlog::{info, warn};

use crate::content::projection::project_page;
use crate::content::{PaginationPage, PostSummary};
use crate::content_api::query::{Ordering, Query, PUBLICATION_DATE};
use crate::content_api::ContentApi;
use crate::error::ContentError;
use crate::preview::PreviewContext;

/// First page of the listing, newest posts first.
pub async fn first_page(api: &dyn ContentApi, doc_type: &str, page_size: u32, preview: &PreviewContext) -> Result<PaginationPage, ContentError> {
    let query = Query::documents_of_type(doc_type)
        .with_ref(preview.revision_ref())
        .page_size(page_size)
        .order_by(Ordering::desc(PUBLICATION_DATE));

    let response = api.query(&query).await?;
    Ok(project_page(&response))
}

/// Fetches the page behind `cursor`. Earlier pages are never touched, so a
/// failure leaves the caller's feed as it was.
pub async fn load_next_page(api: &dyn ContentApi, cursor: &str) -> Result<PaginationPage, ContentError> {
    if cursor.trim().is_empty() {
        return Err(ContentError::InvalidCursor);
    }

    let response = api.fetch_page(cursor).await?;
    Ok(project_page(&response))
}

/// Posts accumulated by following cursors, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostFeed {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    pages_loaded: u32,
}

impl PostFeed {
    pub fn from_page(page: PaginationPage) -> Self {
        PostFeed::default().append(page)
    }

    /// Returns the feed extended with `page`. Posts already in the feed are
    /// not repeated.
    pub fn append(self, page: PaginationPage) -> Self {
        let next_page = page.cursor().map(|c| c.to_string());
        let mut seen: HashSet<String> = self.posts.iter().map(|p| p.uid.clone()).collect();

        let mut posts = self.posts;
        for post in page.results {
            if seen.insert(post.uid.clone()) {
                posts.push(post);
            }
        }

        PostFeed {
            posts,
            next_page,
            pages_loaded: self.pages_loaded + 1,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether the "load more" affordance is shown.
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }
}

/// Follows cursors from `first` until `pages` pages are loaded or the backend
/// has no more. Requests are issued one at a time. A failed fetch stops the
/// walk and keeps the pages loaded so far.
pub async fn load_feed(api: &dyn ContentApi, first: PaginationPage, pages: u32) -> PostFeed {
    let mut feed = PostFeed::from_page(first);

    while feed.pages_loaded() < pages {
        let Some(cursor) = feed.next_page().map(|c| c.to_string()) else {
            break;
        };

        match load_next_page(api, &cursor).await {
            Ok(page) => {
                info!("Loaded page {} with {} posts", feed.pages_loaded() + 1, page.results.len());
                feed = feed.append(page);
            }
            Err(e) => {
                warn!("Error loading page {}: {}", feed.pages_loaded() + 1, e);
                break;
            }
        }
    }

    feed
}
