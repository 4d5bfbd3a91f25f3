use serde_json::Value;
use spdlog::warn;

use crate::content::{parse_publication_date, ContentSection, PaginationPage, Post, PostSummary};
use crate::content_api::document::{RawDocument, SearchResponse};
use crate::error::ContentError;
use crate::rich_text::RichTextBlock;

fn required_uid(doc: &RawDocument) -> Result<&str, ContentError> {
    doc.uid().ok_or_else(|| ContentError::MalformedDocument(format!("document {} has no uid", doc.id)))
}

fn required_title(doc: &RawDocument) -> Result<&str, ContentError> {
    doc.field_str("title")
        .ok_or_else(|| ContentError::MalformedDocument(format!("document {} has no title", doc.id)))
}

fn optional_str(doc: &RawDocument, name: &str) -> String {
    doc.field_str(name).unwrap_or_default().to_string()
}

fn banner_url(doc: &RawDocument) -> Option<String> {
    doc.data.get("banner")
        .and_then(|banner| banner.get("url"))
        .and_then(|url| url.as_str())
        .filter(|url| !url.is_empty())
        .map(|url| url.to_string())
}

fn content_sections(doc: &RawDocument) -> Vec<ContentSection> {
    let Some(groups) = doc.data.get("content").and_then(|c| c.as_array()) else {
        return vec![];
    };

    groups.iter()
        .map(|group| {
            let heading = group.get("heading").and_then(|h| h.as_str()).unwrap_or_default().to_string();
            let body = group.get("body")
                .and_then(|b| b.as_array())
                .map(|blocks| blocks.iter().filter_map(parse_block).collect())
                .unwrap_or_default();
            ContentSection { heading, body }
        })
        .collect()
}

fn parse_block(value: &Value) -> Option<RichTextBlock> {
    match serde_json::from_value::<RichTextBlock>(value.clone()) {
        Ok(block) => Some(block),
        Err(e) => {
            warn!("Skipping rich text block: {}", e);
            None
        }
    }
}

pub fn try_project_summary(doc: &RawDocument) -> Result<PostSummary, ContentError> {
    Ok(PostSummary {
        uid: required_uid(doc)?.to_string(),
        first_publication_date: doc.first_publication_date.as_deref().and_then(parse_publication_date),
        title: required_title(doc)?.to_string(),
        subtitle: optional_str(doc, "subtitle"),
        author: optional_str(doc, "author"),
    })
}

pub fn try_project_post(doc: &RawDocument) -> Result<Post, ContentError> {
    let summary = try_project_summary(doc)?;
    Ok(Post {
        uid: summary.uid,
        first_publication_date: summary.first_publication_date,
        title: summary.title,
        subtitle: summary.subtitle,
        author: summary.author,
        banner: banner_url(doc),
        content: content_sections(doc),
    })
}

/// `None` when the document lacks a uid or a title.
pub fn project_summary(doc: &RawDocument) -> Option<PostSummary> {
    match try_project_summary(doc) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Skipping document: {}", e);
            None
        }
    }
}

/// `None` when the document lacks a uid or a title.
pub fn project_post(doc: &RawDocument) -> Option<Post> {
    match try_project_post(doc) {
        Ok(post) => Some(post),
        Err(e) => {
            warn!("Rejecting document: {}", e);
            None
        }
    }
}

/// Summaries of a search response in backend order, skipping malformed documents.
pub fn project_page(response: &SearchResponse) -> PaginationPage {
    PaginationPage {
        results: response.results.iter().filter_map(project_summary).collect(),
        next_page: response.next_page.clone().filter(|c| !c.is_empty()),
    }
}
