use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::{fs, io};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::content::parse_publication_date;
use crate::content_api::document::{RawDocument, SearchResponse};
use crate::content_api::query::{Predicate, Query, DOCUMENT_ID, DOCUMENT_TYPE, PUBLICATION_DATE};
use crate::content_api::ContentApi;
use crate::error::ContentError;

const CURSOR_PREFIX: &str = "memory://documents/search?";
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Fixture file layout: published documents plus draft documents per preview ref.
#[derive(Deserialize, Default)]
pub struct Fixture {
    #[serde(default)]
    pub documents: Vec<RawDocument>,
    #[serde(default)]
    pub drafts: HashMap<String, Vec<RawDocument>>,
}

/// Content repository held in memory, with the same query semantics as the
/// remote API. Used for offline fixtures and in tests.
pub struct MemoryRepository {
    documents: Vec<RawDocument>,
    drafts: HashMap<String, Vec<RawDocument>>,
}

impl MemoryRepository {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        MemoryRepository {
            documents,
            drafts: HashMap::new(),
        }
    }

    /// Registers the draft revisions visible under `revision_ref`.
    pub fn with_drafts(mut self, revision_ref: &str, drafts: Vec<RawDocument>) -> Self {
        self.drafts.insert(revision_ref.to_string(), drafts);
        self
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        MemoryRepository {
            documents: fixture.documents,
            drafts: fixture.drafts,
        }
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening fixture file {}: {}", path.display(), e))),
        };

        match serde_json::from_str::<Fixture>(&content) {
            Ok(fixture) => Ok(Self::from_fixture(fixture)),
            Err(e) => Err(io::Error::new(ErrorKind::InvalidData, format!("Error parsing fixture file {}: {}", path.display(), e))),
        }
    }

    /// Published documents with the drafts of `revision_ref` laid over them.
    /// Unknown refs read the published content.
    fn snapshot(&self, revision_ref: Option<&str>) -> Vec<&RawDocument> {
        let drafts = match revision_ref.and_then(|r| self.drafts.get(r)) {
            Some(drafts) => drafts,
            None => return self.documents.iter().collect(),
        };

        let mut docs: Vec<&RawDocument> = self.documents.iter()
            .map(|doc| drafts.iter().find(|d| d.id == doc.id).unwrap_or(doc))
            .collect();
        for draft in drafts {
            if !self.documents.iter().any(|doc| doc.id == draft.id) {
                docs.push(draft);
            }
        }
        docs
    }

    fn search(&self, query: &Query) -> SearchResponse {
        let mut matching: Vec<&RawDocument> = self.snapshot(query.revision_ref.as_deref())
            .into_iter()
            .filter(|doc| query.predicates.iter().all(|p| matches(doc, p)))
            .collect();

        // Stable sort; the last ordering is applied first.
        for ordering in query.orderings.iter().rev() {
            matching.sort_by(|a, b| {
                let ord = field_value(a, &ordering.field).cmp(&field_value(b, &ordering.field));
                if ordering.descending { ord.reverse() } else { ord }
            });
        }

        if let Some(ref after) = query.after {
            if let Some(pos) = matching.iter().position(|doc| &doc.id == after) {
                matching.drain(..=pos);
            }
        }

        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let page = query.page.unwrap_or(1).max(1);
        let total = matching.len() as u32;
        let total_pages = total.div_ceil(page_size);

        let results: Vec<RawDocument> = matching.into_iter()
            .skip(((page - 1) * page_size) as usize)
            .take(page_size as usize)
            .cloned()
            .collect();

        let next_page = if page < total_pages { Some(cursor_for(query, page + 1)) } else { None };
        let prev_page = if page > 1 { Some(cursor_for(query, page - 1)) } else { None };

        SearchResponse {
            page,
            results_per_page: page_size,
            total_results_size: total,
            total_pages,
            next_page,
            prev_page,
            results,
        }
    }
}

fn cursor_for(query: &Query, page: u32) -> String {
    let mut query = query.clone();
    query.page = Some(page);
    // Query always serializes to JSON
    let json = serde_json::to_string(&query).unwrap_or_default();
    let params = serde_urlencoded::to_string([("query", json)]).unwrap_or_default();
    format!("{}{}", CURSOR_PREFIX, params)
}

fn parse_cursor(cursor: &str) -> Result<Query, ContentError> {
    let Some(params) = cursor.strip_prefix(CURSOR_PREFIX) else {
        return Err(ContentError::InvalidCursor);
    };

    let params: Vec<(String, String)> = serde_urlencoded::from_str(params)
        .map_err(|e| ContentError::Fetch(format!("Invalid cursor {}: {}", cursor, e)))?;
    let json = params.into_iter()
        .find(|(k, _)| k == "query")
        .map(|(_, v)| v)
        .ok_or_else(|| ContentError::Fetch(format!("Invalid cursor {}", cursor)))?;

    Ok(serde_json::from_str(&json)?)
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum FieldValue {
    Missing,
    Date(DateTime<Utc>),
    Text(String),
}

fn field_value(doc: &RawDocument, path: &str) -> FieldValue {
    let text = |s: &str| FieldValue::Text(s.to_string());
    match path {
        DOCUMENT_TYPE => text(&doc.doc_type),
        DOCUMENT_ID => text(&doc.id),
        PUBLICATION_DATE => doc.first_publication_date.as_deref()
            .and_then(parse_publication_date)
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Missing),
        "document.last_publication_date" => doc.last_publication_date.as_deref()
            .and_then(parse_publication_date)
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Missing),
        _ => {
            // my.{type}.{field}
            let mut parts = path.splitn(3, '.');
            match (parts.next(), parts.next(), parts.next()) {
                (Some("my"), Some(doc_type), Some(field)) if doc_type == doc.doc_type => {
                    if field == "uid" {
                        doc.uid().map(text).unwrap_or(FieldValue::Missing)
                    } else {
                        doc.field_str(field).map(text).unwrap_or(FieldValue::Missing)
                    }
                }
                _ => FieldValue::Missing,
            }
        }
    }
}

fn matches(doc: &RawDocument, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::At(path, value) => field_value(doc, path) == FieldValue::Text(value.clone()),
        Predicate::Not(path, value) => field_value(doc, path) != FieldValue::Text(value.clone()),
        Predicate::DateBefore(path, date) => match field_value(doc, path) {
            FieldValue::Date(d) => d < *date,
            _ => false,
        },
        Predicate::DateAfter(path, date) => match field_value(doc, path) {
            FieldValue::Date(d) => d > *date,
            _ => false,
        },
    }
}

#[async_trait]
impl ContentApi for MemoryRepository {
    async fn query(&self, query: &Query) -> Result<SearchResponse, ContentError> {
        Ok(self.search(query))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, ContentError> {
        let query = parse_cursor(cursor)?;
        Ok(self.search(&query))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use serde_json::json;

    use crate::content_api::query::Ordering;

    use super::*;

    pub(crate) fn post_doc(id: &str, uid: &str, date: &str, title: &str) -> RawDocument {
        RawDocument {
            id: id.to_string(),
            uid: Some(uid.to_string()),
            doc_type: "post".to_string(),
            first_publication_date: Some(date.to_string()),
            last_publication_date: Some(date.to_string()),
            data: json!({
                "title": title,
                "subtitle": format!("subtitle of {}", title),
                "author": "Joseph Oliveira",
                "banner": {"url": format!("https://images.example.com/{}.png", uid)},
                "content": [
                    {"heading": "Proin et varius", "body": [{"type": "paragraph", "text": "Lorem ipsum dolor", "spans": []}]}
                ]
            }),
        }
    }

    pub(crate) fn sample_repository() -> MemoryRepository {
        MemoryRepository::new(vec![
            post_doc("B", "post-b", "2021-03-20T10:00:00+0000", "Post B"),
            post_doc("A", "post-a", "2021-03-10T10:00:00+0000", "Post A"),
            post_doc("C", "post-c", "2021-03-30T10:00:00+0000", "Post C"),
        ])
    }

    fn uids(response: &SearchResponse) -> Vec<&str> {
        response.results.iter().filter_map(|d| d.uid()).collect()
    }

    #[ntex::test]
    async fn test_filter_and_order() {
        let repo = sample_repository();
        let query = Query::documents_of_type("post").order_by(Ordering::desc(PUBLICATION_DATE));
        let response = repo.query(&query).await.unwrap();
        assert_eq!(uids(&response), ["post-c", "post-b", "post-a"]);

        let query = Query::documents_of_type("page");
        assert!(repo.query(&query).await.unwrap().results.is_empty());
    }

    #[ntex::test]
    async fn test_cursor_pages() {
        let repo = sample_repository();
        let query = Query::documents_of_type("post").page_size(2).order_by(Ordering::asc(PUBLICATION_DATE));
        let first = repo.query(&query).await.unwrap();
        assert_eq!(uids(&first), ["post-a", "post-b"]);
        assert_eq!(first.total_pages, 2);

        let cursor = first.next_page.unwrap();
        assert!(cursor.starts_with(CURSOR_PREFIX));
        let second = repo.fetch_page(&cursor).await.unwrap();
        assert_eq!(uids(&second), ["post-c"]);
        assert_eq!(second.next_page, None);
        assert!(second.prev_page.is_some());
    }

    #[ntex::test]
    async fn test_invalid_cursor() {
        let repo = sample_repository();
        let res = repo.fetch_page("https://elsewhere/").await;
        assert_eq!(res.unwrap_err(), ContentError::InvalidCursor);
    }

    #[ntex::test]
    async fn test_get_by_uid_and_id() {
        let repo = sample_repository();
        let doc = repo.get_by_uid("post", "post-b", None).await.unwrap().unwrap();
        assert_eq!(doc.id, "B");
        assert!(repo.get_by_uid("post", "missing", None).await.unwrap().is_none());
        assert!(repo.get_by_uid("page", "post-b", None).await.unwrap().is_none());

        let doc = repo.get_by_id("C", None).await.unwrap().unwrap();
        assert_eq!(doc.uid(), Some("post-c"));
    }

    #[ntex::test]
    async fn test_drafts_are_visible_under_ref_only() {
        let repo = sample_repository().with_drafts("xyz", vec![
            post_doc("B", "post-b", "2021-03-20T10:00:00+0000", "Draft B"),
        ]);

        let published = repo.get_by_uid("post", "post-b", None).await.unwrap().unwrap();
        assert_eq!(published.field_str("title"), Some("Post B"));

        let draft = repo.get_by_uid("post", "post-b", Some("xyz")).await.unwrap().unwrap();
        assert_eq!(draft.field_str("title"), Some("Draft B"));

        let unknown = repo.get_by_uid("post", "post-b", Some("other")).await.unwrap().unwrap();
        assert_eq!(unknown.field_str("title"), Some("Post B"));
    }

    #[ntex::test]
    async fn test_date_predicates_and_after() {
        let repo = sample_repository();
        let date = parse_publication_date("2021-03-20T10:00:00+0000").unwrap();

        let before = Query::documents_of_type("post")
            .and(Predicate::DateBefore(PUBLICATION_DATE.to_string(), date));
        assert_eq!(uids(&repo.query(&before).await.unwrap()), ["post-a"]);

        let after = Query::documents_of_type("post")
            .and(Predicate::DateAfter(PUBLICATION_DATE.to_string(), date));
        assert_eq!(uids(&repo.query(&after).await.unwrap()), ["post-c"]);

        let mut after_id = Query::documents_of_type("post").order_by(Ordering::asc(PUBLICATION_DATE));
        after_id.after = Some("A".to_string());
        assert_eq!(uids(&repo.query(&after_id).await.unwrap()), ["post-b", "post-c"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r##"{{
            "documents": [{{"id": "A", "uid": "post-a", "type": "post", "data": {{"title": "A"}}}}],
            "drafts": {{"xyz": [{{"id": "A", "uid": "post-a", "type": "post", "data": {{"title": "A draft"}}}}]}}
        }}"##).unwrap();

        let repo = MemoryRepository::from_file(file.path()).unwrap();
        assert_eq!(repo.documents.len(), 1);
        assert_eq!(repo.drafts["xyz"][0].field_str("title"), Some("A draft"));

        let missing = MemoryRepository::from_file(Path::new("/definitely/not/here.json"));
        assert!(missing.is_err());
    }
}
