use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rich_text::RichTextBlock;

pub mod projection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

/// A post as rendered on its own page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Option<String>,
    pub content: Vec<ContentSection>,
}

/// The part of a post shown in listings and navigation links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationPage {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

impl PaginationPage {
    /// The cursor to follow, if any. Empty cursors count as absent.
    pub fn cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|c| !c.is_empty())
    }
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        PostSummary {
            uid: post.uid.clone(),
            first_publication_date: post.first_publication_date,
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
        }
    }
}

/// Parses backend timestamps. Both RFC 3339 and the `+0000` offset form are accepted.
pub fn parse_publication_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_publication_date() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        assert_eq!(parse_publication_date("2021-03-25T19:25:28+0000"), Some(expected));
        assert_eq!(parse_publication_date("2021-03-25T19:25:28Z"), Some(expected));
        assert_eq!(parse_publication_date("2021-03-25T16:25:28-03:00"), Some(expected));
        assert_eq!(parse_publication_date("25/03/2021"), None);
    }

    #[test]
    fn test_empty_cursor_is_absent() {
        let page = PaginationPage { results: vec![], next_page: Some("".to_string()) };
        assert_eq!(page.cursor(), None);
        let page = PaginationPage { results: vec![], next_page: Some("cursor1".to_string()) };
        assert_eq!(page.cursor(), Some("cursor1"));
    }
}
