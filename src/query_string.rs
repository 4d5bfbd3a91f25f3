use std::collections::HashMap;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Number of listing pages requested with `?pages=N`, clamped to `1..=max_pages`.
    pub fn get_pages(&self, max_pages: u32) -> u32 {
        let val: u32 = self.get("pages")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        val.clamp(1, max_pages.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_pages() {
        assert_eq!(QueryString::from("").get_pages(20), 1);
        assert_eq!(QueryString::from("pages=3").get_pages(20), 3);
        assert_eq!(QueryString::from("pages=0").get_pages(20), 1);
        assert_eq!(QueryString::from("pages=-2").get_pages(20), 1);
        assert_eq!(QueryString::from("pages=abc").get_pages(20), 1);
        assert_eq!(QueryString::from("pages=500").get_pages(20), 20);
    }

    #[test]
    fn test_parse_query_str() {
        let buf = "cursor=https%3A%2F%2Frepo.cdn.prismic.io%2Fapi%2Fv2%2Fdocuments%2Fsearch%3Fpage%3D2&token=xyz";
        let qs = QueryString::from(buf);
        assert_eq!(qs.get("cursor"), Some("https://repo.cdn.prismic.io/api/v2/documents/search?page=2"));
        assert_eq!(qs.get("token"), Some("xyz"));
        assert_eq!(qs.get("documentId"), None);
    }

    #[test]
    fn test_parse_invalid_query_str() {
        let expected = QueryString {
            items: Default::default(),
        };
        assert_eq!(QueryString::from(""), expected);
    }

    #[test]
    fn test_key_only_is_absent() {
        let qs = QueryString::from("cursor");
        assert_eq!(qs.get("cursor"), None);
    }
}
