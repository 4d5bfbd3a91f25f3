use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DOCUMENT_TYPE: &str = "document.type";
pub const DOCUMENT_ID: &str = "document.id";
pub const PUBLICATION_DATE: &str = "document.first_publication_date";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    At(String, String),
    Not(String, String),
    DateBefore(String, DateTime<Utc>),
    DateAfter(String, DateTime<Utc>),
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At(path.to_string(), value.to_string())
    }

    pub fn not(path: &str, value: &str) -> Self {
        Predicate::Not(path.to_string(), value.to_string())
    }

    /// Prismic predicate syntax, e.g. `[at(document.type, "post")]`.
    pub fn to_query_string(&self) -> String {
        match self {
            Predicate::At(path, value) => format!("[at({}, {})]", path, quote(value)),
            Predicate::Not(path, value) => format!("[not({}, {})]", path, quote(value)),
            Predicate::DateBefore(path, date) => format!("[date.before({}, {})]", path, date.timestamp_millis()),
            Predicate::DateAfter(path, date) => format!("[date.after({}, {})]", path, date.timestamp_millis()),
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: &str) -> Self {
        Ordering { field: field.to_string(), descending: false }
    }

    pub fn desc(field: &str) -> Self {
        Ordering { field: field.to_string(), descending: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub revision_ref: Option<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub after: Option<String>,
    pub orderings: Vec<Ordering>,
}

impl Query {
    pub fn new(predicate: Predicate) -> Self {
        Query {
            predicates: vec![predicate],
            ..Default::default()
        }
    }

    pub fn documents_of_type(doc_type: &str) -> Self {
        Self::new(Predicate::at(DOCUMENT_TYPE, doc_type))
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_ref(mut self, revision_ref: Option<&str>) -> Self {
        self.revision_ref = revision_ref.map(|r| r.to_string());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn order_by(mut self, ordering: Ordering) -> Self {
        self.orderings.push(ordering);
        self
    }

    /// URL parameters of a search request, without the ref.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![];

        if !self.predicates.is_empty() {
            let q: String = self.predicates.iter().map(|p| p.to_query_string()).collect();
            params.push(("q".to_string(), format!("[{}]", q)));
        }

        if let Some(page_size) = self.page_size {
            params.push(("pageSize".to_string(), page_size.to_string()));
        }

        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }

        if let Some(ref after) = self.after {
            params.push(("after".to_string(), after.clone()));
        }

        if !self.orderings.is_empty() {
            let orderings: Vec<String> = self.orderings.iter()
                .map(|o| if o.descending { format!("{} desc", o.field) } else { o.field.clone() })
                .collect();
            params.push(("orderings".to_string(), format!("[{}]", orderings.join(","))));
        }

        params
    }
}
