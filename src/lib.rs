pub mod adjacent;
pub mod config;
pub mod content;
pub mod content_api;
pub mod error;
pub mod logger;
pub mod page_cache;
pub mod pagination;
pub mod preview;
mod query_string;
pub mod reading_time;
pub mod rich_text;
pub mod server;
pub mod view;
