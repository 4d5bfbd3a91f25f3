use std::fs;
use std::path::Path;

use chrono::{DateTime, Locale, Utc};

use crate::error::ContentError;
use crate::view::home_renderer::HomeRenderer;
use crate::view::not_found_renderer::NotFoundRenderer;
use crate::view::post_renderer::PostRenderer;

pub mod home_renderer;
pub mod not_found_renderer;
pub mod post_renderer;

/// Dates as shown to readers, e.g. `25 mar 2021`.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format_localized("%d %b %Y", Locale::pt_BR).to_string(),
        None => String::new(),
    }
}

pub fn post_link(uid: &str) -> String {
    format!("/post/{}", uid)
}

fn read_template(tpl_dir: &Path, file_name: &str) -> Result<String, ContentError> {
    fs::read_to_string(tpl_dir.join(file_name))
        .map_err(|e| ContentError::Template(format!("Error loading template {}: {}", file_name, e)))
}

/// Every page template, parsed once at startup.
pub struct Views {
    pub home: HomeRenderer<'static>,
    pub post: PostRenderer<'static>,
    pub not_found: NotFoundRenderer<'static>,
}

impl Views {
    pub fn load(tpl_dir: &Path) -> Result<Views, ContentError> {
        Ok(Views {
            home: HomeRenderer::new(read_template(tpl_dir, "home.tpl")?)?,
            post: PostRenderer::new(read_template(tpl_dir, "post.tpl")?)?,
            not_found: NotFoundRenderer::new(read_template(tpl_dir, "notfound.tpl")?)?,
        })
    }
}
