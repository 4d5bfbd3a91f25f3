use ramhorns::Template;

use crate::adjacent::AdjacentPosts;
use crate::content::{Post, PostSummary};
use crate::error::ContentError;
use crate::rich_text::as_html;
use crate::view::{format_date, post_link};

#[derive(ramhorns::Content)]
struct ViewSection<'a> {
    heading: &'a str,
    body_html: String,
}

#[derive(ramhorns::Content)]
struct NavLink<'a> {
    link: String,
    title: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site_title: &'a str,
    uid: &'a str,
    post_title: &'a str,
    subtitle: &'a str,
    author: &'a str,
    date: String,
    reading_time: u32,
    has_banner: bool,
    banner: &'a str,
    sections: Vec<ViewSection<'a>>,
    previous: Vec<NavLink<'a>>,
    next: Vec<NavLink<'a>>,
    preview: bool,
}

fn nav_link(post: &Option<PostSummary>) -> Vec<NavLink<'_>> {
    post.iter()
        .map(|p| NavLink {
            link: post_link(&p.uid),
            title: p.title.as_str(),
        })
        .collect()
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: String) -> Result<PostRenderer<'static>, ContentError> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(ContentError::Template(format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, post: &Post, reading_time: u32, adjacent: &AdjacentPosts, preview: bool, site_title: &str) -> String {
        let sections = post.content.iter()
            .map(|section| ViewSection {
                heading: section.heading.as_str(),
                body_html: as_html(&section.body),
            })
            .collect();

        self.template.render(&ViewItem {
            site_title,
            uid: post.uid.as_str(),
            post_title: post.title.as_str(),
            subtitle: post.subtitle.as_str(),
            author: post.author.as_str(),
            date: format_date(post.first_publication_date),
            reading_time,
            has_banner: post.banner.is_some(),
            banner: post.banner.as_deref().unwrap_or_default(),
            sections,
            previous: nav_link(&adjacent.previous),
            next: nav_link(&adjacent.next),
            preview,
        })
    }
}
