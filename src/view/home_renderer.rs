use ramhorns::Template;

use crate::error::ContentError;
use crate::pagination::PostFeed;
use crate::view::{format_date, post_link};

#[derive(ramhorns::Content)]
struct HomePage<'a> {
    site_title: &'a str,
    post_list: Vec<PostItem<'a>>,
    has_more: bool,
    load_more_link: String,
    next_cursor: &'a str,
    preview: bool,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    link: String,
    title: &'a str,
    subtitle: &'a str,
    author: &'a str,
    date: String,
}

pub struct HomeRenderer<'a> {
    pub template: Template<'a>,
}

impl HomeRenderer<'_> {
    pub fn new(home_tpl_src: String) -> Result<HomeRenderer<'static>, ContentError> {
        let template = match Template::new(home_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(ContentError::Template(format!("Error parsing home template: {}", e)));
            }
        };

        Ok(HomeRenderer {
            template,
        })
    }

    pub fn render(&self, feed: &PostFeed, preview: bool, site_title: &str) -> String {
        let post_list = feed.posts().iter()
            .map(|post| PostItem {
                link: post_link(&post.uid),
                title: post.title.as_str(),
                subtitle: post.subtitle.as_str(),
                author: post.author.as_str(),
                date: format_date(post.first_publication_date),
            })
            .collect();

        self.template.render(&HomePage {
            site_title,
            post_list,
            has_more: feed.has_more(),
            load_more_link: format!("/?pages={}", feed.pages_loaded() + 1),
            next_cursor: feed.next_page().unwrap_or_default(),
            preview,
        })
    }
}
