use ramhorns::Template;

use crate::error::ContentError;

#[derive(ramhorns::Content)]
struct NotFoundPage<'a> {
    site_title: &'a str,
    uid: &'a str,
    preview: bool,
}

pub struct NotFoundRenderer<'a> {
    pub template: Template<'a>,
}

impl NotFoundRenderer<'_> {
    pub fn new(tpl_src: String) -> Result<NotFoundRenderer<'static>, ContentError> {
        let template = Template::new(tpl_src)
            .map_err(|e| ContentError::Template(format!("Error parsing not found template: {}", e)))?;
        Ok(NotFoundRenderer { template })
    }

    pub fn render(&self, uid: &str, preview: bool, site_title: &str) -> String {
        self.template.render(&NotFoundPage {
            site_title,
            uid,
            preview,
        })
    }
}
