use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"[site]
title = "spacetraveling"
url = "http://localhost:8001"

# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
template_dir = "res/template"
public_dir = "res/public"

# kind = "prismic" reads from a Prismic repository, kind = "fixture" from a local JSON file
[content_api]
kind = "fixture"
# endpoint = "https://your-repo.cdn.prismic.io/api/v2"
# access_token = "..."
fixture = "fixtures/posts.json"
document_type = "post"
timeout_secs = 10

[defaults]
page_size = 2
max_pages = 20

# Seconds a rendered page is served before it is regenerated
[revalidate]
home_secs = 86400
post_secs = 1800

[server]
address = "0.0.0.0"
port = 8001

[log]
level = "Info"
log_to_console = true
"#;

pub(crate) fn write_sample_cfg(file_path: &Path) -> io::Result<()> {
    let mut file = File::create(file_path)?;
    file.write_all(CONFIG_SAMPLE.as_bytes())
}
