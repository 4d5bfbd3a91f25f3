use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Site {
    pub title: String,
    pub url: Option<String>,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize, Copy, Clone, PartialEq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ContentApiKind {
    Prismic,
    Fixture,
}

#[derive(Deserialize)]
pub struct ContentApiConfig {
    pub kind: ContentApiKind,
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub fixture: Option<PathBuf>,
    #[serde(default = "default_document_type")]
    pub document_type: String,
    pub timeout_secs: Option<u64>,
}

fn default_document_type() -> String {
    "post".to_string()
}

impl ContentApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(10))
    }
}

#[derive(Deserialize)]
pub struct Defaults {
    pub page_size: u32,
    pub max_pages: Option<u32>,
}

impl Defaults {
    pub fn max_pages(&self) -> u32 {
        self.max_pages.unwrap_or(20).max(1)
    }
}

/// One year.
const MAX_REVALIDATE_SECS: i64 = 60 * 60 * 24 * 365;

#[derive(Deserialize)]
pub struct Revalidate {
    pub home_secs: i64,
    pub post_secs: i64,
}

impl Default for Revalidate {
    fn default() -> Self {
        Revalidate {
            home_secs: 60 * 60 * 24,
            post_secs: 60 * 30,
        }
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub content_api: ContentApiConfig,
    pub defaults: Defaults,
    #[serde(default)]
    pub revalidate: Revalidate,
    pub server: Server,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    let Some(str_path) = path.to_str() else {
        return Ok(path);
    };

    if !str_path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent()
        .and_then(|dir| dir.to_str())
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not resolve executable directory"))?;
    Ok(PathBuf::from(str_path.replace("${exe_dir}", exe_dir)))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir)?,
        public_dir: parse_path(cfg.paths.public_dir)?,
    };
    cfg.content_api.fixture = cfg.content_api.fixture.map(parse_path).transpose()?;

    match cfg.content_api.kind {
        ContentApiKind::Prismic if cfg.content_api.endpoint.is_none() => {
            return Err(io::Error::new(ErrorKind::InvalidData, "content_api.endpoint is required for kind = \"prismic\""));
        }
        ContentApiKind::Fixture if cfg.content_api.fixture.is_none() => {
            return Err(io::Error::new(ErrorKind::InvalidData, "content_api.fixture is required for kind = \"fixture\""));
        }
        _ => {}
    }

    for (name, secs) in [("home_secs", cfg.revalidate.home_secs), ("post_secs", cfg.revalidate.post_secs)] {
        if !(0..=MAX_REVALIDATE_SECS).contains(&secs) {
            return Err(io::Error::new(ErrorKind::InvalidData,
                format!("revalidate.{} must be between 0 and {}", name, MAX_REVALIDATE_SECS)));
        }
    }

    if cfg.defaults.page_size == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "defaults.page_size must be greater than 0"));
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
