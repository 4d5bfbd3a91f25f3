use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use spacetraveling::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(PathBuf::from));
    let cur_dir = env::current_dir().ok();

    [exe_dir, cur_dir, dirs::config_dir()].into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => return Err(anyhow!("Could not find {}", CFG_FILE_NAME)),
    };

    println!("Reading config from {}", config_path.display());
    let mut config = read_config(&config_path)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    if let Some(mut log) = config.log {
        if log.location.is_none() {
            let cache_dir = dirs::cache_dir()
                .ok_or_else(|| anyhow!("Could not find user cache dir for the log files"))?;
            log.location = Some(cache_dir.join("Spacetraveling").join("log").join("server.log"));
        }
        if let Some(location) = &log.location {
            println!("Log enabled. Files will be written in {}", location.display());
        }
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
