use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spdlog::{info, warn};

use spacetraveling::logger::configure_logger;
use spacetraveling::server::server_run;

use crate::config::open_config;
use crate::config_data::write_sample_cfg;

mod config;
mod config_data;

const CFG_FILE_NAME: &str = "spacetraveling.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Writes a sample configuration to the given path and exits
    #[arg(short, long)]
    generate_config: Option<String>,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(sample_path) = args.generate_config {
        let sample_path = PathBuf::from(sample_path);
        write_sample_cfg(&sample_path)?;
        println!("Sample configuration written to {}", sample_path.display());
        return Ok(());
    }

    let config_path = args.config_path.map(PathBuf::from);
    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run spacetraveling --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting spacetraveling =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
    info!("Listening on {}:{}", config.server.address, config.server.port);
    info!("Revalidating home every {}s and posts every {}s", config.revalidate.home_secs, config.revalidate.post_secs);

    server_run(config).await?;
    Ok(())
}
