use crate::utils::get_env_name;

use anyhow::Result;
use log::LevelFilter;
use simplelog::{format_description, Config as LogConfig, ConfigBuilder};

#[cfg(debug_assertions)]
pub fn setup_logger() -> Result<()> {
    let config = build_config();
    let path = crate::config::Config::local_path("debug.log")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    simplelog::WriteLogger::init(LevelFilter::Debug, config, file)?;
    Ok(())
}

#[cfg(not(debug_assertions))]
pub fn setup_logger() -> Result<()> {
    let level = std::env::var(get_env_name("log_level"))
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok());
    if let Some(level) = level {
        simplelog::SimpleLogger::init(level, build_config())?;
    }
    Ok(())
}

fn build_config() -> LogConfig {
    let log_filter = match std::env::var(get_env_name("log_filter")) {
        Ok(v) => v,
        Err(_) => env!("CARGO_CRATE_NAME").into(),
    };
    ConfigBuilder::new()
        .add_filter_allow(log_filter)
        .set_time_format_custom(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .set_thread_level(LevelFilter::Off)
        .build()
}
