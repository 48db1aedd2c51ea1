//! Config command handlers

use crate::config::{ACCESS_KEY_ENV, Config};

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
        println!("Set {ACCESS_KEY_ENV} (or upstream.access_key) before starting the server.");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }
    Ok(())
}

pub fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    println!("Configuration is valid.");
    println!("{:-<70}", "");
    print!("{}", toml::to_string_pretty(&config.masked())?);
    Ok(())
}
