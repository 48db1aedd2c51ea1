mod config;
mod fetch;

pub use config::{cmd_check_config, cmd_init};
pub use fetch::cmd_fetch;
