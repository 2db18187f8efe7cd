//! Config command handler.

use roster::RosterConfig;

/// Config command.
pub fn cmd_config(config: &RosterConfig) -> anyhow::Result<()> {
    println!("Current Configuration");
    println!("=====================");
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
