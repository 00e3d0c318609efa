use color_eyre::eyre::Result;

use crate::config::{config_path, data_dir, UserConfig};

pub fn run(config: &UserConfig, path: bool, reset: bool) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        UserConfig::default().save()?;
        println!("Wrote default config to {}", config_file.display());
        return Ok(());
    }

    println!("# config: {}", config_file.display());
    println!("# data:   {}", data_dir().display());
    println!();
    println!("{}", toml::to_string_pretty(config)?);

    Ok(())
}
