use anyhow::{Result, bail};

use crate::config;

/// `odiff-rs init`: create .odiff/config.toml.
pub fn init(force: bool) -> Result<()> {
    if !force && config::config_file_exists() {
        bail!(".odiff/config.toml already exists (use --force to overwrite)");
    }

    config::write_template()?;

    let verb = if force { "Regenerated" } else { "Created" };
    println!("{verb} .odiff/config.toml");
    Ok(())
}
