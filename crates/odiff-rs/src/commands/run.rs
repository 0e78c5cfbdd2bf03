use std::ffi::OsString;

use anyhow::{Context, Result};
use odiff_rs::Executable;

use crate::config::ResolvedConfig;

/// `odiff-rs run -- <args>`: hand everything to odiff with inherited stdio.
/// Returns odiff's exit code (1 if it was killed by a signal).
pub fn run(config: &ResolvedConfig, args: &[OsString]) -> Result<i32> {
    let exe = Executable::new(&config.binary);
    let code = exe
        .run_inherited(args)
        .with_context(|| format!("Failed to run {}", config.binary.display()))?;
    Ok(code.unwrap_or(1))
}
