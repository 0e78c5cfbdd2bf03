use anyhow::{Context, Result};

use super::{CONFIG_DIR, config_path};

/// Hand-crafted config template with every key commented out, so that
/// `odiff-rs init` shows the available knobs while keeping the defaults.
const CONFIG_TEMPLATE: &str = r##"# ─────────────────────────────────────────────────────────
# odiff executable. Defaults to `odiff` on PATH.
# Env override: ODIFF_RS_BINARY
# ─────────────────────────────────────────────────────────
[odiff]
# binary = "/usr/local/bin/odiff"

# ─────────────────────────────────────────────────────────
# Comparison defaults. All fields are optional.
# ─────────────────────────────────────────────────────────
[compare]
# threshold = 0.1                   # color distance 0.0-1.0 (env: ODIFF_RS_THRESHOLD)
# diff_color = "#FF0000"
# antialiasing = false
# diff_mask = false
# fail_on_layout = false
# output_diff_lines = false
# reduce_ram_usage = false
# ignore = ["0:0-100:40"]           # x1:y1-x2:y2 regions

# ─────────────────────────────────────────────────────────
# Animated diff (base -> compare -> diff)
# ─────────────────────────────────────────────────────────
[apng]
# delay_num = 500                   # each frame shows delay_num/delay_den seconds
# delay_den = 1000
# checker_transparency = true

# ─────────────────────────────────────────────────────────
# Ignore-area overlay drawn onto rendered images
# ─────────────────────────────────────────────────────────
[overlay]
# show = true
# color = "#FF0000"
# border_opacity = 1.0
# fill_opacity = 0.3                # 0.0 = border only
"##;

pub fn config_file_exists() -> bool {
    config_path().exists()
}

/// Write the hand-crafted config template.
pub fn write_template() -> Result<()> {
    std::fs::create_dir_all(CONFIG_DIR)
        .with_context(|| format!("Failed to create {CONFIG_DIR} directory"))?;
    let path = config_path();
    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
