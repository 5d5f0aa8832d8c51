//! Host environment functions

use std::path::PathBuf;

/// Get the software root directory from the `NAV_BOT_ROOT` environment
/// variable.
pub fn get_nav_bot_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("NAV_BOT_ROOT")?))
}
