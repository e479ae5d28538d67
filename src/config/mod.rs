mod session;
mod settings;

pub use session::Session;
pub use settings::{ApiSettings, Config, Organization, ReportSettings};

use crate::error::{DeskError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.poultrydesk or XDG config)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "poultrydesk") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.poultrydesk/
    let home = dirs_home().ok_or_else(|| {
        DeskError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".poultrydesk"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs_home() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Resolve the export output directory: relative entries land under the
/// config directory, absolute and ~-prefixed entries are used as written.
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(DeskError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DeskError::ConfigParse { path, source: e })
}

/// Load session.toml (defaults to an empty, logged-out session)
pub fn load_session(cfg_dir: &Path) -> Result<Session> {
    let path = cfg_dir.join("session.toml");
    if !path.exists() {
        return Ok(Session::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DeskError::ConfigParse { path, source: e })
}

/// Save session.toml
pub fn save_session(cfg_dir: &Path, session: &Session) -> Result<()> {
    let path = cfg_dir.join("session.toml");
    let content = toml::to_string_pretty(session).map_err(|e| {
        DeskError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Remove session.toml, logging the desk out.
pub fn clear_session(cfg_dir: &Path) -> Result<()> {
    let path = cfg_dir.join("session.toml");
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:8080"
timeout_secs = 30

[organization]
name = "Your Trading Company"
address = "123 Market Road"
city = "Hyderabad"
# phone = "+91-90000-00000"    # optional
# email = "office@example.com" # optional

[report]
currency_symbol = "₹"
output_dir = "output"
"#;
