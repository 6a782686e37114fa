//! Configuration and settings management

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::scanner::{ScanOptions, DEFAULT_DISPLAY_LIMIT, TRASH_FOLDER};
use crate::server::ServerConfig;

pub const DEFAULT_PORT: u16 = 8000;
pub const VIEWER_PAGE: &str = "downloads-viewer.html";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    #[serde(default = "default_excluded_names")]
    pub excluded_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// On-disk viewer and assets, served ahead of the built-in copies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
    #[serde(default = "default_index_page")]
    pub index_page: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
            excluded_names: default_excluded_names(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            static_dir: None,
            index_page: default_index_page(),
        }
    }
}

fn default_display_limit() -> usize {
    DEFAULT_DISPLAY_LIMIT
}

fn default_excluded_names() -> Vec<String> {
    vec![TRASH_FOLDER.to_string()]
}

fn default_bind_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_index_page() -> String {
    VIEWER_PAGE.to_string()
}

impl Settings {
    /// Load settings from a file, or return defaults if file doesn't exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        Ok(settings)
    }

    /// Get the default settings file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("downloads-galaxy")
            .join("settings.toml")
    }

    /// Scan options for `root`, using the configured limits and exclusions
    pub fn scan_options(&self, root: PathBuf) -> ScanOptions {
        ScanOptions::new(root)
            .with_display_limit(self.scan.display_limit)
            .with_excluded_names(self.scan.excluded_names.clone())
    }

    /// Server configuration, with command-line values taking precedence
    /// over the settings file
    pub fn server_config(&self, port: Option<u16>, static_dir: Option<PathBuf>) -> ServerConfig {
        let port = port.unwrap_or(self.server.port);
        let static_dir = static_dir
            .or_else(|| self.server.static_dir.clone())
            .map(|dir| expand_path(&dir))
            .or_else(|| exe_static_dir(&self.server.index_page));

        ServerConfig {
            addr: SocketAddr::new(self.server.bind_addr, port),
            static_dir,
            index_page: self.server.index_page.clone(),
        }
    }
}

/// The executable's directory, when a viewer page sits next to it
fn exe_static_dir(index_page: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?;
    dir.join(index_page).is_file().then(|| dir.to_path_buf())
}

/// The user's downloads folder, or `~/Downloads` when the platform has none
pub fn default_root() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

/// Check that the folder to scan exists and is a directory, returning its
/// canonical path
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    let path = expand_path(path);

    if !path.exists() {
        bail!("Folder does not exist: {}", path.display());
    }
    if !path.is_dir() {
        bail!("Path is not a folder: {}", path.display());
    }

    path.canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.scan.display_limit, 20);
        assert_eq!(settings.scan.excluded_names, vec!["$RECYCLE.BIN".to_string()]);
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.bind_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(settings.server.index_page, "downloads-viewer.html");
        assert!(settings.server.static_dir.is_none());
    }

    #[test]
    fn test_load_full_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        std::fs::write(
            &settings_path,
            r#"
[scan]
display_limit = 5
excluded_names = ["$RECYCLE.BIN", "Trash"]

[server]
bind_addr = "127.0.0.1"
port = 8123
static_dir = "/srv/galaxy"
"#,
        )
        .unwrap();

        let loaded = Settings::load(&settings_path).unwrap();
        assert_eq!(loaded.scan.display_limit, 5);
        assert_eq!(loaded.scan.excluded_names.len(), 2);
        assert_eq!(loaded.server.bind_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(loaded.server.port, 8123);
        assert_eq!(loaded.server.static_dir, Some(PathBuf::from("/srv/galaxy")));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("nonexistent.toml");

        let settings = Settings::load(&settings_path).unwrap();
        assert_eq!(settings.scan.display_limit, 20);
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        std::fs::write(&settings_path, "[server]\nport = 9001\n").unwrap();

        let settings = Settings::load(&settings_path).unwrap();
        assert_eq!(settings.server.port, 9001);
        assert_eq!(settings.server.index_page, VIEWER_PAGE);
        assert_eq!(settings.scan.display_limit, 20);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().join("settings.toml");
        std::fs::write(&settings_path, "[server]\nport = \"eighty\"\n").unwrap();

        let err = Settings::load(&settings_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings"));
    }

    #[test]
    fn test_scan_options_from_settings() {
        let mut settings = Settings::default();
        settings.scan.display_limit = 7;
        settings.scan.excluded_names = vec!["Trash".to_string()];

        let options = settings.scan_options(PathBuf::from("/data"));
        assert_eq!(options.root, PathBuf::from("/data"));
        assert_eq!(options.display_limit, 7);
        assert_eq!(options.excluded_names, vec!["Trash".to_string()]);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = Settings::default().server_config(None, None);
        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.index_page, VIEWER_PAGE);
        // Test binaries live in target/, which has no viewer page
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_server_config_file_beats_default() {
        let mut settings = Settings::default();
        settings.server.port = 9001;
        settings.server.static_dir = Some(PathBuf::from("/opt/galaxy/static"));

        let config = settings.server_config(None, None);
        assert_eq!(config.addr.port(), 9001);
        assert_eq!(config.static_dir, Some(PathBuf::from("/opt/galaxy/static")));
    }

    #[test]
    fn test_server_config_flags_beat_file() {
        let mut settings = Settings::default();
        settings.server.port = 9001;
        settings.server.static_dir = Some(PathBuf::from("/opt/galaxy/static"));

        let config = settings.server_config(Some(8123), Some(PathBuf::from("/tmp/viewer")));
        assert_eq!(config.addr.port(), 8123);
        assert_eq!(config.static_dir, Some(PathBuf::from("/tmp/viewer")));
    }

    #[test]
    fn test_server_config_expands_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let config = Settings::default().server_config(None, Some(PathBuf::from("~/viewer")));
        assert_eq!(config.static_dir, Some(home.join("viewer")));
    }

    #[test]
    fn test_resolve_root() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = resolve_root(temp_dir.path()).unwrap();
        assert_eq!(resolved, temp_dir.path().canonicalize().unwrap());

        let missing = temp_dir.path().join("missing");
        let err = resolve_root(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Folder does not exist"));

        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        let err = resolve_root(&file).unwrap_err();
        assert!(err.to_string().starts_with("Path is not a folder"));
    }
}
