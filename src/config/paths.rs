//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings + history):
//!   Windows: %APPDATA%\voz-gala\
//!   macOS:   ~/Library/Application Support/voz-gala/
//!   Linux:   ~/.config/voz-gala/
//!
//! Exports dir (WAV files): the platform audio directory, falling back to
//! the current directory.

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `history.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `history.json`.
    pub history_file: PathBuf,
    /// Default directory for exported WAV files.
    pub exports_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voz-gala";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let exports_dir = dirs::audio_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let history_file = config_dir.join("history.json");

        Self {
            config_dir,
            settings_file,
            history_file,
            exports_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
