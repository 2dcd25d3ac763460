use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::exif::tags::{ARTIST, COPYRIGHT, IMAGE_DESCRIPTION, SOFTWARE};

/// Top-level configuration for exif-edit.
///
/// Controls which entries the editor offers and how edited files are
/// written.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_edit::config::{Config, EditorMode};
///
/// // From a JSON file
/// let config = Config::load(Some("exif-edit.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.editor.mode = EditorMode::Fixed;
/// config.output.backup_originals = false;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which entries are editable.
    pub editor: EditorConfig,
    /// Write behavior (backups, dry run).
    pub output: OutputConfig,
}

/// Which editor the session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Every text-like entry found in the image.
    Dynamic,
    /// Only the tags listed in `fixed_tags`, present or not.
    Fixed,
}

/// Editor selection.
///
/// # Example
///
/// ```rust
/// use exif_edit::config::{EditorConfig, EditorMode};
///
/// let editor = EditorConfig {
///     mode: EditorMode::Fixed,
///     fixed_tags: vec![270, 315], // ImageDescription, Artist
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub mode: EditorMode,
    /// Tag ids offered by the fixed-field editor, in display order.
    pub fixed_tags: Vec<u16>,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, copy an image to `<name>.<ext>.bak` before its first rewrite.
    pub backup_originals: bool,
    /// If `true`, show what would be written without modifying any files.
    pub dry_run: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            mode: EditorMode::Dynamic,
            fixed_tags: vec![IMAGE_DESCRIPTION.0, ARTIST.0, COPYRIGHT.0, SOFTWARE.0],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { backup_originals: true, dry_run: false }
    }
}

impl Config {
    /// Resolve the config file path: `exif-edit.json` next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("exif-edit.json"))
    }

    /// Read the config at `path` (or [`Config::config_path`]).
    ///
    /// A missing file is not an error: the defaults apply, so the editor
    /// works before anyone has run `--init`. Keys absent from the file take
    /// their default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = resolve(path)?;
        if !path.exists() {
            log::warn!(
                "No config at {}, using the {:?} editor with backups {}",
                path.display(),
                EditorMode::Dynamic,
                if OutputConfig::default().backup_originals { "on" } else { "off" }
            );
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&json)
            .with_context(|| format!("Invalid editor config in {}", path.display()))?;
        if config.editor.mode == EditorMode::Fixed && config.editor.fixed_tags.is_empty() {
            log::warn!("Fixed editor mode without fixed_tags: no entry will be editable");
        }
        Ok(config)
    }

    /// Write the config as pretty JSON and return where it went.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = resolve(path)?;
        let mut json = serde_json::to_string_pretty(self).context("Cannot serialize editor config")?;
        json.push('\n');
        std::fs::write(&path, json).with_context(|| format!("Cannot write config {}", path.display()))?;
        log::info!("Saved editor config to {}", path.display());
        Ok(path)
    }
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => Config::config_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.editor.mode, EditorMode::Dynamic);
        assert_eq!(config.editor.fixed_tags, [270, 315, 33432, 305]);
        assert!(config.output.backup_originals);
        assert!(!config.output.dry_run);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exif-edit.json");

        let mut config = Config::default();
        config.editor.mode = EditorMode::Fixed;
        config.editor.fixed_tags = vec![270];
        config.output.backup_originals = false;
        assert_eq!(config.save(Some(&path)).unwrap(), path);

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.editor.mode, EditorMode::Fixed);
        assert_eq!(loaded.editor.fixed_tags, [270]);
        assert!(!loaded.output.backup_originals);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.editor.mode, EditorMode::Dynamic);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"editor": {"mode": "fixed"}}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.editor.mode, EditorMode::Fixed);
        assert_eq!(config.editor.fixed_tags.len(), 4);
        assert!(config.output.backup_originals);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("bad.json"), "{err}");
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mode.json");
        std::fs::write(&path, r#"{"editor": {"mode": "form"}}"#).unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
