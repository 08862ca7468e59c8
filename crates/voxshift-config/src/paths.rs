//! Platform-specific paths for user presets.
//!
//! - **User presets**: `~/.config/voxshift/presets/` (Linux),
//!   `~/Library/Application Support/voxshift/presets/` (macOS),
//!   `%APPDATA%\voxshift\presets\` (Windows)
//!
//! # Example
//!
//! ```rust,no_run
//! use voxshift_config::paths;
//!
//! println!("User presets: {:?}", paths::user_presets_dir());
//! if let Some(path) = paths::find_preset("my_voice") {
//!     println!("Found preset at: {:?}", path);
//! }
//! ```

use crate::error::{ConfigError, IoAction, Result};
use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "voxshift";

/// Subdirectory name for presets.
const PRESETS_SUBDIR: &str = "presets";

/// The user configuration directory, `<config>/voxshift`.
///
/// Falls back to the working directory if the platform has no config dir.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// The user presets directory, `<config>/voxshift/presets`.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Find a preset file by path or by name in the user presets directory.
///
/// `name` may be a path to a TOML file, or a preset name with or without
/// the `.toml` extension.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(name, &user_presets_dir())
}

/// [`find_preset`] against an explicit presets directory.
pub fn find_preset_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Create the user presets directory if needed and return it.
pub fn ensure_user_presets_dir() -> Result<PathBuf> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::io(IoAction::CreateDir, &dir, e))?;
    }
    Ok(dir)
}

/// Preset files in the user presets directory.
///
/// Empty if the directory doesn't exist or can't be read.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

/// Preset files in `dir`, sorted by path.
pub fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// The preset name of a file path, its file stem.
///
/// ```rust
/// use voxshift_config::paths::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/gravel.toml"));
/// assert_eq!(name, Some("gravel".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn presets_dir_is_under_config_dir() {
        let dir = user_presets_dir();
        assert!(dir.ends_with("voxshift/presets"));
        assert!(dir.starts_with(user_config_dir()));
    }

    #[test]
    fn listing_keeps_only_toml_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.toml"), "").unwrap();
        fs::write(temp.path().join("a.toml"), "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp.path().join("sub.toml")).unwrap();

        let names: Vec<_> = list_presets_in_dir(temp.path())
            .iter()
            .filter_map(|p| preset_name_from_path(p))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn missing_dir_lists_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(list_presets_in_dir(&temp.path().join("nope")).is_empty());
    }

    #[test]
    fn find_by_name_or_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("gravel.toml");
        fs::write(&file, "name = \"Gravel\"").unwrap();

        assert_eq!(find_preset_in("gravel", temp.path()), Some(file.clone()));
        assert_eq!(find_preset_in("gravel.toml", temp.path()), Some(file.clone()));
        let as_path = file.to_string_lossy().into_owned();
        assert_eq!(find_preset_in(&as_path, temp.path()), Some(file));
        assert!(find_preset_in("missing", temp.path()).is_none());
    }
}
