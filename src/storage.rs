use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, warn};

use crate::config::Settings;

/// Fixed relative path of the settings file.
pub fn settings_path() -> PathBuf {
    PathBuf::from("./config/settings.json")
}

/// Load settings from disk. Never fails: a missing file yields defaults with
/// a warning, any other read/parse failure yields defaults with an error.
pub fn load() -> Settings {
    load_from(&settings_path())
}

fn load_from(path: &Path) -> Settings {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("settings file not found, using defaults");
            return Settings::default();
        }
        Err(e) => {
            error!("failed to read settings file: {e}");
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&data) {
        Ok(mut settings) => {
            settings.clamp_ranges();
            settings
        }
        Err(e) => {
            error!("failed to parse settings file: {e}");
            Settings::default()
        }
    }
}

/// Save settings as pretty-printed JSON, creating the config directory if
/// needed. Best-effort: the caller logs failures and carries on.
pub fn save(settings: &Settings) -> anyhow::Result<()> {
    save_to(&settings_path(), settings)
}

fn save_to(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(settings).context("failed to serialize settings")?;
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_settings_path(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("crosshair-overlay-test-{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.join("settings.json")
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_settings_path("roundtrip");

        let mut settings = Settings {
            color: "#1E90FF".into(),
            border_color: "white".into(),
            size: 32,
            opacity: 0.5,
            border_thickness: 2,
            image: Some(PathBuf::from("marker.png")),
            ..Settings::default()
        };
        settings.set_position(120, -45);

        save_to(&path, &settings).unwrap();
        let loaded = load_from(&path);
        assert_eq!(loaded, settings);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = temp_settings_path("missing");
        assert_eq!(load_from(&path), Settings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_corrupted_json_returns_defaults() {
        let path = temp_settings_path("corrupt");
        fs::write(&path, "not valid json!!!").unwrap();
        assert_eq!(load_from(&path), Settings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_keys_fall_back_per_key() {
        let path = temp_settings_path("partial");
        fs::write(&path, r#"{ "ch_size": 20, "ch_color": "blue" }"#).unwrap();

        let loaded = load_from(&path);
        assert_eq!(loaded.size, 20);
        assert_eq!(loaded.color, "blue");
        assert_eq!(loaded.border_color, "black");
        assert_eq!(loaded.opacity, 1.0);
        assert_eq!(loaded.border_thickness, 0);
        assert!(loaded.image.is_none());
        assert!(loaded.position().is_none());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_clamps_out_of_range_values() {
        let path = temp_settings_path("clamp");
        fs::write(
            &path,
            r#"{ "ch_size": 5000, "ch_opacity": 2.5, "ch_border_thickness": 50 }"#,
        )
        .unwrap();

        let loaded = load_from(&path);
        assert_eq!(loaded.size, crate::config::MAX_SIZE);
        assert_eq!(loaded.opacity, 1.0);
        assert_eq!(loaded.border_thickness, crate::config::MAX_BORDER_THICKNESS);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_null_image_and_position_deserialize_as_none() {
        let path = temp_settings_path("nulls");
        fs::write(
            &path,
            r#"{ "ch_img": null, "ch_pos_x": null, "ch_pos_y": null }"#,
        )
        .unwrap();

        let loaded = load_from(&path);
        assert!(loaded.image.is_none());
        assert!(loaded.position().is_none());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
