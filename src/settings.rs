use std::path::{Path, PathBuf};

use crate::canvas::Tolerance;
use crate::io::PngCompression;
use crate::logger::LogLevel;
use crate::surface::DEFAULT_MAX_SURFACE_DIM;

/// Persistent tool settings, stored as `key=value` lines.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushSettings {
    /// Tolerance used for new sessions (slider range 5-100)
    pub tolerance: f32,
    /// View zoom in percent. Cosmetic only.
    pub zoom: f32,
    pub png_compression: PngCompression,
    /// Largest image edge the display surface accepts
    pub max_surface_dim: u32,
    /// Least severe log level written to the session log
    pub log_level: LogLevel,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT.value(),
            zoom: 100.0,
            png_compression: PngCompression::Default,
            max_surface_dim: DEFAULT_MAX_SURFACE_DIM,
            log_level: LogLevel::Info,
        }
    }
}

impl BrushSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/magic-brush/magic_brush.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\MagicBrush\magic_brush.cfg
    /// On macOS:   ~/Library/Application Support/MagicBrush/magic_brush.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            return Some(PathBuf::from(appdata).join("MagicBrush").join("magic_brush.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("MagicBrush")
                    .join("magic_brush.cfg"),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?;
            Some(config_dir.join("magic-brush").join("magic_brush.cfg"))
        }
    }

    /// Load settings from disk (defaults if the file is missing or unreadable)
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                crate::log_warn!("settings: cannot read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::settings_path() else { return Ok(()) };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config())
    }

    /// Parse `key=value` lines. Unknown keys are skipped and bad values keep
    /// their defaults.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let (key, val) = (key.trim(), val.trim());
            let accepted = match key {
                "tolerance" => val
                    .parse::<f32>()
                    .ok()
                    .filter(|v| !v.is_nan())
                    .map(|v| s.tolerance = Tolerance::from_ui(v).value())
                    .is_some(),
                "zoom" => val
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .map(|v| s.zoom = v)
                    .is_some(),
                "png_compression" => {
                    PngCompression::parse(val).map(|c| s.png_compression = c).is_some()
                }
                "max_surface_dim" => val
                    .parse::<u32>()
                    .ok()
                    .filter(|v| *v > 0)
                    .map(|v| s.max_surface_dim = v)
                    .is_some(),
                "log_level" => LogLevel::parse(val).map(|l| s.log_level = l).is_some(),
                _ => true,
            };
            if !accepted {
                crate::log_warn!("settings: ignoring bad value '{}' for {}", val, key);
            }
        }
        s
    }

    pub fn to_config(&self) -> String {
        format!(
            "tolerance={}\n\
             zoom={}\n\
             png_compression={}\n\
             max_surface_dim={}\n\
             log_level={}\n",
            self.tolerance,
            self.zoom,
            self.png_compression.as_str(),
            self.max_surface_dim,
            self.log_level.as_str().to_ascii_lowercase(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_survive_garbage() {
        let s = BrushSettings::parse("tolerance=abc\nzoom=-4\nnonsense\nfoo=bar\nmax_surface_dim=0\n");
        assert_eq!(s, BrushSettings::default());
    }

    #[test]
    fn test_config_round_trip() {
        let s = BrushSettings {
            tolerance: 42.5,
            zoom: 250.0,
            png_compression: PngCompression::Best,
            max_surface_dim: 4096,
            log_level: LogLevel::Warn,
        };
        assert_eq!(BrushSettings::parse(&s.to_config()), s);
    }

    #[test]
    fn test_save_then_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("magic-brush-cfg-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("magic_brush.cfg");
        assert_eq!(BrushSettings::load_from(&path), BrushSettings::default());

        let s = BrushSettings {
            tolerance: 17.0,
            zoom: 75.0,
            png_compression: PngCompression::Fast,
            max_surface_dim: 2048,
            log_level: LogLevel::Error,
        };
        s.save_to(&path).unwrap();
        assert_eq!(BrushSettings::load_from(&path), s);

        // A directory where the file should be is unreadable, not missing
        assert_eq!(BrushSettings::load_from(&dir), BrushSettings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bad_log_level_keeps_default() {
        assert_eq!(BrushSettings::parse("log_level=chatty").log_level, LogLevel::Info);
        assert_eq!(BrushSettings::parse("log_level = WARN").log_level, LogLevel::Warn);
    }

    #[test]
    fn test_tolerance_clamped_to_slider_range() {
        assert_eq!(BrushSettings::parse("tolerance=1").tolerance, 5.0);
        assert_eq!(BrushSettings::parse("# comment\n tolerance = 400 ").tolerance, 100.0);
    }
}
