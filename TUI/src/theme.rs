//! Theme preference and its settings file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Auto,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Theme> {
        match s.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            "auto" => Some(Theme::Auto),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Auto => "auto",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::Auto => "Auto",
        }
    }

    /// dark -> light -> auto -> dark
    pub fn next(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Auto,
            Theme::Auto => Theme::Dark,
        }
    }

    /// Whether to draw with the light palette. `auto` follows `COLORFGBG`.
    pub fn is_light(self) -> bool {
        match self {
            Theme::Dark => false,
            Theme::Light => true,
            Theme::Auto => std::env::var("COLORFGBG")
                .ok()
                .map(|v| background_is_light(&v))
                .unwrap_or(false),
        }
    }
}

/// `COLORFGBG` is "fg;bg" (sometimes "fg;x;bg"); bg 7 or 15 means a light terminal.
fn background_is_light(colorfgbg: &str) -> bool {
    colorfgbg
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .map(|bg| bg == 7 || bg == 15)
        .unwrap_or(false)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Settings {
    #[serde(default)]
    theme: Option<String>,
}

/// The one persisted key: the theme name, in `settings.json`.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("settings.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme, or dark when the file is missing, unreadable, or holds
    /// an unknown value.
    pub fn load(&self) -> Theme {
        match self.read() {
            Ok(Some(theme)) => theme,
            Ok(None) => Theme::Dark,
            Err(e) => {
                warn!("Ignoring settings file: {}", e);
                Theme::Dark
            }
        }
    }

    fn read(&self) -> Result<Option<Theme>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::io(&self.path, e)),
        };
        let settings: Settings = serde_json::from_str(&raw)?;
        Ok(settings.theme.as_deref().and_then(Theme::parse))
    }

    pub fn save(&self, theme: Theme) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))?;
        }
        let settings = Settings {
            theme: Some(theme.as_str().to_string()),
        };
        let json = serde_json::to_string_pretty(&settings)?;
        fs::write(&self.path, json).map_err(|e| AppError::io(&self.path, e))?;
        debug!("Saved theme {} to {}", theme.as_str(), self.path.display());
        Ok(())
    }
}
