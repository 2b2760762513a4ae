use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use sketchconfig::SketchbookConfig;

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Sketchbook";
const APPLICATION: &str = "sketchbook";
const CONFIG_FILE: &str = "sketchbook.toml";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Passed with `--config` or `SKETCHBOOK_CONFIG`; must exist.
    Explicit(PathBuf),
    /// The platform config directory; may be absent.
    Platform(PathBuf),
    /// No platform directories could be determined.
    Defaults,
}

impl ConfigOrigin {
    pub fn discover(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }
        match ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION) {
            Some(dirs) => Self::Platform(dirs.config_dir().join(CONFIG_FILE)),
            None => {
                tracing::debug!("no platform config directory; using built-in defaults");
                Self::Defaults
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Platform(path) => Some(path.as_path()),
            Self::Defaults => None,
        }
    }

    pub fn load(&self) -> Result<SketchbookConfig> {
        match self {
            Self::Explicit(path) => SketchbookConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            Self::Platform(path) => SketchbookConfig::load_or_default(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            Self::Defaults => Ok(SketchbookConfig::default()),
        }
    }
}
