use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SKETCH: &str = "flare-1";
pub const DEFAULT_ROUTE_PREFIX: &str = "/sketches/";
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SketchbookConfig {
    pub version: u32,
    #[serde(default = "default_sketch")]
    pub default_sketch: String,
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub sketches: Vec<SketchEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_max_pixel_ratio")]
    pub max_pixel_ratio: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            max_pixel_ratio: default_max_pixel_ratio(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default, deserialize_with = "deserialize_fps_opt")]
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub clear_color: [f32; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SketchEntry {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub shader: PathBuf,
}

impl SketchEntry {
    /// Display label, falling back to the last path segment of the id.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => self.id.rsplit('/').next().unwrap_or(&self.id),
        }
    }
}

fn default_sketch() -> String {
    DEFAULT_SKETCH.to_string()
}

fn default_route_prefix() -> String {
    DEFAULT_ROUTE_PREFIX.to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_max_pixel_ratio() -> f32 {
    DEFAULT_MAX_PIXEL_RATIO
}

fn deserialize_fps_opt<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Int(i64),
        Float(f64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => parse_fps(&raw).map_err(de::Error::custom)?,
        Some(Helper::Int(value)) => {
            if value < 0 {
                return Err(de::Error::custom("fps must be non-negative"));
            }
            Some(value as f32)
        }
        Some(Helper::Float(value)) => {
            if value.is_nan() || value.is_sign_negative() {
                return Err(de::Error::custom("fps must be non-negative"));
            }
            Some(value as f32)
        }
    };
    Ok(result)
}

fn parse_fps(raw: &str) -> Result<Option<f32>, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "" | "uncapped" | "off" | "none" | "vsync" => Ok(None),
        other => other
            .parse::<f32>()
            .map(Some)
            .map_err(|_| format!("invalid fps value '{other}'")),
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<[f32; 3], D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Hex(String),
        Rgb([f32; 3]),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Rgb(rgb) => Ok(rgb),
        Helper::Hex(raw) => parse_hex_color(&raw).map_err(de::Error::custom),
    }
}

/// Parses `#rrggbb` (leading `#` optional) into linear 0..1 components.
pub fn parse_hex_color(raw: &str) -> Result<[f32; 3], String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid color '{trimmed}'; expected #rrggbb"));
    }
    let mut rgb = [0.0_f32; 3];
    for (index, slot) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16)
            .map_err(|err| format!("invalid color '{trimmed}': {err}"))?;
        *slot = f32::from(byte) / 255.0;
    }
    Ok(rgb)
}

impl Default for SketchbookConfig {
    fn default() -> Self {
        Self {
            version: 1,
            default_sketch: default_sketch(),
            route_prefix: default_route_prefix(),
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
            sketches: Vec::new(),
        }
    }
}

impl SketchbookConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SketchbookConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates a config file, resolving sketch shader paths
    /// relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }
        Ok(config)
    }

    /// Like [`SketchbookConfig::load`] but yields defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn resolve_relative_paths(&mut self, base: &Path) {
        for entry in &mut self.sketches {
            if entry.shader.is_relative() {
                entry.shader = base.join(&entry.shader);
            }
        }
    }

    /// Frame-rate cap; `None` means render on every redraw callback.
    pub fn target_fps(&self) -> Option<f32> {
        self.render.fps.filter(|fps| *fps > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.default_sketch.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_sketch must not be empty".into(),
            ));
        }

        if !self.route_prefix.starts_with('/') || !self.route_prefix.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "route_prefix '{}' must start and end with '/'",
                self.route_prefix
            )));
        }

        if self.route_prefix.len() < 2 {
            return Err(ConfigError::Invalid(
                "route_prefix must contain a path segment (e.g. '/sketches/')".into(),
            ));
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid(
                "viewport width and height must be greater than zero".into(),
            ));
        }

        let ratio = self.viewport.max_pixel_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ConfigError::Invalid(
                "viewport.max_pixel_ratio must be a positive number".into(),
            ));
        }

        if let Some(fps) = self.render.fps {
            if fps < 0.0 {
                return Err(ConfigError::Invalid("render.fps must be >= 0".into()));
            }
        }

        if self
            .render
            .clear_color
            .iter()
            .any(|component| !(0.0..=1.0).contains(component))
        {
            return Err(ConfigError::Invalid(
                "render.clear_color components must be within 0..1".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.sketches {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "sketch entry with empty id".into(),
                ));
            }
            if entry.id.starts_with('/') || entry.id.ends_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "sketch id '{}' must not start or end with '/'",
                    entry.id
                )));
            }
            if entry.shader.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "sketch '{}' has an empty shader path",
                    entry.id
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "sketch id '{}' is declared more than once",
                    entry.id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1
default_sketch = "noise/dawn-1"
route_prefix = "/sketches/"

[viewport]
width = 800
height = 600
max_pixel_ratio = 1.5

[render]
fps = 30
clear_color = "#ff8000"

[[sketches]]
id = "mine/plasma"
label = "Plasma"
shader = "plasma.wgsl"

[[sketches]]
id = "mine/rings"
shader = "/abs/rings.wgsl"
"##;

    #[test]
    fn parses_sample_config() {
        let config = SketchbookConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.default_sketch, "noise/dawn-1");
        assert_eq!(config.viewport.width, 800);
        assert_eq!(config.viewport.max_pixel_ratio, 1.5);
        assert_eq!(config.target_fps(), Some(30.0));
        assert_eq!(config.render.clear_color, [1.0, 128.0 / 255.0, 0.0]);
        assert_eq!(config.sketches.len(), 2);
        assert_eq!(config.sketches[1].display_label(), "rings");
    }

    #[test]
    fn applies_defaults_for_minimal_config() {
        let config = SketchbookConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config.default_sketch, DEFAULT_SKETCH);
        assert_eq!(config.route_prefix, DEFAULT_ROUTE_PREFIX);
        assert_eq!(config.viewport.max_pixel_ratio, DEFAULT_MAX_PIXEL_RATIO);
        assert_eq!(config.target_fps(), None);
        assert_eq!(config.render.clear_color, [0.0, 0.0, 0.0]);
        assert!(config.sketches.is_empty());
    }

    #[test]
    fn zero_and_named_fps_mean_uncapped() {
        let zero = SketchbookConfig::from_toml_str("version = 1\n[render]\nfps = 0").unwrap();
        assert_eq!(zero.target_fps(), None);
        let named =
            SketchbookConfig::from_toml_str("version = 1\n[render]\nfps = \"uncapped\"").unwrap();
        assert_eq!(named.render.fps, None);
    }

    #[test]
    fn rejects_duplicate_sketch_ids() {
        let config = r#"
version = 1

[[sketches]]
id = "a"
shader = "a.wgsl"

[[sketches]]
id = "a"
shader = "b.wgsl"
"#;
        let err = SketchbookConfig::from_toml_str(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("'a'")));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = SketchbookConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_prefix() {
        let err =
            SketchbookConfig::from_toml_str("version = 1\nroute_prefix = \"sketches\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_color() {
        let err = SketchbookConfig::from_toml_str("version = 1\n[render]\nclear_color = [2.0, 0.0, 0.0]")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn resolves_relative_shader_paths() {
        let mut config = SketchbookConfig::from_toml_str(SAMPLE).unwrap();
        config.resolve_relative_paths(Path::new("/home/me/sketches"));
        let shaders: Vec<&Path> = config
            .sketches
            .iter()
            .map(|entry| entry.shader.as_path())
            .collect();
        assert_eq!(
            shaders,
            vec![
                Path::new("/home/me/sketches/plasma.wgsl"),
                Path::new("/abs/rings.wgsl"),
            ]
        );
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#000000").unwrap(), [0.0, 0.0, 0.0]);
        assert_eq!(parse_hex_color("ffffff").unwrap(), [1.0, 1.0, 1.0]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }
}
