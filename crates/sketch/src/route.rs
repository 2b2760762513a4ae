/// Maps router locations onto sketch ids.
///
/// Resolution order:
/// 1. `/` or an empty path selects the default sketch.
/// 2. A path that is itself a registered id wins outright.
/// 3. `<prefix><id>` yields `<id>` with a single trailing `/` removed.
/// 4. Any other `/<id>` yields `<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResolver {
    prefix: String,
    default_id: String,
}

pub const DEFAULT_PREFIX: &str = "/sketches/";

impl RouteResolver {
    pub fn new(prefix: impl Into<String>, default_id: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            default_id: default_id.into(),
        }
    }

    pub fn with_default(default_id: impl Into<String>) -> Self {
        Self::new(DEFAULT_PREFIX, default_id)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Returns the sketch id a location should activate. The id may still be
    /// absent from the registry; `contains` only short-circuits exact matches.
    pub fn resolve(&self, path: &str, contains: impl Fn(&str) -> bool) -> String {
        let path = normalize_location(path);
        if path == "/" {
            return self.default_id.clone();
        }

        if contains(path.as_str()) {
            return path;
        }

        if let Some(rest) = path.strip_prefix(self.prefix.as_str()) {
            let id = rest.strip_suffix('/').unwrap_or(rest);
            if id.is_empty() {
                return self.default_id.clone();
            }
            return id.to_string();
        }

        path.strip_prefix('/').unwrap_or(&path).to_string()
    }

    /// Canonical location for a sketch id.
    pub fn route_for(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }
}

impl Default for RouteResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, "")
    }
}

/// Strips a leading `#` and guarantees a leading `/`; empty becomes `/`.
pub fn normalize_location(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
