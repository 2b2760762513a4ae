use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use sketch::{LoadError, LoadFuture, RegistryError, RouteResolver, SketchRegistry};
use sketchconfig::SketchbookConfig;

/// Sketches compiled into the binary: `(id, label, source)`.
const BUILTIN_SKETCHES: &[(&str, &str, &str)] = &[
    ("flare-1", "Flare", include_str!("../sketches/flare-1.wgsl")),
    ("noise/dawn-1", "Dawn", include_str!("../sketches/noise/dawn-1.wgsl")),
    ("noise/ridges", "Ridges", include_str!("../sketches/noise/ridges.wgsl")),
    ("distortion/swirl", "Swirl", include_str!("../sketches/distortion/swirl.wgsl")),
    ("distortion/wave", "Wave", include_str!("../sketches/distortion/wave.wgsl")),
    ("patterns/vignette", "Vignette", include_str!("../sketches/patterns/vignette.wgsl")),
    ("patterns/speckles", "Speckles", include_str!("../sketches/patterns/speckles.wgsl")),
    ("tonemap/compare", "Tonemaps", include_str!("../sketches/tonemap/compare.wgsl")),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchSource {
    Builtin(&'static str),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
    pub source: SketchSource,
}

/// Row printed by `sketchbook list --json`.
#[derive(Debug, Serialize)]
pub struct ListedSketch<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub route: String,
    pub source: String,
}

/// Every sketch the binary knows about, builtins first, in listing order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let entries = BUILTIN_SKETCHES
            .iter()
            .map(|&(id, label, source)| CatalogEntry {
                id: id.to_string(),
                label: label.to_string(),
                source: SketchSource::Builtin(source),
            })
            .collect();
        Self { entries }
    }

    /// Builtins followed by the sketches declared in `config`. An id that
    /// appears twice is an error.
    pub fn from_config(config: &SketchbookConfig) -> Result<Self, RegistryError> {
        let mut catalog = Self::builtin();
        for entry in &config.sketches {
            catalog.push(CatalogEntry {
                id: entry.id.trim().to_string(),
                label: entry.display_label().to_string(),
                source: SketchSource::File(entry.shader.clone()),
            })?;
        }
        Ok(catalog)
    }

    pub fn push(&mut self, entry: CatalogEntry) -> Result<(), RegistryError> {
        if entry.id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.contains(&entry.id) {
            return Err(RegistryError::DuplicateId(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn listing(&self, resolver: &RouteResolver) -> Vec<ListedSketch<'_>> {
        self.entries
            .iter()
            .map(|entry| ListedSketch {
                id: &entry.id,
                label: &entry.label,
                route: resolver.route_for(&entry.id),
                source: match &entry.source {
                    SketchSource::Builtin(_) => "builtin".to_string(),
                    SketchSource::File(path) => path.display().to_string(),
                },
            })
            .collect()
    }

    /// Registers one loader per entry. `compile` turns a label and WGSL
    /// source into a program; file sketches are re-read on every load so
    /// edits show up on reload.
    pub fn registry<P, F>(&self, compile: F) -> Result<SketchRegistry<P>, RegistryError>
    where
        P: 'static,
        F: Fn(&str, String) -> LoadFuture<P> + Clone + 'static,
    {
        let mut registry = SketchRegistry::new();
        for entry in &self.entries {
            let compile = compile.clone();
            let label = entry.label.clone();
            match &entry.source {
                &SketchSource::Builtin(source) => {
                    registry.register(&entry.id, &entry.label, move || {
                        compile(&label, source.to_string())
                    })?;
                }
                SketchSource::File(path) => {
                    let path = path.clone();
                    registry.register(&entry.id, &entry.label, move || {
                        match fs::read_to_string(&path) {
                            Ok(source) => compile(&label, source),
                            Err(err) => {
                                tracing::warn!(
                                    path = %path.display(),
                                    error = %err,
                                    "failed to read sketch source"
                                );
                                let failed: LoadFuture<P> =
                                    Box::pin(async move { Err(LoadError::Io(err)) });
                                failed
                            }
                        }
                    })?;
                }
            }
        }
        Ok(registry)
    }
}
