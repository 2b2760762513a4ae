use std::collections::HashMap;
use std::fmt;

use crate::program::LoadFuture;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("sketch '{0}' is already registered")]
    DuplicateId(String),
    #[error("sketch id must not be empty")]
    EmptyId,
    #[error("sketch '{0}' not found")]
    NotFound(String),
}

/// Produces a fresh program every time a sketch is activated.
pub type SketchLoader<P> = Box<dyn Fn() -> LoadFuture<P>>;

/// A named, swappable sketch.
pub struct SketchDescriptor<P> {
    id: String,
    label: String,
    loader: SketchLoader<P>,
}

impl<P> SketchDescriptor<P> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Starts loading a new program for this sketch.
    pub fn load(&self) -> LoadFuture<P> {
        (self.loader)()
    }
}

impl<P> fmt::Debug for SketchDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SketchDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Static mapping from sketch id to loader.
///
/// Lookup is by id; listing preserves registration order for display.
pub struct SketchRegistry<P> {
    entries: Vec<SketchDescriptor<P>>,
    index: HashMap<String, usize>,
}

impl<P> Default for SketchRegistry<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<P> SketchRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        loader: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> LoadFuture<P> + 'static,
    {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(SketchDescriptor {
            id,
            label: label.into(),
            loader: Box::new(loader),
        });
        Ok(())
    }

    pub fn resolve(&self, id: &str) -> Result<&SketchDescriptor<P>, RegistryError> {
        self.index
            .get(id)
            .map(|&slot| &self.entries[slot])
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> impl Iterator<Item = &SketchDescriptor<P>> + '_ {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P> fmt::Debug for SketchRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
