use std::fmt;

/// Notifications published by the lifecycle manager.
///
/// Recoverable failures only show up here and in the log; the visible render
/// state never changes because of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchEvent {
    /// A route resolved to an id that is not registered.
    NotFound { route: String, id: String },
    /// A load was started for `id`.
    Loading { id: String, generation: u64 },
    /// `id` is now installed and rendering.
    Activated { id: String },
    /// The loader for `id` failed; the previous program keeps rendering.
    LoadFailed { id: String, cause: String },
    /// A load for `id` completed after a newer navigation and was dropped.
    StaleDiscarded { id: String },
}

impl fmt::Display for SketchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchEvent::NotFound { route, id } => {
                write!(f, "sketch '{id}' not found (route {route})")
            }
            SketchEvent::Loading { id, generation } => {
                write!(f, "loading sketch '{id}' (generation {generation})")
            }
            SketchEvent::Activated { id } => write!(f, "sketch '{id}' active"),
            SketchEvent::LoadFailed { id, cause } => {
                write!(f, "sketch '{id}' failed to load: {cause}")
            }
            SketchEvent::StaleDiscarded { id } => {
                write!(f, "discarded stale load of sketch '{id}'")
            }
        }
    }
}
