use rand::Rng;
use sketch::{ColorProgram, RouteResolver, SketchLifecycleManager};

/// Keyboard-driven sketch switcher.
///
/// The picker never activates anything itself: every action yields the
/// route to navigate to, and [`SketchPicker::follow`] catches up with what
/// was requested and what the lifecycle manager actually made active.
///
/// Stepping starts from the last requested sketch rather than the active
/// one, so a sketch that fails to load can be skipped.
#[derive(Debug, Clone)]
pub struct SketchPicker {
    entries: Vec<(String, String)>,
    current: Option<usize>,
    cursor: Option<usize>,
    resolver: RouteResolver,
}

impl SketchPicker {
    /// `entries` are `(id, label)` pairs in display order.
    pub fn new(entries: Vec<(String, String)>, resolver: RouteResolver) -> Self {
        Self {
            entries,
            current: None,
            cursor: None,
            resolver,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.map(|index| self.entries[index].0.as_str())
    }

    pub fn current_label(&self) -> Option<&str> {
        self.current.map(|index| self.entries[index].1.as_str())
    }

    /// Catches up after `manager` handled `path`: the selection marks the
    /// active sketch and stepping continues from the sketch `path` asked for.
    /// Unregistered ids clear the respective position.
    pub fn follow<P: ColorProgram>(&mut self, path: &str, manager: &SketchLifecycleManager<P>) {
        let registry = manager.registry();
        let requested = manager
            .resolver()
            .resolve(path, |candidate| registry.contains(candidate));
        self.current = manager.active_id().and_then(|id| self.position(id));
        self.cursor = self.position(&requested);
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| entry == id)
    }

    fn origin(&self) -> Option<usize> {
        self.cursor.or(self.current)
    }

    /// Route of the sketch after the last requested one, wrapping around.
    pub fn next(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.origin() {
            Some(index) => (index + 1) % self.entries.len(),
            None => 0,
        };
        self.route_at(index)
    }

    /// Route of the sketch before the last requested one, wrapping around.
    pub fn prev(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let len = self.entries.len();
        let index = match self.origin() {
            Some(index) => (index + len - 1) % len,
            None => len - 1,
        };
        self.route_at(index)
    }

    /// Route of the sketch at zero-based `index`.
    pub fn select(&self, index: usize) -> Option<String> {
        self.route_at(index)
    }

    /// Route of a uniformly chosen sketch other than the current one, when
    /// there is more than one to choose from.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let candidates: Vec<usize> = (0..self.entries.len())
            .filter(|index| self.entries.len() == 1 || Some(*index) != self.current)
            .collect();
        let index = *shaderlib::math::random_from_slice(rng, &candidates)?;
        self.route_at(index)
    }

    pub fn route_for(&self, id: &str) -> String {
        self.resolver.route_for(id)
    }

    /// One line per sketch; the current one is marked with `*` and the first
    /// nine carry their number key.
    pub fn listing(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, (id, label))| {
                let marker = if Some(index) == self.current { '*' } else { ' ' };
                let key = if index < 9 {
                    format!("[{}]", index + 1)
                } else {
                    "   ".to_string()
                };
                format!("{marker} {key} {label:<12} {}", self.route_for(id))
            })
            .collect()
    }

    fn route_at(&self, index: usize) -> Option<String> {
        self.entries
            .get(index)
            .map(|(id, _)| self.resolver.route_for(id))
    }
}
