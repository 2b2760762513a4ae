use std::fmt;

use crate::route::normalize_location;

/// Handle returned by [`Router::on_change`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteSubscription(u64);

type RouteHandler = Box<dyn FnMut(&str)>;

/// Location holder with a single change subscriber.
///
/// Dispatch is synchronous: `navigate` runs the handler to completion before
/// returning. Navigations are never queued or blocked, so a handler that
/// kicks off asynchronous work must tolerate being superseded.
pub struct Router {
    location: String,
    current_route: Option<String>,
    handler: Option<(RouteSubscription, RouteHandler)>,
    next_subscription: u64,
}

impl Router {
    pub fn new(initial_location: &str) -> Self {
        Self {
            location: normalize_location(initial_location),
            current_route: None,
            handler: None,
            next_subscription: 0,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// The last path handed to the subscriber.
    pub fn current_route(&self) -> Option<&str> {
        self.current_route.as_deref()
    }

    /// Installs `handler` as the only subscriber, replacing any previous one.
    pub fn on_change<F>(&mut self, handler: F) -> RouteSubscription
    where
        F: FnMut(&str) + 'static,
    {
        self.next_subscription += 1;
        let subscription = RouteSubscription(self.next_subscription);
        if self.handler.is_some() {
            tracing::debug!("replacing existing route subscriber");
        }
        self.handler = Some((subscription, Box::new(handler)));
        subscription
    }

    /// Removes the subscriber if `subscription` is still the active one.
    pub fn unsubscribe(&mut self, subscription: RouteSubscription) -> bool {
        match &self.handler {
            Some((active, _)) if *active == subscription => {
                self.handler = None;
                true
            }
            _ => false,
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.handler.is_some()
    }

    /// Dispatches the current location, as on first load.
    pub fn start(&mut self) {
        self.dispatch();
    }

    /// Re-dispatches the current location without changing it.
    pub fn reload(&mut self) {
        self.dispatch();
    }

    /// Moves to `path`. Returns `true` when the location changed and was
    /// dispatched; setting the same location again is a no-op.
    pub fn navigate(&mut self, path: &str) -> bool {
        let next = normalize_location(path);
        if next == self.location {
            tracing::trace!(route = %next, "navigation to current location ignored");
            return false;
        }
        self.location = next;
        self.dispatch();
        true
    }

    fn dispatch(&mut self) {
        let path = self.location.clone();
        tracing::debug!(route = %path, "dispatching route");
        self.current_route = Some(path.clone());
        if let Some((_, handler)) = self.handler.as_mut() {
            handler(&path);
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("location", &self.location)
            .field("current_route", &self.current_route)
            .field("subscribed", &self.handler.is_some())
            .finish()
    }
}
