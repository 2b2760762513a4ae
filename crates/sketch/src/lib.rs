//! Sketch registry, routing, and the lifecycle manager that swaps the active
//! color program on a render surface.
//!
//! Nothing in this crate touches the GPU. The renderer implements
//! [`ProgramHost`] and supplies [`ColorProgram`]s through loaders registered
//! in a [`SketchRegistry`].

pub mod events;
pub mod lifecycle;
pub mod program;
pub mod registry;
pub mod route;
pub mod router;

pub use events::SketchEvent;
pub use lifecycle::{Completion, LifecycleState, LoadTicket, PendingLoad, SketchLifecycleManager};
pub use program::{ColorProgram, LoadError, LoadFuture, ProgramHost, SurfaceError};
pub use registry::{RegistryError, SketchDescriptor, SketchLoader, SketchRegistry};
pub use route::{normalize_location, RouteResolver, DEFAULT_PREFIX};
pub use router::{RouteSubscription, Router};
